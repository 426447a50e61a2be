//! `pokecull-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no protocol concerns).

pub mod coordinate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use coordinate::Coordinate;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, RunId, SpeciesId};
pub use value_object::ValueObject;
