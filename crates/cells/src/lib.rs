//! `pokecull-cells` — hierarchical spherical grid cells and the area walk.
//!
//! Pure, deterministic geometry (no IO). The grid is the six-face cube projection
//! with quadratic (u,v) → (s,t) mapping and Hilbert-curve ordering inside each
//! face, so neighbouring ids are usually neighbouring on the ground.

pub mod cell_id;
pub mod walk;

pub use cell_id::{CellId, MAX_LEVEL};
pub use walk::{CellWalk, DEFAULT_RADIUS, WALK_LEVEL, generate_cell_walk, walk_degrees};
