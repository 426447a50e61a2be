//! Inventory triage module.
//!
//! This crate contains the retention rules for owned creatures, implemented purely
//! as deterministic domain logic (no IO, no protocol calls, no sleeping). Timing of
//! the resulting disposal calls is owned by the executor in `pokecull-infra`.

pub mod item;
pub mod payload;
pub mod policy;
pub mod species;
pub mod triage;

pub use item::InventoryItem;
pub use payload::{
    MalformedItem, ParsedInventory, PayloadError, RawSpeciesRecords, parse_inventory,
    raw_records_by_species,
};
pub use policy::{DEFAULT_RELEASE_DELAY, RetentionPolicy};
pub use species::{SpeciesGroup, SpeciesGroups};
pub use triage::{
    DisposalReason, DisposalSchedule, RetainedItem, RetentionReason, ScheduledDisposal,
    TriageOutcome, Verdict, classify, triage,
};
