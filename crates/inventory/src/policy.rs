use std::collections::BTreeSet;
use std::time::Duration;

use pokecull_core::{SpeciesId, ValueObject};

/// Pause enforced after every disposal call unless configured otherwise.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_secs(3);

/// Retention policy: what to keep, what to release, and how fast.
///
/// Loaded once per run and passed explicitly to [`crate::triage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    blocked_species: BTreeSet<SpeciesId>,
    minimum_combat_power: u32,
    release_delay: Duration,
}

impl ValueObject for RetentionPolicy {}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            blocked_species: BTreeSet::new(),
            minimum_combat_power: 0,
            release_delay: DEFAULT_RELEASE_DELAY,
        }
    }
}

impl RetentionPolicy {
    pub fn new(minimum_combat_power: u32) -> Self {
        Self {
            minimum_combat_power,
            ..Self::default()
        }
    }

    pub fn with_blocked_species(mut self, species: impl IntoIterator<Item = SpeciesId>) -> Self {
        self.blocked_species.extend(species);
        self
    }

    pub fn with_release_delay(mut self, delay: Duration) -> Self {
        self.release_delay = delay;
        self
    }

    /// Species always eligible for release, regardless of strength.
    pub fn blocked_species(&self) -> &BTreeSet<SpeciesId> {
        &self.blocked_species
    }

    pub fn is_blocked(&self, species: SpeciesId) -> bool {
        self.blocked_species.contains(&species)
    }

    /// Items strictly below this combat power are eligible for release.
    pub fn minimum_combat_power(&self) -> u32 {
        self.minimum_combat_power
    }

    pub fn release_delay(&self) -> Duration {
        self.release_delay
    }

    /// True when no item can ever be scheduled.
    pub fn is_permissive(&self) -> bool {
        self.blocked_species.is_empty() && self.minimum_combat_power == 0
    }
}
