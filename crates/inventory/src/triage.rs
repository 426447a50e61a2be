//! Pure retention decisions: which owned creatures to release, and why.

use serde::{Deserialize, Serialize};

use pokecull_core::{ItemId, SpeciesId};

use crate::item::InventoryItem;
use crate::policy::RetentionPolicy;
use crate::species::SpeciesGroups;

/// Why an item was scheduled for release.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisposalReason {
    BlockedSpecies,
    BelowThreshold,
}

impl DisposalReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DisposalReason::BlockedSpecies => "blockedSpecies",
            DisposalReason::BelowThreshold => "belowThreshold",
        }
    }
}

impl core::fmt::Display for DisposalReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "policy={}", self.as_str())
    }
}

/// Why an item was kept.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RetentionReason {
    Favorited,
    MeetsPolicy,
}

/// Decision for a single item.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    Retain(RetentionReason),
    Dispose(DisposalReason),
}

/// Classify one item. Favorites win over every other rule.
pub fn classify(item: &InventoryItem, policy: &RetentionPolicy) -> Verdict {
    if item.is_favorited() {
        Verdict::Retain(RetentionReason::Favorited)
    } else if policy.is_blocked(item.species_id()) {
        Verdict::Dispose(DisposalReason::BlockedSpecies)
    } else if item.combat_power() < policy.minimum_combat_power() {
        Verdict::Dispose(DisposalReason::BelowThreshold)
    } else {
        Verdict::Retain(RetentionReason::MeetsPolicy)
    }
}

/// One release call to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDisposal {
    pub item_id: ItemId,
    pub species_id: SpeciesId,
    pub combat_power: u32,
    pub reason: DisposalReason,
}

/// Ordered release calls; order matches the inventory payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisposalSchedule {
    entries: Vec<ScheduledDisposal>,
}

impl DisposalSchedule {
    pub fn entries(&self) -> &[ScheduledDisposal] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledDisposal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.entries.iter().map(|e| e.item_id).collect()
    }

    pub fn count(&self, reason: DisposalReason) -> usize {
        self.entries.iter().filter(|e| e.reason == reason).count()
    }
}

impl<'a> IntoIterator for &'a DisposalSchedule {
    type Item = &'a ScheduledDisposal;
    type IntoIter = core::slice::Iter<'a, ScheduledDisposal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// An item that stays in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedItem {
    pub item_id: ItemId,
    pub species_id: SpeciesId,
    pub reason: RetentionReason,
}

/// Everything one triage run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageOutcome {
    pub groups: SpeciesGroups,
    pub schedule: DisposalSchedule,
    /// Skip list (favorites and items that meet the policy), in arrival order.
    pub retained: Vec<RetainedItem>,
}

impl TriageOutcome {
    pub fn favorites(&self) -> impl Iterator<Item = &RetainedItem> {
        self.retained
            .iter()
            .filter(|r| r.reason == RetentionReason::Favorited)
    }
}

/// Build the disposal schedule for `items` under `policy`.
///
/// No side effects: the same input always produces the same outcome. Items are
/// evaluated in arrival order (not grouped order) so the release sequence is
/// stable and auditable.
pub fn triage(items: &[InventoryItem], policy: &RetentionPolicy) -> TriageOutcome {
    let groups = SpeciesGroups::from_items(items);

    let mut schedule = DisposalSchedule::default();
    let mut retained = Vec::new();

    for item in items {
        match classify(item, policy) {
            Verdict::Dispose(reason) => schedule.entries.push(ScheduledDisposal {
                item_id: item.item_id(),
                species_id: item.species_id(),
                combat_power: item.combat_power(),
                reason,
            }),
            Verdict::Retain(reason) => retained.push(RetainedItem {
                item_id: item.item_id(),
                species_id: item.species_id(),
                reason,
            }),
        }
    }

    TriageOutcome {
        groups,
        schedule,
        retained,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, species: u32, cp: u32, favorited: bool) -> InventoryItem {
        InventoryItem::new(ItemId::new(id), SpeciesId::new(species), cp, favorited)
    }

    #[test]
    fn mixed_policy_scenario() {
        let policy = RetentionPolicy::new(150).with_blocked_species([SpeciesId::new(41)]);
        let items = vec![
            item(1, 41, 500, false),
            item(2, 1, 100, false),
            item(3, 1, 300, true),
            item(4, 99, 120, false),
        ];

        let outcome = triage(&items, &policy);

        let schedule: Vec<(u64, DisposalReason)> = outcome
            .schedule
            .iter()
            .map(|e| (e.item_id.get(), e.reason))
            .collect();
        assert_eq!(
            schedule,
            vec![
                (1, DisposalReason::BlockedSpecies),
                (2, DisposalReason::BelowThreshold),
                (4, DisposalReason::BelowThreshold),
            ]
        );
        assert_eq!(outcome.retained.len(), 1);
        assert_eq!(outcome.retained[0].item_id, ItemId::new(3));
        assert_eq!(outcome.retained[0].reason, RetentionReason::Favorited);
        assert_eq!(outcome.groups.len(), 3);
    }

    #[test]
    fn permissive_policy_schedules_nothing() {
        let items = vec![item(1, 41, 0, false), item(2, 16, 10, false)];
        let outcome = triage(&items, &RetentionPolicy::default());
        assert!(outcome.schedule.is_empty());
        assert_eq!(outcome.retained.len(), 2);
    }

    #[test]
    fn blocked_species_wins_over_threshold_reason() {
        let policy = RetentionPolicy::new(1000).with_blocked_species([SpeciesId::new(16)]);
        let outcome = triage(&[item(1, 16, 5, false)], &policy);
        assert_eq!(outcome.schedule.count(DisposalReason::BlockedSpecies), 1);
        assert_eq!(outcome.schedule.count(DisposalReason::BelowThreshold), 0);
    }

    #[test]
    fn threshold_is_strict() {
        let policy = RetentionPolicy::new(150);
        let outcome = triage(&[item(1, 1, 150, false), item(2, 1, 149, false)], &policy);
        assert_eq!(outcome.schedule.item_ids(), vec![ItemId::new(2)]);
    }

    #[test]
    fn reason_display_uses_policy_prefix() {
        assert_eq!(DisposalReason::BlockedSpecies.to_string(), "policy=blockedSpecies");
        assert_eq!(
            serde_json::to_string(&DisposalReason::BelowThreshold).unwrap(),
            "\"belowThreshold\""
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        /// Items with unique, index-based handles.
        fn arb_items() -> impl Strategy<Value = Vec<InventoryItem>> {
            prop::collection::vec((1u32..20, 0u32..600, any::<bool>()), 0..40).prop_map(|raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, (species, cp, fav))| item(i as u64, species, cp, fav))
                    .collect()
            })
        }

        fn arb_policy() -> impl Strategy<Value = RetentionPolicy> {
            (prop::collection::btree_set(1u32..20, 0..5), 0u32..600).prop_map(|(blocked, min)| {
                RetentionPolicy::new(min)
                    .with_blocked_species(blocked.into_iter().map(SpeciesId::new))
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: favorites are never scheduled.
            #[test]
            fn favorites_never_scheduled(
                items in arb_items(),
                policy in arb_policy()
            ) {
                let outcome = triage(&items, &policy);
                for entry in outcome.schedule.iter() {
                    let source = &items[entry.item_id.get() as usize];
                    prop_assert!(!source.is_favorited());
                }
                let favorites = items.iter().filter(|i| i.is_favorited()).count();
                prop_assert_eq!(outcome.favorites().count(), favorites);
            }

            /// Property: a non-favorite is scheduled iff blocked or below threshold,
            /// and the schedule keeps input order.
            #[test]
            fn schedule_matches_rules_in_input_order(
                items in arb_items(),
                policy in arb_policy()
            ) {
                let outcome = triage(&items, &policy);
                let expected: Vec<ItemId> = items
                    .iter()
                    .filter(|i| !i.is_favorited())
                    .filter(|i| {
                        policy.is_blocked(i.species_id())
                            || i.combat_power() < policy.minimum_combat_power()
                    })
                    .map(|i| i.item_id())
                    .collect();
                prop_assert_eq!(outcome.schedule.item_ids(), expected);
                prop_assert_eq!(outcome.schedule.len() + outcome.retained.len(), items.len());
            }

            /// Property: triage is deterministic.
            #[test]
            fn triage_is_deterministic(
                items in arb_items(),
                policy in arb_policy()
            ) {
                prop_assert_eq!(triage(&items, &policy), triage(&items, &policy));
            }
        }
    }
}
