//! Grouping of owned creatures by species.

use std::collections::HashMap;

use pokecull_core::SpeciesId;

use crate::item::InventoryItem;

/// All owned creatures of one species, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesGroup {
    species_id: SpeciesId,
    items: Vec<InventoryItem>,
}

impl SpeciesGroup {
    pub fn species_id(&self) -> SpeciesId {
        self.species_id
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Species → items mapping, rebuilt from scratch on every triage run.
///
/// Groups are kept in first-seen order; items inside a group keep arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesGroups {
    groups: Vec<SpeciesGroup>,
    index: HashMap<SpeciesId, usize>,
}

impl SpeciesGroups {
    pub fn from_items(items: &[InventoryItem]) -> Self {
        let mut out = Self::default();
        for item in items {
            out.push(item.clone());
        }
        out
    }

    fn push(&mut self, item: InventoryItem) {
        let species = item.species_id();
        let slot = *self.index.entry(species).or_insert_with(|| {
            self.groups.push(SpeciesGroup {
                species_id: species,
                items: Vec::new(),
            });
            self.groups.len() - 1
        });
        self.groups[slot].items.push(item);
    }

    pub fn get(&self, species: SpeciesId) -> Option<&SpeciesGroup> {
        self.index.get(&species).map(|&slot| &self.groups[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesGroup> {
        self.groups.iter()
    }

    /// Number of distinct species.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.groups.iter().map(SpeciesGroup::len).sum()
    }
}
