use serde::{Deserialize, Serialize};

use pokecull_core::{Entity, ItemId, SpeciesId};

/// One owned creature, validated from the raw inventory payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    item_id: ItemId,
    species_id: SpeciesId,
    combat_power: u32,
    favorited: bool,
}

impl InventoryItem {
    pub fn new(item_id: ItemId, species_id: SpeciesId, combat_power: u32, favorited: bool) -> Self {
        Self {
            item_id,
            species_id,
            combat_power,
            favorited,
        }
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn species_id(&self) -> SpeciesId {
        self.species_id
    }

    pub fn combat_power(&self) -> u32 {
        self.combat_power
    }

    /// Favorited items are never released.
    pub fn is_favorited(&self) -> bool {
        self.favorited
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.item_id
    }
}
