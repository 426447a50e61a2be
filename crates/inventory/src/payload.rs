//! Strict conversion of the raw inventory response into typed items.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use pokecull_core::{DomainError, Entity, ItemId, SpeciesId};

use crate::item::InventoryItem;

/// The inventory response as a whole is unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("inventory response is missing `{0}`")]
    MissingField(&'static str),

    #[error("`{field}` has unexpected shape: expected {expected}")]
    UnexpectedShape {
        field: &'static str,
        expected: &'static str,
    },
}

/// A creature record that was excluded from triage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedItem {
    /// Position in `inventory_items`.
    pub index: usize,
    /// Handle, when it could be read.
    pub item_id: Option<ItemId>,
    pub problem: String,
}

impl MalformedItem {
    pub fn to_domain_error(&self) -> DomainError {
        DomainError::malformed_item(self.to_string())
    }
}

impl core::fmt::Display for MalformedItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.item_id {
            Some(id) => write!(f, "entry #{} (id {id}): {}", self.index, self.problem),
            None => write!(f, "entry #{}: {}", self.index, self.problem),
        }
    }
}

/// Result of parsing one inventory response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInventory {
    /// Valid creatures, in arrival order.
    pub items: Vec<InventoryItem>,
    /// One entry per excluded creature record.
    pub warnings: Vec<MalformedItem>,
    /// Entries that are not creatures (bag items, candy, eggs, player stats).
    pub ignored: usize,
}

/// Parse a `GET_INVENTORY` response body.
///
/// Only a missing `inventory_delta` (or a non-array item list) fails the whole
/// payload. Individual creature records missing `id`, `pokemon_id` or `cp` are
/// reported in `warnings` and never stop the remaining entries from parsing.
/// A repeated `id` keeps the first record; later copies are reported.
/// Any record carrying a `favorite` key is favorited, whatever its value.
pub fn parse_inventory(response: &Value) -> Result<ParsedInventory, PayloadError> {
    let entries = inventory_entries(response)?;

    let mut parsed = ParsedInventory::default();
    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        let Some(data) = entry
            .get("inventory_item_data")
            .and_then(|d| d.get("pokemon_data"))
        else {
            parsed.ignored += 1;
            continue;
        };

        if truthy(data.get("is_egg")) {
            parsed.ignored += 1;
            continue;
        }

        match parse_creature(data) {
            Ok(item) if !seen.insert(*item.id()) => parsed.warnings.push(MalformedItem {
                index,
                item_id: Some(*item.id()),
                problem: "duplicate id".to_string(),
            }),
            Ok(item) => parsed.items.push(item),
            Err(problem) => parsed.warnings.push(MalformedItem {
                index,
                item_id: data.get("id").and_then(read_u64).map(ItemId::new),
                problem,
            }),
        }
    }

    Ok(parsed)
}

/// Raw creature records keyed by species, as dumped to `pokemons.json`.
///
/// Records are kept verbatim (malformed ones included) as long as their
/// `pokemon_id` is readable; species iterate in ascending numeric order.
pub type RawSpeciesRecords = BTreeMap<SpeciesId, Vec<Value>>;

/// Group the untouched `pokemon_data` records of a `GET_INVENTORY` body by species.
pub fn raw_records_by_species(response: &Value) -> Result<RawSpeciesRecords, PayloadError> {
    let mut groups = RawSpeciesRecords::new();
    for data in inventory_entries(response)?
        .iter()
        .filter_map(|entry| entry.get("inventory_item_data")?.get("pokemon_data"))
    {
        let species = data
            .get("pokemon_id")
            .and_then(read_u64)
            .and_then(|v| u32::try_from(v).ok());
        if let Some(species) = species {
            groups.entry(SpeciesId::new(species)).or_default().push(data.clone());
        }
    }
    Ok(groups)
}

fn inventory_entries(response: &Value) -> Result<&[Value], PayloadError> {
    let delta = response
        .get("inventory_delta")
        .ok_or(PayloadError::MissingField("inventory_delta"))?;

    match delta.get("inventory_items") {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries),
        Some(_) => Err(PayloadError::UnexpectedShape {
            field: "inventory_items",
            expected: "array",
        }),
    }
}

fn parse_creature(data: &Value) -> Result<InventoryItem, String> {
    let mut missing = Vec::new();

    let item_id = data.get("id").and_then(read_u64);
    if item_id.is_none() {
        missing.push("id");
    }

    let species = data
        .get("pokemon_id")
        .and_then(read_u64)
        .and_then(|v| u32::try_from(v).ok());
    if species.is_none() {
        missing.push("pokemon_id");
    }

    let cp = data
        .get("cp")
        .and_then(read_u64)
        .and_then(|v| u32::try_from(v).ok());
    if cp.is_none() {
        missing.push("cp");
    }

    match (item_id, species, cp) {
        (Some(id), Some(species), Some(cp)) => Ok(InventoryItem::new(
            ItemId::new(id),
            SpeciesId::new(species),
            cp,
            data.get("favorite").is_some(),
        )),
        _ => Err(format!("missing or invalid {}", missing.join(", "))),
    }
}

/// 64-bit handles arrive either as JSON numbers or as decimal strings.
fn read_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flags are omitted when unset; when present they may be `true` or a non-zero number.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(_) => true,
    }
}
