//! Cell walk around a coordinate, used to parameterize area (map) queries.

use std::collections::BTreeSet;

use pokecull_core::{Coordinate, DomainResult};

use crate::cell_id::CellId;

/// Subdivision level of walked cells.
pub const WALK_LEVEL: u8 = 15;

/// Steps taken in each direction when the caller has no preference.
pub const DEFAULT_RADIUS: u32 = 10;

/// Sorted, duplicate-free set of cells visited by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWalk {
    origin: CellId,
    radius: u32,
    cells: Vec<CellId>,
}

impl CellWalk {
    /// Cell containing the walk's origin coordinate.
    pub fn origin(&self) -> CellId {
        self.origin
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Visited cells in ascending id order.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.cells.iter().map(|c| c.id()).collect()
    }
}

/// Walk `radius` steps in both directions along the curve from the level-15 cell
/// containing `origin`, returning every visited cell (origin included).
///
/// Steps past either end of the id space wrap around; the result is
/// deduplicated, so an oversized radius never yields repeated ids.
pub fn generate_cell_walk(origin: &Coordinate, radius: u32) -> CellWalk {
    let center = CellId::from_coordinate(origin).parent(WALK_LEVEL);

    let mut visited = BTreeSet::new();
    visited.insert(center);

    let mut right = center;
    let mut left = center;
    for _ in 0..radius {
        right = right.next_wrap();
        left = left.prev_wrap();
        visited.insert(right);
        visited.insert(left);
    }

    CellWalk {
        origin: center,
        radius,
        cells: visited.into_iter().collect(),
    }
}

/// Same as [`generate_cell_walk`] for raw degrees; out-of-range input is rejected
/// with `InvalidCoordinate`.
pub fn walk_degrees(latitude: f64, longitude: f64, radius: u32) -> DomainResult<CellWalk> {
    let origin = Coordinate::new(latitude, longitude, None)?;
    Ok(generate_cell_walk(&origin, radius))
}
