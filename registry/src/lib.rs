#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative occupant registry for the spot overlay engine.
//!
//! The registry owns the mapping `map → cell → occupants`. It only grows:
//! claims append occupants, nothing removes them.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use spotmap_core::{CellCoord, Command, Event, MapId, OccupantKey, Placement};

/// Represents the authoritative occupant state for every map.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    maps: BTreeMap<MapId, MapSpots>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists `occupant` on every cell covered by the placement.
    ///
    /// Re-claiming an identical placement for the same occupant is a no-op and
    /// reports no changed cells.
    pub fn claim(&mut self, placement: &Placement, occupant: &OccupantKey) -> Claim {
        let spots = self.maps.entry(placement.map().clone()).or_default();

        let mut claim = Claim::default();
        for cell in placement.footprint().cells() {
            let occupants = spots.cells.entry(cell).or_default();
            let was_empty = occupants.is_empty();
            if occupants.contains(occupant) {
                continue;
            }

            occupants.push(occupant.clone());
            claim.cells.push(ClaimedCell {
                cell,
                newly_occupied: was_empty,
            });
        }
        claim
    }

    /// Number of occupied cells across all maps.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.maps.values().map(|spots| spots.cells.len()).sum()
    }
}

/// Cells whose occupant list grew during a single [`Registry::claim`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Claim {
    cells: Vec<ClaimedCell>,
}

impl Claim {
    /// Cells that held no occupants before the claim.
    pub fn newly_occupied(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .filter(|claimed| claimed.newly_occupied)
            .map(|claimed| claimed.cell)
    }

    /// Cells whose occupant list gained the claiming occupant, including newly
    /// occupied ones.
    pub fn updated(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().map(|claimed| claimed.cell)
    }

    /// Reports whether the claim left the registry unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClaimedCell {
    cell: CellCoord,
    newly_occupied: bool,
}

#[derive(Clone, Debug, Default)]
struct MapSpots {
    cells: IndexMap<CellCoord, Vec<OccupantKey>>,
}

/// Applies the provided command to the registry, broadcasting the resulting
/// events.
pub fn apply(registry: &mut Registry, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ClaimSpots {
            placement,
            occupant,
        } => {
            let claim = registry.claim(&placement, &occupant);
            for claimed in &claim.cells {
                if claimed.newly_occupied {
                    out_events.push(Event::CellOccupied {
                        map: placement.map().clone(),
                        cell: claimed.cell,
                    });
                }
                out_events.push(Event::OccupantsChanged {
                    map: placement.map().clone(),
                    cell: claimed.cell,
                    occupant: occupant.clone(),
                });
            }
        }
        Command::ReportUnknownMap { map, source } => {
            out_events.push(Event::UnknownMapReported { map, source });
        }
    }
}

/// Query functions that provide read-only access to the registry.
pub mod query {
    use super::Registry;
    use spotmap_core::{CellCoord, MapId, OccupantKey};

    /// Occupants listed on a cell in first-claim order.
    ///
    /// Cells and maps that were never claimed yield an empty slice.
    #[must_use]
    pub fn occupants_at<'r>(
        registry: &'r Registry,
        map: &str,
        cell: CellCoord,
    ) -> &'r [OccupantKey] {
        registry
            .maps
            .get(map)
            .and_then(|spots| spots.cells.get(&cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reports whether any occupant claimed the cell.
    #[must_use]
    pub fn is_occupied(registry: &Registry, map: &str, cell: CellCoord) -> bool {
        !occupants_at(registry, map, cell).is_empty()
    }

    /// Occupied cells of a map in the order they were first occupied.
    pub fn occupied_cells<'r>(
        registry: &'r Registry,
        map: &str,
    ) -> impl Iterator<Item = (CellCoord, &'r [OccupantKey])> + 'r {
        registry.maps.get(map).into_iter().flat_map(|spots| {
            spots
                .cells
                .iter()
                .map(|(cell, occupants)| (*cell, occupants.as_slice()))
        })
    }

    /// Maps that have at least one claimed cell, in lexical order.
    pub fn maps(registry: &Registry) -> impl Iterator<Item = &MapId> {
        registry.maps.keys()
    }
}
