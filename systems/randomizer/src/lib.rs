#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure randomizer system that turns `spots` descriptors into claim commands.
//!
//! Each descriptor is a space-delimited line:
//!
//! ```text
//! Town 10 20 0 square_3_2
//! ```
//!
//! The fields are the map, the center cell, an ignored field and an optional
//! region modifier. Unlike schedule files this format is expected to be
//! well-formed, so the first bad entry stops the whole batch.

use std::fmt;

use spotmap_core::{
    CellCoord, CellRectSize, Command, MapCatalog, MapId, OccupantKey, Placement, SpotSource,
};
use thiserror::Error;

const REGION_PREFIX: &str = "square_";

/// Coordinate axis named in parse errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Column coordinate.
    X,
    /// Row coordinate.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Reasons a randomizer batch stops early.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpotError {
    /// The descriptor is blank.
    #[error("spot `{key}` has no map identifier")]
    MissingMap {
        /// Key of the offending entry.
        key: String,
    },
    /// The descriptor ends before a coordinate.
    #[error("spot `{key}` is missing its {axis} coordinate")]
    MissingCoordinate {
        /// Key of the offending entry.
        key: String,
        /// Axis of the absent coordinate.
        axis: Axis,
    },
    /// A coordinate field is not an integer.
    #[error("spot `{key}` has malformed {axis} coordinate `{value}`")]
    InvalidCoordinate {
        /// Key of the offending entry.
        key: String,
        /// Axis of the malformed coordinate.
        axis: Axis,
        /// Field text as written.
        value: String,
    },
    /// The map is not part of the catalog.
    #[error("spot `{key}` references unknown map `{map}`")]
    UnknownMap {
        /// Key of the offending entry.
        key: String,
        /// Map identifier as written.
        map: MapId,
    },
}

/// Parses a single `spots` descriptor into a placement.
///
/// A fifth field starting with `square_` sets the footprint size; widths and
/// heights that are not positive integers fall back to one cell.
pub fn parse_spot(key: &str, descriptor: &str) -> Result<Placement, SpotError> {
    let mut fields = descriptor.split_whitespace();
    let map = fields.next().ok_or_else(|| SpotError::MissingMap {
        key: key.to_owned(),
    })?;
    let x = coordinate(key, Axis::X, fields.next())?;
    let y = coordinate(key, Axis::Y, fields.next())?;
    let size = fields
        .nth(1)
        .and_then(|modifier| modifier.strip_prefix(REGION_PREFIX))
        .map_or(CellRectSize::UNIT, region_size);

    Ok(Placement::new(MapId::new(map), CellCoord::new(x, y), size))
}

fn coordinate(key: &str, axis: Axis, field: Option<&str>) -> Result<i32, SpotError> {
    let field = field.ok_or_else(|| SpotError::MissingCoordinate {
        key: key.to_owned(),
        axis,
    })?;
    field.parse().map_err(|_| SpotError::InvalidCoordinate {
        key: key.to_owned(),
        axis,
        value: field.to_owned(),
    })
}

fn region_size(dimensions: &str) -> CellRectSize {
    let mut parts = dimensions.split('_');
    let mut next_dimension = || {
        parts
            .next()
            .and_then(|part| part.parse::<u32>().ok())
            .unwrap_or(1)
    };
    let width = next_dimension();
    let height = next_dimension();
    CellRectSize::new(width, height)
}

/// Randomizer system that translates `spots` entries into claim commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomizerSpots;

impl RandomizerSpots {
    /// Creates a new randomizer system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits one [`Command::ClaimSpots`] per entry, keyed by the entry key.
    ///
    /// The first entry that fails to parse or names a map outside `catalog`
    /// stops the batch: no later entry is emitted, while commands already
    /// pushed for earlier entries stay in `out`. An unknown map is also
    /// reported through [`Command::ReportUnknownMap`]. Returns the number of
    /// claims emitted.
    pub fn handle<'e, I>(
        &self,
        entries: I,
        catalog: &MapCatalog,
        out: &mut Vec<Command>,
    ) -> Result<usize, SpotError>
    where
        I: IntoIterator<Item = (&'e str, &'e str)>,
    {
        let mut claimed = 0;
        for (key, descriptor) in entries {
            let placement = parse_spot(key, descriptor)?;
            if !catalog.contains(placement.map().as_str()) {
                out.push(Command::ReportUnknownMap {
                    map: placement.map().clone(),
                    source: SpotSource::Randomizer,
                });
                return Err(SpotError::UnknownMap {
                    key: key.to_owned(),
                    map: placement.map().clone(),
                });
            }

            claimed += 1;
            out.push(Command::ClaimSpots {
                placement,
                occupant: OccupantKey::new(key),
            });
        }
        Ok(claimed)
    }
}
