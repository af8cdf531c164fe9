#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the spot overlay engine.
//!
//! This crate defines the grid geometry and the message surface that connects
//! the parsing systems, the authoritative occupant registry, and rendering
//! adapters. Systems translate raw schedule data into [`Command`] values, the
//! registry executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values that adapters turn into drawn markers.

use std::{borrow::Borrow, collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Side length of a single grid cell measured in image pixels.
pub const CELL_LENGTH_PX: i32 = 16;

/// Commands that express all permissible registry mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that every cell covered by the placement lists the occupant.
    ClaimSpots {
        /// Rectangular region to claim on a named map.
        placement: Placement,
        /// Identifier of who or what claims the region.
        occupant: OccupantKey,
    },
    /// Requests that adapters learn about a map reference they cannot present.
    ReportUnknownMap {
        /// Identifier that did not resolve against the map catalog.
        map: MapId,
        /// Data format that referenced the map.
        source: SpotSource,
    },
}

/// Events broadcast by the registry after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a cell transitioned from empty to occupied.
    ///
    /// This is emitted exactly once per map and cell, and is the only event
    /// that requires a renderer to draw a new marker.
    CellOccupied {
        /// Map that contains the cell.
        map: MapId,
        /// Cell that gained its first occupant.
        cell: CellCoord,
    },
    /// Confirms that an occupant was appended to a cell's occupant list.
    OccupantsChanged {
        /// Map that contains the cell.
        map: MapId,
        /// Cell whose occupant list grew.
        cell: CellCoord,
        /// Occupant that was appended.
        occupant: OccupantKey,
    },
    /// Reports that a data file referenced a map outside the catalog.
    UnknownMapReported {
        /// Identifier that did not resolve against the map catalog.
        map: MapId,
        /// Data format that referenced the map.
        source: SpotSource,
    },
}

/// Data formats that can place occupants on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotSource {
    /// Per-character schedule files with chained time-slot strings.
    Schedule,
    /// Randomizer `spots` batches with one descriptor per entry.
    Randomizer,
}

impl fmt::Display for SpotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule => f.write_str("schedule"),
            Self::Randomizer => f.write_str("randomizer"),
        }
    }
}

/// Identifier of a map image, such as `Town` or `BathHouse_Entry`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(String);

impl MapId {
    /// Creates a new map identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MapId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of who or what claims a cell: a villager name or a randomizer
/// entry key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupantKey(String);

impl OccupantKey {
    /// Creates a new occupant key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccupantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of a single grid cell. Coordinates are unbounded in both
/// directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Converts an image pixel position into the cell that contains it.
///
/// Division floors toward negative infinity, so pixel `-1` lands in cell `-1`.
#[must_use]
pub const fn pixel_to_cell(px: i32, py: i32) -> CellCoord {
    CellCoord::new(px.div_euclid(CELL_LENGTH_PX), py.div_euclid(CELL_LENGTH_PX))
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Single cell footprint used when no region modifier is present.
    pub const UNIT: Self = Self {
        width: 1,
        height: 1,
    };

    /// Creates a new size descriptor. Dimensions below one are raised to one
    /// so a footprint is never empty.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: if width == 0 { 1 } else { width },
            height: if height == 0 { 1 } else { height },
        }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl Default for CellRectSize {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Number of cells covered by the rectangle.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.size.width as u64 * self.size.height as u64
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let dx = i64::from(cell.x()) - i64::from(self.origin.x());
        let dy = i64::from(cell.y()) - i64::from(self.origin.y());
        (0..i64::from(self.size.width())).contains(&dx)
            && (0..i64::from(self.size.height())).contains(&dy)
    }

    /// Enumerates the covered cells column by column.
    ///
    /// Cells that would fall outside the `i32` coordinate range are skipped.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let height = self.size.height();
        (0..self.size.width()).flat_map(move |dx| {
            (0..height).filter_map(move |dy| {
                let x = i32::try_from(i64::from(origin.x()) + i64::from(dx)).ok()?;
                let y = i32::try_from(i64::from(origin.y()) + i64::from(dy)).ok()?;
                Some(CellCoord::new(x, y))
            })
        })
    }
}

/// Computes the region covered by a footprint centered on `center`.
///
/// The top-left cell sits at `center - floor(size / 2)` on each axis.
#[must_use]
pub fn footprint(center: CellCoord, size: CellRectSize) -> CellRect {
    let half_width = i32::try_from(size.width() / 2).unwrap_or(i32::MAX);
    let half_height = i32::try_from(size.height() / 2).unwrap_or(i32::MAX);
    let origin = CellCoord::new(
        center.x().saturating_sub(half_width),
        center.y().saturating_sub(half_height),
    );
    CellRect::from_origin_and_size(origin, size)
}

/// Parsed instruction to mark a rectangular group of cells on a named map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    map: MapId,
    center: CellCoord,
    size: CellRectSize,
}

impl Placement {
    /// Creates a placement centered on the provided cell.
    #[must_use]
    pub fn new(map: MapId, center: CellCoord, size: CellRectSize) -> Self {
        Self { map, center, size }
    }

    /// Creates a single-cell placement.
    #[must_use]
    pub fn single(map: MapId, center: CellCoord) -> Self {
        Self::new(map, center, CellRectSize::UNIT)
    }

    /// Map the placement targets.
    #[must_use]
    pub fn map(&self) -> &MapId {
        &self.map
    }

    /// Cell the footprint is centered on.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        self.center
    }

    /// Dimensions of the footprint.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Region of cells covered by the placement.
    #[must_use]
    pub fn footprint(&self) -> CellRect {
        footprint(self.center, self.size)
    }
}

/// Direction a character faces at a schedule stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Digit `0`.
    Up,
    /// Digit `1`.
    Right,
    /// Digit `2`.
    Down,
    /// Digit `3`.
    Left,
}

impl Facing {
    /// Decodes a facing digit in the range `0..=3`.
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }
}

/// Set of map identifiers that adapters are able to present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapCatalog {
    maps: BTreeSet<MapId>,
}

impl MapCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from textual map names.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            maps: names.into_iter().map(MapId::new).collect(),
        }
    }

    /// Adds a map, returning `false` when it was already present.
    pub fn insert(&mut self, map: MapId) -> bool {
        self.maps.insert(map)
    }

    /// Reports whether the catalog knows the map.
    #[must_use]
    pub fn contains(&self, map: &str) -> bool {
        self.maps.contains(map)
    }

    /// Iterator over the known maps in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &MapId> {
        self.maps.iter()
    }

    /// Number of known maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Reports whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
