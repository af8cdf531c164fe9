#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for spot overlay adapters.
//!
//! Adapters own the canvas and the map images. The engine only hands them
//! events through [`dispatch`], plus the geometry and tooltip helpers below,
//! so a backend never has to inspect the registry to decide what to draw.

mod manifest;

use std::collections::BTreeMap;

use glam::Vec2;
use spotmap_core::{
    pixel_to_cell, CellCoord, Event, MapId, OccupantKey, SpotSource, CELL_LENGTH_PX,
};
use spotmap_registry::{query, Registry};
use tracing::warn;

pub use manifest::{
    default_manifest_path, load_map_catalog, map_id_from_image_path, parse_map_manifest,
};

/// RGBA color used when presenting markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }
}

/// Fill used for occupied-cell markers: translucent yellow, `#ff0a`.
pub const MARKER_COLOR: Color = Color::from_rgba_u8(0xff, 0xff, 0x00, 0xaa);

const MARKER_INSET_PX: f32 = 1.0;

/// Screen-space rectangle covering the visible part of a cell marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerRect {
    /// Top-left corner in image pixels.
    pub origin: Vec2,
    /// Width and height in image pixels.
    pub size: Vec2,
}

impl MarkerRect {
    /// Marker for `cell`, inset by one pixel on every side.
    #[must_use]
    pub fn for_cell(cell: CellCoord) -> Self {
        let cell_length = CELL_LENGTH_PX as f32;
        let corner = Vec2::new(cell.x() as f32, cell.y() as f32) * cell_length;
        Self {
            origin: corner + Vec2::splat(MARKER_INSET_PX),
            size: Vec2::splat(cell_length - 2.0 * MARKER_INSET_PX),
        }
    }

    /// Reports whether the pixel position lies inside the marker.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        let end = self.origin + self.size;
        position.x >= self.origin.x
            && position.y >= self.origin.y
            && position.x < end.x
            && position.y < end.y
    }
}

/// Resolves a cursor position in image pixels to the cell beneath it.
#[must_use]
pub fn cell_under_cursor(position: Vec2) -> CellCoord {
    pixel_to_cell(position.x.floor() as i32, position.y.floor() as i32)
}

/// Formats the tooltip for a cell: occupants joined by `, `, then `(x,y)`.
///
/// A cell without occupants shows only its coordinates.
#[must_use]
pub fn tooltip_text(occupants: &[OccupantKey], cell: CellCoord) -> String {
    if occupants.is_empty() {
        return cell.to_string();
    }

    let names: Vec<&str> = occupants.iter().map(OccupantKey::as_str).collect();
    format!("{} {cell}", names.join(", "))
}

/// Tooltip for the cell under the cursor on `map`.
#[must_use]
pub fn hover_text(registry: &Registry, map: &str, position: Vec2) -> String {
    let cell = cell_under_cursor(position);
    tooltip_text(query::occupants_at(registry, map, cell), cell)
}

/// Presentation backend that reacts to registry events.
pub trait SpotRenderer {
    /// Draws a marker for a cell that just gained its first occupant.
    fn on_newly_occupied(&mut self, map: &MapId, cell: CellCoord);

    /// Observes an occupant being appended to a cell.
    ///
    /// Tooltips are computed on demand from the registry, so most backends
    /// have nothing to do here.
    fn on_occupants_changed(&mut self, _map: &MapId, _cell: CellCoord, _occupant: &OccupantKey) {
    }

    /// Surfaces a map reference that did not resolve against the catalog.
    fn report_unknown_map(&mut self, map: &MapId, source: SpotSource);
}

/// Forwards each event to the matching renderer callback, in order.
pub fn dispatch<R>(events: &[Event], renderer: &mut R)
where
    R: SpotRenderer + ?Sized,
{
    for event in events {
        match event {
            Event::CellOccupied { map, cell } => renderer.on_newly_occupied(map, *cell),
            Event::OccupantsChanged {
                map,
                cell,
                occupant,
            } => renderer.on_occupants_changed(map, *cell, occupant),
            Event::UnknownMapReported { map, source } => {
                renderer.report_unknown_map(map, *source);
            }
        }
    }
}

/// Retained marker list for backends that redraw every frame.
#[derive(Clone, Debug, Default)]
pub struct MarkerLayer {
    markers: BTreeMap<MapId, Vec<MarkerRect>>,
    unknown_maps: Vec<MapId>,
}

impl MarkerLayer {
    /// Creates an empty marker layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers drawn on `map`, in the order their cells became occupied.
    #[must_use]
    pub fn markers(&self, map: &str) -> &[MarkerRect] {
        self.markers.get(map).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Unknown maps reported so far, each listed once.
    #[must_use]
    pub fn unknown_maps(&self) -> &[MapId] {
        &self.unknown_maps
    }
}

impl SpotRenderer for MarkerLayer {
    fn on_newly_occupied(&mut self, map: &MapId, cell: CellCoord) {
        self.markers
            .entry(map.clone())
            .or_default()
            .push(MarkerRect::for_cell(cell));
    }

    fn report_unknown_map(&mut self, map: &MapId, source: SpotSource) {
        warn!(%map, %source, "data file references a map that is not loaded");
        if !self.unknown_maps.contains(map) {
            self.unknown_maps.push(map.clone());
        }
    }
}
