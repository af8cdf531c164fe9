#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure schedule system that scrapes placements out of time-slot strings.
//!
//! A schedule entry packs one or more stops into a single line:
//!
//! ```text
//! 600 Town 10 20 2/1200 SeedShop 5 5 square_3_2
//! ```
//!
//! Every stop reads `<time> <map> <x> <y>`, optionally followed by a facing
//! digit and a `square_<W>_<H>` region modifier. Stops are chained with `/`.
//! The field is loosely structured, so anything that does not look like a stop
//! is skipped rather than rejected.

use std::sync::OnceLock;

use regex::{CaptureMatches, Captures, Regex};
use spotmap_core::{
    CellCoord, CellRectSize, Command, Facing, MapCatalog, MapId, OccupantKey, Placement,
    SpotSource,
};

const STOP_PATTERN: &str = concat!(
    r"(?:^|/)(?P<time>\d+) (?P<map>\w+) (?P<x>\d+) (?P<y>\d+)",
    r"(?: (?P<facing>[0-3])\b)?",
    r"(?: square_(?P<width>\d+)_(?P<height>\d+))?",
);

fn stop_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(STOP_PATTERN).expect("schedule stop pattern compiles"))
}

/// Single stop scraped from a schedule entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleStop {
    /// Time of day written in front of the stop, e.g. `600` or `1200`.
    pub time: u32,
    /// Region of the map the character occupies at this stop.
    pub placement: Placement,
    /// Direction the character faces, when the entry states one.
    pub facing: Option<Facing>,
}

/// Lazy iterator over the stops contained in one schedule entry.
///
/// Scanning resumes where the previous stop ended. Call [`stops`] again to
/// restart from the beginning.
#[derive(Debug)]
pub struct ScheduleStops<'t> {
    captures: CaptureMatches<'static, 't>,
}

impl Iterator for ScheduleStops<'_> {
    type Item = ScheduleStop;

    fn next(&mut self) -> Option<Self::Item> {
        self.captures.by_ref().find_map(|captures| stop_from(&captures))
    }
}

/// Scans `entry` for schedule stops.
#[must_use]
pub fn stops(entry: &str) -> ScheduleStops<'_> {
    ScheduleStops {
        captures: stop_pattern().captures_iter(entry),
    }
}

/// Scans `entry` for schedule stops, keeping only their placements.
pub fn placements(entry: &str) -> impl Iterator<Item = Placement> + '_ {
    stops(entry).map(|stop| stop.placement)
}

// Digit runs that overflow their field discard the whole stop.
fn stop_from(captures: &Captures<'_>) -> Option<ScheduleStop> {
    let time = captures.name("time")?.as_str().parse().ok()?;
    let map = MapId::new(captures.name("map")?.as_str());
    let x = captures.name("x")?.as_str().parse().ok()?;
    let y = captures.name("y")?.as_str().parse().ok()?;

    let size = match (captures.name("width"), captures.name("height")) {
        (Some(width), Some(height)) => {
            CellRectSize::new(width.as_str().parse().ok()?, height.as_str().parse().ok()?)
        }
        _ => CellRectSize::UNIT,
    };

    let facing = match captures.name("facing") {
        Some(digit) => Facing::from_digit(digit.as_str().parse().ok()?),
        None => None,
    };

    Some(ScheduleStop {
        time,
        placement: Placement::new(map, CellCoord::new(x, y), size),
        facing,
    })
}

/// Summary of a single [`ScheduleScraper::handle`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Number of entries scanned.
    pub entries: usize,
    /// Entries that contained no recognizable stop.
    pub unmatched_entries: usize,
    /// Stops turned into claim commands.
    pub claimed: usize,
    /// Maps referenced by stops but absent from the catalog, in first-seen
    /// order.
    pub unknown_maps: Vec<MapId>,
}

/// Schedule system that translates schedule entries into claim commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleScraper;

impl ScheduleScraper {
    /// Creates a new schedule system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits one [`Command::ClaimSpots`] per stop found in `entries`.
    ///
    /// Stops on maps outside `catalog` are skipped and their map is reported
    /// once through [`Command::ReportUnknownMap`]; scanning carries on.
    pub fn handle<'e, I>(
        &self,
        occupant: &OccupantKey,
        entries: I,
        catalog: &MapCatalog,
        out: &mut Vec<Command>,
    ) -> ScheduleReport
    where
        I: IntoIterator<Item = &'e str>,
    {
        let mut report = ScheduleReport::default();
        for entry in entries {
            report.entries += 1;
            let mut matched = false;

            for stop in stops(entry) {
                matched = true;
                let map = stop.placement.map();
                if !catalog.contains(map.as_str()) {
                    if !report.unknown_maps.contains(map) {
                        report.unknown_maps.push(map.clone());
                        out.push(Command::ReportUnknownMap {
                            map: map.clone(),
                            source: SpotSource::Schedule,
                        });
                    }
                    continue;
                }

                report.claimed += 1;
                out.push(Command::ClaimSpots {
                    placement: stop.placement,
                    occupant: occupant.clone(),
                });
            }

            if !matched {
                report.unmatched_entries += 1;
            }
        }
        report
    }
}
