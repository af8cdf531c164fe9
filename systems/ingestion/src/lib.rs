#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ingestion system that routes dropped data files through the parsing
//! systems and into the registry.
//!
//! A dropped file is a JSON object. A `spots` field holds a randomizer batch;
//! every other field is treated as schedule data belonging to the occupant
//! named by the leading word of the file name. Each file is handled on its
//! own, so a broken file never prevents later files from being ingested.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use spotmap_core::{Command, Event, MapCatalog, OccupantKey};
use spotmap_registry::{self as registry, Registry};
use spotmap_system_randomizer::{RandomizerSpots, SpotError};
use spotmap_system_schedule::{ScheduleReport, ScheduleScraper};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Top-level field that carries a randomizer batch.
pub const SPOTS_FIELD: &str = "spots";

fn leading_word() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("leading word pattern compiles"))
}

/// Text payload of a file handed over by the adapter after reading it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedFile {
    name: String,
    contents: String,
}

impl DroppedFile {
    /// Creates a dropped file from its name and full text contents.
    #[must_use]
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// File name as reported by the adapter, e.g. `Abigail.json`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw text contents.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Derives the schedule occupant from a file name: its first word token.
///
/// `Abigail.json` yields `Abigail`; a name without any word character yields
/// `None`.
#[must_use]
pub fn occupant_from_file_name(name: &str) -> Option<OccupantKey> {
    leading_word()
        .find(name)
        .map(|word| OccupantKey::new(word.as_str()))
}

/// Reasons a dropped file is skipped entirely.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The contents are not JSON.
    #[error("`{file}` is not valid JSON")]
    InvalidJson {
        /// Name of the dropped file.
        file: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The top-level JSON value is not an object.
    #[error("`{file}` does not hold a JSON object at the top level")]
    NotAnObject {
        /// Name of the dropped file.
        file: String,
    },
}

/// Outcome of ingesting a single file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    /// Name of the dropped file.
    pub file: String,
    /// Randomizer entries claimed before the batch finished or stopped.
    pub spots_claimed: usize,
    /// Reason the randomizer batch stopped early, if it did.
    pub spots_error: Option<SpotError>,
    /// Occupant derived from the file name for the schedule pass.
    pub occupant: Option<OccupantKey>,
    /// Summary of the schedule pass; empty when no occupant was derived.
    pub schedule: ScheduleReport,
}

/// Coordinates the parsing systems for dropped files.
#[derive(Clone, Debug, Default)]
pub struct Ingestion {
    catalog: MapCatalog,
    schedule: ScheduleScraper,
    randomizer: RandomizerSpots,
}

impl Ingestion {
    /// Creates an ingestion system that resolves maps against `catalog`.
    #[must_use]
    pub fn new(catalog: MapCatalog) -> Self {
        Self {
            catalog,
            schedule: ScheduleScraper::new(),
            randomizer: RandomizerSpots::new(),
        }
    }

    /// Maps the ingestion system accepts.
    #[must_use]
    pub fn catalog(&self) -> &MapCatalog {
        &self.catalog
    }

    /// Ingests every file in order, each independently of the others.
    pub fn ingest_all<'f, I>(
        &self,
        registry: &mut Registry,
        files: I,
        out_events: &mut Vec<Event>,
    ) -> Vec<Result<FileReport, IngestionError>>
    where
        I: IntoIterator<Item = &'f DroppedFile>,
    {
        files
            .into_iter()
            .map(|file| {
                let result = self.ingest(registry, file, out_events);
                if let Err(error) = &result {
                    warn!(%error, "skipped dropped file");
                }
                result
            })
            .collect()
    }

    /// Ingests a single dropped file into the registry.
    ///
    /// The randomizer batch is applied first. Stopping it early does not
    /// prevent the schedule pass over the remaining fields.
    pub fn ingest(
        &self,
        registry: &mut Registry,
        file: &DroppedFile,
        out_events: &mut Vec<Event>,
    ) -> Result<FileReport, IngestionError> {
        let document: Value =
            serde_json::from_str(file.contents()).map_err(|source| IngestionError::InvalidJson {
                file: file.name().to_owned(),
                source,
            })?;
        let Value::Object(fields) = document else {
            return Err(IngestionError::NotAnObject {
                file: file.name().to_owned(),
            });
        };

        let mut report = FileReport {
            file: file.name().to_owned(),
            spots_claimed: 0,
            spots_error: None,
            occupant: occupant_from_file_name(file.name()),
            schedule: ScheduleReport::default(),
        };
        let mut commands = Vec::new();

        if let Some(spots) = fields.get(SPOTS_FIELD) {
            if let Value::Object(entries) = spots {
                // Non-string descriptors carry no map and stop the batch.
                let entries = entries
                    .iter()
                    .map(|(key, descriptor)| (key.as_str(), descriptor.as_str().unwrap_or("")));
                match self.randomizer.handle(entries, &self.catalog, &mut commands) {
                    Ok(claimed) => report.spots_claimed = claimed,
                    Err(error) => {
                        warn!(file = file.name(), %error, "stopped randomizer batch");
                        report.spots_claimed = count_claims(&commands);
                        report.spots_error = Some(error);
                    }
                }
                flush(registry, &mut commands, out_events);
            } else {
                warn!(file = file.name(), "ignored `spots` field that is not an object");
            }
        }

        match &report.occupant {
            Some(occupant) => {
                let entries = fields
                    .iter()
                    .filter(|(name, _)| name.as_str() != SPOTS_FIELD)
                    .flat_map(|(_, value)| schedule_entries(value));
                report.schedule = self
                    .schedule
                    .handle(occupant, entries, &self.catalog, &mut commands);
                flush(registry, &mut commands, out_events);
            }
            None => warn!(file = file.name(), "file name has no occupant; skipped schedules"),
        }

        for map in &report.schedule.unknown_maps {
            warn!(file = file.name(), %map, "schedule references unknown map");
        }
        if report.schedule.unmatched_entries > 0 {
            debug!(
                file = file.name(),
                unmatched = report.schedule.unmatched_entries,
                "schedule entries without stops"
            );
        }
        info!(
            file = file.name(),
            spots = report.spots_claimed,
            stops = report.schedule.claimed,
            "ingested dropped file"
        );

        Ok(report)
    }
}

// Arrays contribute their string elements; a bare string is one entry.
fn schedule_entries(value: &Value) -> Vec<&str> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(entry) => vec![entry.as_str()],
        _ => Vec::new(),
    }
}

fn count_claims(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| matches!(command, Command::ClaimSpots { .. }))
        .count()
}

fn flush(registry: &mut Registry, commands: &mut Vec<Command>, out_events: &mut Vec<Event>) {
    for command in commands.drain(..) {
        registry::apply(registry, command, out_events);
    }
}
