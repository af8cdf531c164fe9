use serde_json::json;
use spotmap_core::{CellCoord, Event, MapCatalog, MapId, OccupantKey, SpotSource};
use spotmap_registry::{query, Registry};
use spotmap_system_ingestion::{DroppedFile, Ingestion, IngestionError};
use spotmap_system_randomizer::SpotError;

fn ingestion() -> Ingestion {
    Ingestion::new(MapCatalog::from_names(["Town", "Beach", "SeedShop"]))
}

fn file(name: &str, contents: serde_json::Value) -> DroppedFile {
    DroppedFile::new(name, contents.to_string())
}

fn names(registry: &Registry, map: &str, x: i32, y: i32) -> Vec<String> {
    query::occupants_at(registry, map, CellCoord::new(x, y))
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn schedule_file_claims_cells_for_the_file_occupant() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let dropped = file(
        "Abigail.json",
        json!({
            "spring": ["600 Town 10 20 2/1200 SeedShop 5 5"],
            "rain": ["900 Town 10 20 square_3_2"],
        }),
    );

    let report = ingestion()
        .ingest(&mut registry, &dropped, &mut events)
        .expect("schedule file ingests");

    assert_eq!(report.occupant, Some(OccupantKey::new("Abigail")));
    assert_eq!(report.schedule.claimed, 3);
    assert_eq!(names(&registry, "Town", 10, 20), vec!["Abigail"]);
    assert_eq!(names(&registry, "Town", 9, 19), vec!["Abigail"]);
    assert_eq!(names(&registry, "SeedShop", 5, 5), vec!["Abigail"]);

    let occupied = events
        .iter()
        .filter(|event| matches!(event, Event::CellOccupied { .. }))
        .count();
    assert_eq!(occupied, 7, "one Town cell, one SeedShop cell, five new rain cells");
}

#[test]
fn spots_batch_claims_per_entry_key() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let dropped = file(
        "spots.json",
        json!({
            "spots": {
                "a": "Beach 5 5 1",
                "b": "Beach 5 5 1 square_2_2",
            },
        }),
    );

    let report = ingestion()
        .ingest(&mut registry, &dropped, &mut events)
        .expect("spots file ingests");

    assert_eq!(report.spots_claimed, 2);
    assert_eq!(report.spots_error, None);
    assert_eq!(names(&registry, "Beach", 5, 5), vec!["a", "b"]);
    assert_eq!(names(&registry, "Beach", 4, 4), vec!["b"]);
    assert_eq!(report.schedule.claimed, 0);
}

#[test]
fn unknown_spots_map_stops_batch_but_not_schedules() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let dropped = file(
        "Penny.json",
        json!({
            "spots": {
                "1": "Town 1 1 0",
                "2": "Desert 2 2 0",
                "3": "Town 3 3 0",
            },
            "spring": ["600 Town 7 7"],
        }),
    );

    let report = ingestion()
        .ingest(&mut registry, &dropped, &mut events)
        .expect("file ingests despite bad spot");

    assert_eq!(report.spots_claimed, 1);
    assert_eq!(
        report.spots_error,
        Some(SpotError::UnknownMap {
            key: "2".to_owned(),
            map: MapId::new("Desert"),
        })
    );
    assert_eq!(names(&registry, "Town", 1, 1), vec!["1"]);
    assert!(names(&registry, "Town", 3, 3).is_empty(), "entry 3 follows the abort");
    assert_eq!(names(&registry, "Town", 7, 7), vec!["Penny"]);

    let reports: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::UnknownMapReported { .. }))
        .collect();
    assert_eq!(
        reports,
        vec![&Event::UnknownMapReported {
            map: MapId::new("Desert"),
            source: SpotSource::Randomizer,
        }]
    );
}

#[test]
fn unknown_schedule_map_is_reported_and_skipped() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let dropped = file(
        "Linus.json",
        json!({ "spring": ["600 Tent 2 2/800 Town 4 4"] }),
    );

    let report = ingestion()
        .ingest(&mut registry, &dropped, &mut events)
        .expect("schedule file ingests");

    assert_eq!(report.schedule.unknown_maps, vec![MapId::new("Tent")]);
    assert_eq!(names(&registry, "Town", 4, 4), vec!["Linus"]);
    assert!(query::occupied_cells(&registry, "Tent").next().is_none());
    assert_eq!(
        events.first(),
        Some(&Event::UnknownMapReported {
            map: MapId::new("Tent"),
            source: SpotSource::Schedule,
        })
    );
}

#[test]
fn bare_string_schedules_are_scanned() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let dropped = file(
        "Sam.json",
        json!({ "spring": "610 Town 10 20 2/1200 Town 15 25", "marriage": false }),
    );

    let report = ingestion()
        .ingest(&mut registry, &dropped, &mut events)
        .expect("schedule file ingests");

    assert_eq!(report.schedule.entries, 1);
    assert_eq!(names(&registry, "Town", 15, 25), vec!["Sam"]);
}

#[test]
fn broken_files_are_skipped_without_blocking_later_files() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let files = [
        DroppedFile::new("Broken.json", "{ not json"),
        DroppedFile::new("List.json", "[\"600 Town 1 1\"]"),
        file("Emily.json", json!({ "spring": ["600 Town 1 1"] })),
        file("Haley.json", json!({ "spring": ["700 Town 1 1"] })),
    ];

    let results = ingestion().ingest_all(&mut registry, &files, &mut events);

    assert_eq!(results.len(), 4);
    assert!(matches!(
        &results[0],
        Err(IngestionError::InvalidJson { file, .. }) if file == "Broken.json"
    ));
    assert!(matches!(
        &results[1],
        Err(IngestionError::NotAnObject { file }) if file == "List.json"
    ));
    assert!(results[2].is_ok());
    assert!(results[3].is_ok());
    assert_eq!(names(&registry, "Town", 1, 1), vec!["Emily", "Haley"]);
}

#[test]
fn dropping_the_same_file_twice_changes_nothing() {
    let mut registry = Registry::new();
    let dropped = file("Gus.json", json!({ "spring": ["600 Town 1 1 square_2_2"] }));
    let ingestion = ingestion();

    let mut first = Vec::new();
    let _ = ingestion.ingest(&mut registry, &dropped, &mut first);
    let mut second = Vec::new();
    let _ = ingestion.ingest(&mut registry, &dropped, &mut second);

    assert_eq!(first.len(), 8);
    assert!(second.is_empty());
    assert_eq!(names(&registry, "Town", 0, 0), vec!["Gus"]);
}

#[test]
fn files_without_an_occupant_skip_the_schedule_pass() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    let dropped = file("---", json!({ "spring": ["600 Town 1 1"] }));

    let report = ingestion()
        .ingest(&mut registry, &dropped, &mut events)
        .expect("file parses");

    assert_eq!(report.occupant, None);
    assert_eq!(report.schedule.entries, 0);
    assert!(events.is_empty());
}
