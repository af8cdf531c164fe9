use spotmap_core::{CellCoord, CellRectSize, Command, Event, MapId, OccupantKey, Placement};
use spotmap_registry::{self as registry, query, Registry};

fn claim(registry: &mut Registry, map: &str, x: i32, y: i32, size: (u32, u32), who: &str) {
    let mut events = Vec::new();
    registry::apply(
        registry,
        Command::ClaimSpots {
            placement: Placement::new(
                MapId::new(map),
                CellCoord::new(x, y),
                CellRectSize::new(size.0, size.1),
            ),
            occupant: OccupantKey::new(who),
        },
        &mut events,
    );
}

fn names(occupants: &[OccupantKey]) -> Vec<&str> {
    occupants.iter().map(OccupantKey::as_str).collect()
}

#[test]
fn untouched_cells_and_maps_have_no_occupants() {
    let mut registry = Registry::new();
    assert!(query::occupants_at(&registry, "Town", CellCoord::new(0, 0)).is_empty());

    claim(&mut registry, "Town", 3, 3, (1, 1), "Abigail");
    assert!(query::occupants_at(&registry, "Town", CellCoord::new(4, 3)).is_empty());
    assert!(query::occupants_at(&registry, "Beach", CellCoord::new(3, 3)).is_empty());
    assert!(!query::is_occupied(&registry, "Beach", CellCoord::new(3, 3)));
}

#[test]
fn occupants_keep_first_claim_order_without_duplicates() {
    let mut registry = Registry::new();
    claim(&mut registry, "Town", 5, 5, (1, 1), "Sam");
    claim(&mut registry, "Town", 5, 5, (3, 3), "Abigail");
    claim(&mut registry, "Town", 5, 5, (1, 1), "Sam");
    claim(&mut registry, "Town", 6, 6, (1, 1), "Sebastian");
    claim(&mut registry, "Town", 5, 5, (2, 2), "Abigail");

    assert_eq!(
        names(query::occupants_at(&registry, "Town", CellCoord::new(5, 5))),
        vec!["Sam", "Abigail"]
    );
    assert_eq!(
        names(query::occupants_at(&registry, "Town", CellCoord::new(6, 6))),
        vec!["Abigail", "Sebastian"]
    );
}

#[test]
fn reapplying_a_claim_emits_no_events_and_keeps_occupants() {
    let mut registry = Registry::new();
    let command = Command::ClaimSpots {
        placement: Placement::new(
            MapId::new("Beach"),
            CellCoord::new(5, 5),
            CellRectSize::new(2, 2),
        ),
        occupant: OccupantKey::new("b"),
    };

    let mut first = Vec::new();
    registry::apply(&mut registry, command.clone(), &mut first);
    let after_first: Vec<_> = query::occupied_cells(&registry, "Beach")
        .map(|(cell, occupants)| (cell, occupants.to_vec()))
        .collect();

    let mut second = Vec::new();
    registry::apply(&mut registry, command, &mut second);
    let after_second: Vec<_> = query::occupied_cells(&registry, "Beach")
        .map(|(cell, occupants)| (cell, occupants.to_vec()))
        .collect();

    let occupied = first
        .iter()
        .filter(|event| matches!(event, Event::CellOccupied { .. }))
        .count();
    assert_eq!(occupied, 4, "a fresh 2x2 claim occupies four cells");
    assert!(second.is_empty(), "identical claim must not signal again");
    assert_eq!(after_first, after_second);
}

#[test]
fn cell_occupied_fires_once_per_cell_across_occupants() {
    let mut registry = Registry::new();
    let mut events = Vec::new();
    for who in ["Abigail", "Sam", "Sebastian"] {
        registry::apply(
            &mut registry,
            Command::ClaimSpots {
                placement: Placement::single(MapId::new("Saloon"), CellCoord::new(2, 9)),
                occupant: OccupantKey::new(who),
            },
            &mut events,
        );
    }

    let occupied: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::CellOccupied { .. }))
        .collect();
    let changed = events
        .iter()
        .filter(|event| matches!(event, Event::OccupantsChanged { .. }))
        .count();
    assert_eq!(
        occupied,
        vec![&Event::CellOccupied {
            map: MapId::new("Saloon"),
            cell: CellCoord::new(2, 9),
        }]
    );
    assert_eq!(changed, 3);
}

#[test]
fn occupied_cells_follow_first_occupation_order() {
    let mut registry = Registry::new();
    claim(&mut registry, "Town", 1, 1, (1, 1), "a");
    claim(&mut registry, "Town", 0, 0, (1, 1), "b");
    claim(&mut registry, "Forest", 0, 0, (1, 1), "c");

    let cells: Vec<_> = query::occupied_cells(&registry, "Town")
        .map(|(cell, _)| cell)
        .collect();
    assert_eq!(cells, vec![CellCoord::new(1, 1), CellCoord::new(0, 0)]);

    let maps: Vec<_> = query::maps(&registry).map(MapId::as_str).collect();
    assert_eq!(maps, vec!["Forest", "Town"]);
    assert_eq!(registry.cell_count(), 3);
}

#[test]
fn negative_cells_are_stored_like_any_other() {
    let mut registry = Registry::new();
    claim(&mut registry, "Mountain", 0, 0, (3, 3), "wide");

    assert_eq!(
        names(query::occupants_at(&registry, "Mountain", CellCoord::new(-1, -1))),
        vec!["wide"]
    );
}
