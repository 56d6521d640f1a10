//! NPC spawning on sparse maps under different retry budgets

use grid_traffic_sim::simulation::{
    Cell, GridMap, SimConfig, SimError, SimWorld, VehicleKind, NPC_MODELS, NPC_VEHICLE_TYPE,
};
use std::sync::Arc;

const SPAWN_ROUNDS: usize = 1000;

/// 10x10 map with a single two-way street along row 5, i.e. 10% road cover
fn sparse_map() -> GridMap {
    let mut builder = GridMap::builder(10, 10);
    for y in 1..10 {
        builder.connect_two_way(Cell::new(5, y), Cell::new(5, y + 1));
    }
    builder.build().unwrap()
}

fn sparse_world(spawn_attempts: u32, seed: u64) -> SimWorld {
    SimWorld::new(
        Arc::new(sparse_map()),
        SimConfig {
            spawn_attempts,
            seed: Some(seed),
            ..SimConfig::default()
        },
    )
}

/// Spawn and immediately remove an NPC `SPAWN_ROUNDS` times, returning the
/// number of failed spawns
fn spawn_rounds(world: &mut SimWorld) -> usize {
    let mut failures = 0;
    for _ in 0..SPAWN_ROUNDS {
        match world.spawn_npc(None) {
            Ok(npc) => {
                world.remove_vehicle(&npc.name).unwrap();
            }
            Err(SimError::NoValidCellFound { .. }) => failures += 1,
            Err(other) => panic!("unexpected spawn error: {other}"),
        }
    }
    failures
}

#[test]
fn test_small_retry_budget_eventually_fails() {
    let mut world = sparse_world(1, 11);
    assert_eq!(world.map().road_count(), 10);

    let failures = spawn_rounds(&mut world);

    // One try per spawn hits a road about one time in ten
    assert!(failures > SPAWN_ROUNDS / 2, "only {failures} failures");
    assert!(failures < SPAWN_ROUNDS, "no spawn ever succeeded");
    assert_eq!(world.stats().spawn_failures, failures as u64);
}

#[test]
fn test_large_retry_budget_always_succeeds() {
    let mut world = sparse_world(300, 11);

    let failures = spawn_rounds(&mut world);

    assert_eq!(failures, 0);
    assert_eq!(world.stats().npcs_spawned, SPAWN_ROUNDS as u64);
    assert_eq!(world.vehicle_count(), 0);
}

#[test]
fn test_full_map_reports_no_valid_cell() {
    let mut world = sparse_world(2000, 3);

    let spawned = world.spawn_npcs(10);
    assert_eq!(spawned.len(), 10);

    assert_eq!(
        world.spawn_npc(None).unwrap_err(),
        SimError::NoValidCellFound { attempts: 2000 }
    );
}

#[test]
fn test_spawned_npc_shape() {
    let mut world = sparse_world(100, 5);
    let npc = world.spawn_npc(Some(Cell::new(5, 3))).unwrap();

    assert!(npc.name.starts_with("NPC_"));
    assert_eq!(npc.kind, VehicleKind::Npc);
    assert_eq!(npc.vehicle_type_id, NPC_VEHICLE_TYPE);
    assert!(NPC_MODELS.contains(&npc.vehicle_type.as_str()));
    assert_eq!(npc.position(), Cell::new(5, 3));
    assert_eq!(npc.current_path_index, 0);
    assert!(npc.moving);
    assert_ne!((npc.end_x, npc.end_y), (5, 3));
    assert_eq!(npc.end_x, 5);
    assert_eq!(npc.path.last(), Some(&Cell::new(npc.end_x, npc.end_y)));
}

#[test]
fn test_npc_names_are_unique() {
    let mut world = sparse_world(100, 5);
    let first = world.spawn_npc(None).unwrap();
    let second = world.spawn_npc(None).unwrap();

    assert_ne!(first.name, second.name);
}

#[test]
fn test_spawn_hint_on_free_road_is_used() {
    let mut world = sparse_world(100, 5);
    let npc = world.spawn_npc(Some(Cell::new(5, 7))).unwrap();

    assert_eq!(npc.position(), Cell::new(5, 7));
    assert_eq!(npc.path.first(), Some(&Cell::new(5, 7)));
    assert_eq!(world.occupant(Cell::new(5, 7)), Some(npc.name.as_str()));
}

#[test]
fn test_unusable_spawn_hint_falls_back_to_sampling() {
    let mut world = sparse_world(2000, 5);
    let held = world.spawn_npc(Some(Cell::new(5, 5))).unwrap();
    assert_eq!(held.position(), Cell::new(5, 5));

    // Outside the map, off the road, and already taken
    for hint in [Cell::new(0, 0), Cell::new(1, 1), Cell::new(5, 5)] {
        let npc = world.spawn_npc(Some(hint)).unwrap();
        let start = npc.position();
        assert_eq!(start.x, 5, "{} spawned off the road at {}", npc.name, start);
        assert_ne!(start, Cell::new(5, 5));
        assert_eq!(world.occupant(start), Some(npc.name.as_str()));
    }
    assert_eq!(world.stats().spawn_failures, 0);
    assert_eq!(world.vehicle_count(), 4);
}
