//! Long random runs that check the movement invariants after every tick

use grid_traffic_sim::simulation::{Cell, GridMap, SignalPhase, SimConfig, SimWorld};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn run_and_check(seed: u64, npcs: usize, ticks: usize, config: SimConfig) {
    let map = GridMap::demo(16, 5).unwrap();
    let mut world = SimWorld::new(
        Arc::new(map),
        SimConfig {
            seed: Some(seed),
            ..config
        },
    );
    let spawned = world.spawn_npcs(npcs);
    assert!(!spawned.is_empty());

    let mut last: HashMap<String, Cell> = world
        .vehicles()
        .into_iter()
        .map(|v| (v.name.clone(), v.position()))
        .collect();

    for tick in 0..ticks {
        world.tick(0.5);
        let map = world.map().clone();
        let mut taken = HashSet::new();

        for vehicle in world.vehicles() {
            let here = vehicle.position();

            assert!(vehicle.current_path_index < vehicle.path.len());
            assert!(map.is_road(here), "tick {tick}: {} off road", vehicle.name);
            assert!(
                taken.insert(here),
                "tick {tick}: two vehicles share {here}"
            );
            assert_eq!(world.occupant(here), Some(vehicle.name.as_str()));

            if let Some(&before) = last.get(&vehicle.name) {
                if before != here {
                    assert!(
                        map.permits(before, here),
                        "tick {tick}: {} jumped {before} -> {here}",
                        vehicle.name
                    );
                    if let Some(phase) = world.signal_phase(here) {
                        assert_eq!(
                            phase,
                            SignalPhase::Green,
                            "tick {tick}: {} entered {here} on red",
                            vehicle.name
                        );
                    }
                }
            }
            last.insert(vehicle.name.clone(), here);
        }
    }
}

#[test]
fn test_invariants_hold_with_parked_arrivals() {
    run_and_check(42, 40, 400, SimConfig::default());
}

#[test]
fn test_invariants_hold_with_roaming_npcs() {
    let config = SimConfig {
        npc_roaming: true,
        ..SimConfig::default()
    };
    run_and_check(7, 60, 400, config);
}

#[test]
fn test_invariants_hold_with_crossing_margin() {
    let config = SimConfig {
        npc_roaming: true,
        crossing_margin_secs: 2.0,
        ..SimConfig::default()
    };
    run_and_check(1234, 30, 300, config);
}

#[test]
fn test_runs_are_reproducible_with_a_seed() {
    let run = || {
        let config = SimConfig {
            seed: Some(99),
            npc_roaming: true,
            ..SimConfig::default()
        };
        let mut world = SimWorld::new(Arc::new(GridMap::demo(16, 5).unwrap()), config);
        world.spawn_npcs(20);
        for _ in 0..100 {
            world.tick(1.0);
        }
        world.vehicles()
    };

    assert_eq!(run(), run());
}
