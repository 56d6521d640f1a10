//! Cell geometry and wire format tests

use grid_traffic_sim::simulation::{
    Cell, Direction, GridMap, NewVehicle, SimConfig, SimWorld, VehicleKind,
};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_pixel_origin() {
    assert_eq!(Cell::new(1, 1).pixel_origin(), (20, 20));
    // Column drives the horizontal axis
    assert_eq!(Cell::new(2, 3).pixel_origin(), (60, 40));
}

#[test]
fn test_adjacency() {
    let cell = Cell::new(3, 3);
    assert!(cell.is_adjacent(&Cell::new(2, 3)));
    assert!(cell.is_adjacent(&Cell::new(3, 4)));
    assert!(!cell.is_adjacent(&Cell::new(4, 4)));
    assert!(!cell.is_adjacent(&cell));
    assert!(cell.neighbours().iter().all(|n| cell.is_adjacent(n)));
    assert_eq!(cell.manhattan(&Cell::new(1, 6)), 5);
}

#[test]
fn test_direction_between_cells() {
    let from = Cell::new(2, 2);
    assert_eq!(Direction::between(from, Cell::new(3, 2)), Some(Direction::Down));
    assert_eq!(Direction::between(from, Cell::new(1, 2)), Some(Direction::Up));
    assert_eq!(Direction::between(from, Cell::new(2, 3)), Some(Direction::Right));
    assert_eq!(Direction::between(from, Cell::new(2, 1)), Some(Direction::Left));
    assert_eq!(Direction::between(from, Cell::new(3, 3)), None);
}

#[test]
fn test_vehicle_kind_from_type() {
    assert_eq!(VehicleKind::from_type(1), VehicleKind::Ev);
    assert_eq!(VehicleKind::from_type(2), VehicleKind::Ev);
    assert_eq!(VehicleKind::from_type(3), VehicleKind::Npc);
}

#[test]
fn test_snapshot_wire_format() {
    let map = GridMap::builder(1, 2)
        .connect_two_way(Cell::new(1, 1), Cell::new(1, 2))
        .build()
        .unwrap();
    let mut world = SimWorld::new(Arc::new(map), SimConfig::default());
    let mut spec = NewVehicle::new("ev1", Cell::new(1, 1), Cell::new(1, 2));
    spec.model = Some("sedan".to_string());
    spec.charging_rate = 5;
    let snapshot = world.create_vehicle(spec).unwrap();

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(
        value,
        json!({
            "name": "ev1",
            "type": 1,
            "vehicleType": "sedan",
            "kind": "ev",
            "startX": 1,
            "startY": 1,
            "endX": 1,
            "endY": 2,
            "charge": 100,
            "chargingRate": 5,
            "path": [{"x": 1, "y": 1}, {"x": 1, "y": 2}],
            "currentPathIndex": 0,
            "moving": false,
            "arrived": false,
            "currentX": 1,
            "currentY": 1,
            "currentDirection": "right",
        })
    );
}

#[test]
fn test_road_and_signal_wire_format() {
    let map = GridMap::builder(1, 2)
        .connect(Cell::new(1, 1), Cell::new(1, 2))
        .set_signal(Cell::new(1, 2), 1)
        .build()
        .unwrap();
    let world = SimWorld::with_map(map.clone());

    assert_eq!(
        serde_json::to_value(map.roads()).unwrap(),
        json!([
            {"x": 1, "y": 1, "oneWay": true},
            {"x": 1, "y": 2, "oneWay": true},
        ])
    );
    assert_eq!(
        serde_json::to_value(world.signals()).unwrap(),
        json!([{"x": 1, "y": 2, "isGreen": true}])
    );
}
