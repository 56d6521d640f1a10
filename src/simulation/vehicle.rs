//! Vehicle state and path following
//!
//! A vehicle owns the full path from its start to its end cell and a cursor
//! into it. Its position is always `path[current_path_index]`.

use serde::Serialize;

use super::types::{Cell, Direction, VehicleKind, MAX_CHARGE};

/// Parameters for creating a vehicle
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub name: String,
    pub start: Cell,
    pub end: Cell,
    /// 1..=3, 3 marks an NPC
    pub vehicle_type: u8,
    pub model: Option<String>,
    /// Clamped to 0..=100
    pub charge: i32,
    pub charging_rate: i32,
    pub moving: bool,
}

impl NewVehicle {
    pub fn new(name: impl Into<String>, start: Cell, end: Cell) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            vehicle_type: 1,
            model: None,
            charge: MAX_CHARGE as i32,
            charging_rate: 0,
            moving: false,
        }
    }
}

/// Result of advancing a vehicle by one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Arrived,
}

/// A vehicle in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub name: String,
    pub kind: VehicleKind,
    pub vehicle_type: u8,
    pub model: String,
    pub start: Cell,
    pub end: Cell,
    pub charge: u8,
    pub charging_rate: u8,
    pub path: Vec<Cell>,
    pub current_path_index: usize,
    pub moving: bool,
    /// Set once the vehicle reaches the end of its path
    pub arrived: bool,
    pub direction: Direction,
}

impl SimVehicle {
    /// Build a vehicle around a path computed by the registry.
    /// `path` must start at `spec.start` and end at `spec.end`.
    pub fn new(spec: NewVehicle, path: Vec<Cell>) -> Self {
        let kind = VehicleKind::from_type(spec.vehicle_type);
        let direction = match path.as_slice() {
            [first, second, ..] => Direction::between(*first, *second).unwrap_or_default(),
            _ => Direction::default(),
        };
        let arrived = path.len() <= 1;

        Self {
            name: spec.name,
            kind,
            vehicle_type: spec.vehicle_type,
            model: spec.model.unwrap_or_else(|| "ambulance".to_string()),
            start: spec.start,
            end: spec.end,
            charge: spec.charge.clamp(0, MAX_CHARGE as i32) as u8,
            charging_rate: spec.charging_rate.clamp(0, MAX_CHARGE as i32) as u8,
            path,
            current_path_index: 0,
            moving: spec.moving && !arrived,
            arrived,
            direction,
        }
    }

    pub fn position(&self) -> Cell {
        self.path[self.current_path_index]
    }

    /// The cell the vehicle wants to enter next, if any
    pub fn next_cell(&self) -> Option<Cell> {
        self.path.get(self.current_path_index + 1).copied()
    }

    pub fn is_at_end(&self) -> bool {
        self.current_path_index + 1 >= self.path.len()
    }

    /// Move the cursor one cell along the path. The caller has already
    /// secured the target cell.
    pub fn advance(&mut self) -> StepOutcome {
        if let Some(next) = self.next_cell() {
            if let Some(direction) = Direction::between(self.position(), next) {
                self.direction = direction;
            }
            self.current_path_index += 1;
        }

        if self.is_at_end() {
            self.mark_arrived();
            StepOutcome::Arrived
        } else {
            StepOutcome::Moved
        }
    }

    pub fn mark_arrived(&mut self) {
        self.arrived = true;
        self.moving = false;
    }

    /// Replace the route with a new one starting at the current position
    pub fn reroute(&mut self, path: Vec<Cell>) {
        let position = self.position();
        debug_assert_eq!(path.first(), Some(&position));
        self.start = position;
        self.end = *path.last().unwrap_or(&position);
        self.path = path;
        self.current_path_index = 0;
        self.arrived = self.path.len() <= 1;
        self.moving = !self.arrived;
    }

    /// Top up the battery while parked
    pub fn charge_tick(&mut self) {
        if !self.moving && self.charge < MAX_CHARGE {
            self.charge = self.charge.saturating_add(self.charging_rate).min(MAX_CHARGE);
        }
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        let position = self.position();
        VehicleSnapshot {
            name: self.name.clone(),
            vehicle_type_id: self.vehicle_type,
            vehicle_type: self.model.clone(),
            kind: self.kind,
            start_x: self.start.x,
            start_y: self.start.y,
            end_x: self.end.x,
            end_y: self.end.y,
            charge: self.charge,
            charging_rate: self.charging_rate,
            path: self.path.clone(),
            current_path_index: self.current_path_index,
            moving: self.moving,
            arrived: self.arrived,
            current_x: position.x,
            current_y: position.y,
            current_direction: self.direction,
        }
    }

    pub fn status(&self) -> VehicleStatus {
        let position = self.position();
        VehicleStatus {
            charge: self.charge,
            current_x: position.x,
            current_y: position.y,
        }
    }
}

/// Point-in-time copy of a vehicle for polling clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub vehicle_type_id: u8,
    pub vehicle_type: String,
    pub kind: VehicleKind,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub charge: u8,
    pub charging_rate: u8,
    pub path: Vec<Cell>,
    pub current_path_index: usize,
    pub moving: bool,
    pub arrived: bool,
    pub current_x: i32,
    pub current_y: i32,
    pub current_direction: Direction,
}

impl VehicleSnapshot {
    pub fn position(&self) -> Cell {
        Cell::new(self.current_x, self.current_y)
    }
}

/// Battery and position of one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatus {
    pub charge: u8,
    pub current_x: i32,
    pub current_y: i32,
}
