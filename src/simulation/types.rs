//! Core types for the traffic simulation
//!
//! These are plain data types shared by the map, the signal scheduler and the
//! vehicle registry. None of them depend on the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge length of one grid cell in client pixels
pub const TILE_SIZE: i32 = 20;

/// Highest vehicle type accepted from clients
pub const MAX_VEHICLE_TYPE: u8 = 3;

/// Vehicle type reserved for spawned NPC traffic
pub const NPC_VEHICLE_TYPE: u8 = 3;

/// Upper bound of a vehicle's battery charge
pub const MAX_CHARGE: u8 = 100;

/// Vehicle models handed out to spawned NPCs
pub const NPC_MODELS: [&str; 11] = [
    "ambulance",
    "coupe",
    "ev",
    "hatchback",
    "luxury",
    "pickup",
    "sedan",
    "sport",
    "super",
    "suv",
    "van",
];

/// A grid cell. `x` is the row and `y` the column, both 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True when `other` shares an edge with this cell
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.manhattan(other) == 1
    }

    /// The four edge-sharing neighbours, without any bounds check
    pub fn neighbours(&self) -> [Cell; 4] {
        [
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x, self.y + 1),
        ]
    }

    /// Top-left pixel of this cell in the client's canvas.
    /// Columns map to the horizontal axis, rows to the vertical one.
    pub fn pixel_origin(&self) -> (i32, i32) {
        (self.y * TILE_SIZE, self.x * TILE_SIZE)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Heading of a vehicle on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    /// Heading of a single step between two adjacent cells
    pub fn between(from: Cell, to: Cell) -> Option<Direction> {
        if !from.is_adjacent(&to) {
            return None;
        }
        Some(if to.x > from.x {
            Direction::Down
        } else if to.x < from.x {
            Direction::Up
        } else if to.y > from.y {
            Direction::Right
        } else {
            Direction::Left
        })
    }
}

/// Who created a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    /// Created by a client request
    Ev,
    /// Spawned by the engine as background traffic
    Npc,
}

impl VehicleKind {
    pub fn from_type(vehicle_type: u8) -> Self {
        if vehicle_type == NPC_VEHICLE_TYPE {
            VehicleKind::Npc
        } else {
            VehicleKind::Ev
        }
    }
}

/// A road cell as exposed to map clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSegment {
    pub x: i32,
    pub y: i32,
    pub one_way: bool,
}

/// Phase of a traffic signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPhase {
    Green,
    Red,
}

impl SignalPhase {
    pub fn toggled(self) -> Self {
        match self {
            SignalPhase::Green => SignalPhase::Red,
            SignalPhase::Red => SignalPhase::Green,
        }
    }

    pub fn is_green(self) -> bool {
        self == SignalPhase::Green
    }
}

/// Read-only view of one signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalState {
    pub x: i32,
    pub y: i32,
    pub is_green: bool,
}
