//! Standalone traffic simulation module
//!
//! This module contains the grid, signal, occupancy and vehicle logic. It runs
//! without the HTTP layer and can be driven from the console or from tests.

mod clock;
mod config;
mod error;
mod grid_map;
mod map_loader;
mod occupancy;
mod registry;
mod signals;
mod stats;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
pub use clock::SimClock;
pub use config::{SimConfig, DEFAULT_SPAWN_ATTEMPTS, DEFAULT_TICK_SECS};
pub use error::{MapError, MapResult, SimError, SimResult};
pub use grid_map::{GridMap, GridMapBuilder};
pub use map_loader::{load_map, parse_map};
pub use occupancy::{DenyReason, MoveAuthority, MoveDecision, Occupancy};
#[allow(unused_imports)]
pub use registry::{
    random_destination, sample_free_cell, StepPolicy, StepReport, VehicleRegistry,
};
pub use signals::{SignalScheduler, SignalTiming, SimSignal, DEFAULT_PHASE_SECS};
pub use stats::SimStats;
#[allow(unused_imports)]
pub use types::{
    Cell, Direction, RoadSegment, SignalPhase, SignalState, VehicleKind, MAX_CHARGE,
    MAX_VEHICLE_TYPE, NPC_MODELS, NPC_VEHICLE_TYPE, TILE_SIZE,
};
#[allow(unused_imports)]
pub use vehicle::{NewVehicle, SimVehicle, StepOutcome, VehicleSnapshot, VehicleStatus};
pub use world::SimWorld;
