//! Cell occupancy and move authorization
//!
//! Each road cell holds at most one vehicle. A move is legal when the target
//! is inside the map, is a road, is entered in a permitted direction, shows
//! no red signal and is not held by another vehicle. The checks run in that
//! order and the first failure decides the reason.

use std::collections::HashMap;

use super::error::{SimError, SimResult};
use super::grid_map::GridMap;
use super::signals::SignalScheduler;
use super::types::Cell;

/// Why a move was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    OutOfBounds,
    NotRoad,
    /// Target is not a single permitted step away from the current cell
    NotConnected,
    /// Against the direction of a one-way street
    WrongWay,
    RedSignal,
    /// Green phase ends before the vehicle could clear the crossing
    SignalClosing,
    Occupied(String),
    /// Legal move, but not to the next cell of the vehicle's route
    OffPath,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveDecision {
    Approved,
    Denied(DenyReason),
}

impl MoveDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, MoveDecision::Approved)
    }
}

/// Which vehicle holds which cell
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    cells: HashMap<Cell, String>,
    vehicles: HashMap<String, Cell>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, cell: Cell) -> Option<&str> {
        self.cells.get(&cell).map(String::as_str)
    }

    pub fn cell_of(&self, vehicle: &str) -> Option<Cell> {
        self.vehicles.get(vehicle).copied()
    }

    /// Place a vehicle that is not yet on the grid
    pub fn occupy(&mut self, vehicle: &str, cell: Cell) -> SimResult<()> {
        if let Some(occupant) = self.cells.get(&cell) {
            if occupant != vehicle {
                return Err(SimError::CellOccupied {
                    cell,
                    occupant: occupant.clone(),
                });
            }
        }
        self.release(vehicle);
        self.cells.insert(cell, vehicle.to_string());
        self.vehicles.insert(vehicle.to_string(), cell);
        Ok(())
    }

    /// Move a vehicle to `to`, freeing its previous cell
    pub fn relocate(&mut self, vehicle: &str, to: Cell) -> SimResult<()> {
        self.occupy(vehicle, to)
    }

    /// Remove a vehicle from the grid; returns the cell it held
    pub fn release(&mut self, vehicle: &str) -> Option<Cell> {
        let cell = self.vehicles.remove(vehicle)?;
        self.cells.remove(&cell);
        Some(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Read-only view over the map, signals and occupancy used to judge moves
pub struct MoveAuthority<'a> {
    map: &'a GridMap,
    signals: &'a SignalScheduler,
    occupancy: &'a Occupancy,
    /// Minimum green time left to enter a signal cell
    crossing_margin: f32,
}

impl<'a> MoveAuthority<'a> {
    pub fn new(
        map: &'a GridMap,
        signals: &'a SignalScheduler,
        occupancy: &'a Occupancy,
        crossing_margin: f32,
    ) -> Self {
        Self {
            map,
            signals,
            occupancy,
            crossing_margin,
        }
    }

    /// Judge whether `vehicle`, currently at `from`, may enter `dest`
    pub fn check(&self, vehicle: &str, from: Cell, dest: Cell) -> MoveDecision {
        if !self.map.in_bounds(dest) {
            return MoveDecision::Denied(DenyReason::OutOfBounds);
        }

        if !self.map.is_road(dest) {
            return MoveDecision::Denied(DenyReason::NotRoad);
        }

        if !self.map.permits(from, dest) {
            let reason = if self.map.is_wrong_way(from, dest) {
                DenyReason::WrongWay
            } else {
                DenyReason::NotConnected
            };
            return MoveDecision::Denied(reason);
        }

        if let Some(phase) = self.signals.current_phase(dest) {
            if !phase.is_green() {
                return MoveDecision::Denied(DenyReason::RedSignal);
            }
            let remaining = self.signals.time_until_change(dest).unwrap_or(f32::MAX);
            if remaining < self.crossing_margin {
                return MoveDecision::Denied(DenyReason::SignalClosing);
            }
        }

        match self.occupancy.occupant(dest) {
            Some(occupant) if occupant != vehicle => {
                MoveDecision::Denied(DenyReason::Occupied(occupant.to_string()))
            }
            _ => MoveDecision::Approved,
        }
    }
}
