//! Error types for the simulation engine and the map loader.

use thiserror::Error;

use super::types::Cell;

/// Failures reported by engine operations.
///
/// A denied move is not an error; it surfaces as a `MoveDecision` instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("cell {0} is outside the map bounds")]
    OutOfBounds(Cell),

    #[error("no drivable route from {start} to {end}")]
    InvalidEndpoint { start: Cell, end: Cell },

    #[error("vehicle {0:?} not found")]
    NotFound(String),

    #[error("no free road cell found after {attempts} attempts")]
    NoValidCellFound { attempts: u32 },

    #[error("vehicle name {0:?} is already registered")]
    DuplicateName(String),

    #[error("cell {cell} is already occupied by {occupant:?}")]
    CellOccupied { cell: Cell, occupant: String },

    #[error("vehicle type {0} is not one of 1, 2, 3")]
    InvalidVehicleType(u8),
}

pub type SimResult<T> = Result<T, SimError>;

/// Failures while building or loading a grid map. All of them are fatal at
/// startup.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("map has no rows or no columns")]
    Empty,

    #[error("malformed cell at row {row}, column {col}: {reason}")]
    Malformed { row: usize, col: usize, reason: String },

    #[error("cell {0} lies outside the map")]
    OutOfBounds(Cell),

    #[error("edge {from} -> {to} does not join adjacent cells")]
    NotAdjacent { from: Cell, to: Cell },

    #[error("signal at {0} is not on a road")]
    SignalOffRoad(Cell),

    #[error("signal at {cell} has invalid group {group}")]
    InvalidSignalGroup { cell: Cell, group: u8 },

    #[error("signal grid is {rows}x{cols}, smaller than the road grid")]
    SignalGridTooSmall { rows: usize, cols: usize },
}

pub type MapResult<T> = Result<T, MapError>;
