//! Request and response bodies of the HTTP API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::simulation::{Cell, NewVehicle, RoadSegment, SimError, MAX_CHARGE};

fn default_vehicle_type() -> u8 {
    1
}

fn default_charge() -> i32 {
    MAX_CHARGE as i32
}

/// Body of `POST /api/ev/new`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicleRequest {
    pub name: String,
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    #[serde(rename = "type", default = "default_vehicle_type")]
    pub vehicle_type: u8,
    /// Model name shown by clients, e.g. `sedan`
    #[serde(rename = "vehicleType", default)]
    pub model: Option<String>,
    #[serde(default = "default_charge")]
    pub charge: i32,
    #[serde(default)]
    pub charging_rate: i32,
    /// Accepted for compatibility; vehicles always start at index 0
    #[serde(default)]
    pub current_path_index: usize,
    #[serde(default)]
    pub moving: bool,
}

impl From<NewVehicleRequest> for NewVehicle {
    fn from(req: NewVehicleRequest) -> Self {
        NewVehicle {
            name: req.name,
            start: Cell::new(req.start_x, req.start_y),
            end: Cell::new(req.end_x, req.end_y),
            vehicle_type: req.vehicle_type,
            model: req.model,
            charge: req.charge,
            charging_rate: req.charging_rate,
            moving: req.moving,
        }
    }
}

/// Body of `POST /api/ev/npc/spawn`; both coordinates or neither
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SpawnRequest {
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl SpawnRequest {
    pub fn start(&self) -> Option<Cell> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Cell::new(x, y)),
            _ => None,
        }
    }
}

/// Body of `POST /api/findPath`
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequest {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapResponse {
    pub rows: i32,
    pub cols: i32,
    pub roads: Vec<RoadSegment>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error returned by a handler
#[derive(Debug)]
pub enum ApiError {
    Sim(SimError),
    BadRequest(String),
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        ApiError::Sim(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Sim(SimError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Sim(SimError::OutOfBounds(_) | SimError::InvalidVehicleType(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Sim(SimError::InvalidEndpoint { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Sim(SimError::DuplicateName(_) | SimError::CellOccupied { .. }) => {
                StatusCode::CONFLICT
            }
            ApiError::Sim(SimError::NoValidCellFound { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::Sim(err) => err.to_string(),
            ApiError::BadRequest(reason) => reason,
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
