//! Request handlers. Each one takes the world lock once, for the duration of
//! a single engine call.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use log::info;

use super::dto::{ApiError, MapResponse, NewVehicleRequest, PathRequest, SpawnRequest};
use super::AppState;
use crate::simulation::{Cell, SignalState, VehicleSnapshot, VehicleStatus};

type ApiResult<T> = Result<T, ApiError>;

pub async fn get_map(State(state): State<AppState>) -> Json<MapResponse> {
    let map = state.world.lock().map().clone();
    let (rows, cols) = map.bounds();
    Json(MapResponse {
        rows,
        cols,
        roads: map.roads(),
    })
}

pub async fn find_path(
    State(state): State<AppState>,
    Json(req): Json<PathRequest>,
) -> ApiResult<Json<Vec<Cell>>> {
    let start = Cell::new(req.start_x, req.start_y);
    let end = Cell::new(req.end_x, req.end_y);
    let path = state.world.lock().find_path(start, end)?;
    Ok(Json(path))
}

pub async fn all_vehicles(State(state): State<AppState>) -> Json<Vec<VehicleSnapshot>> {
    Json(state.world.lock().vehicles())
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(req): Json<NewVehicleRequest>,
) -> ApiResult<Json<VehicleSnapshot>> {
    let vehicle = state.world.lock().create_vehicle(req.into())?;
    Ok(Json(vehicle))
}

/// The body is optional; an empty body spawns on a random free cell
pub async fn spawn_npc(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<VehicleSnapshot>> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        SpawnRequest::default()
    } else {
        serde_json::from_slice::<SpawnRequest>(&body)
            .map_err(|err| ApiError::BadRequest(format!("invalid spawn request: {err}")))?
    };
    let vehicle = state.world.lock().spawn_npc(req.start())?;
    Ok(Json(vehicle))
}

pub async fn signals(State(state): State<AppState>) -> Json<Vec<SignalState>> {
    Json(state.world.lock().signals())
}

pub async fn change_signals(State(state): State<AppState>) -> StatusCode {
    state.world.lock().change_signals();
    StatusCode::OK
}

pub async fn start_vehicle(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<Cell>>> {
    let path = state.world.lock().start_vehicle(&name)?;
    info!("Vehicle {} started along {} cells", name, path.len());
    Ok(Json(path))
}

pub async fn stop_vehicle(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.world.lock().stop_vehicle(&name)?;
    Ok(StatusCode::OK)
}

pub async fn vehicle_status(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<VehicleStatus>> {
    Ok(Json(state.world.lock().vehicle_status(&name)?))
}

/// Pure query: nothing moves and nothing is reserved
pub async fn can_move_to(
    State(state): State<AppState>,
    Path((name, x, y)): Path<(String, i32, i32)>,
) -> ApiResult<Json<bool>> {
    let allowed = state.world.lock().can_move_to(&name, Cell::new(x, y))?;
    Ok(Json(allowed))
}

pub async fn remove_vehicle(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<VehicleSnapshot>> {
    Ok(Json(state.world.lock().remove_vehicle(&name)?))
}
