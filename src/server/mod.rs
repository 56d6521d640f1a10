//! HTTP surface of the simulation
//!
//! Handlers share one `SimWorld` behind an `Arc<parking_lot::Mutex<_>>`. The
//! clock task ticks the same world, so every request sees a state between two
//! ticks, never in the middle of one.

mod dto;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::{delete, get, post};
use axum::Router;
use log::info;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::simulation::{SimClock, SimWorld};

pub use dto::{ApiError, MapResponse, NewVehicleRequest, PathRequest, SpawnRequest};

/// World handle shared by the handlers and the clock
pub type SharedWorld = Arc<Mutex<SimWorld>>;

#[derive(Clone)]
pub struct AppState {
    pub world: SharedWorld,
}

impl AppState {
    pub fn new(world: SimWorld) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/map", get(routes::get_map))
        .route("/api/findPath", post(routes::find_path))
        .route("/api/ev/all", get(routes::all_vehicles))
        .route("/api/ev/new", post(routes::create_vehicle))
        .route("/api/ev/npc/spawn", post(routes::spawn_npc))
        .route("/api/ev/traffic/signals", get(routes::signals))
        .route("/api/ev/traffic/change", post(routes::change_signals))
        .route("/api/ev/{name}", delete(routes::remove_vehicle))
        .route("/api/ev/{name}/start", post(routes::start_vehicle))
        .route("/api/ev/{name}/stop", post(routes::stop_vehicle))
        .route("/api/ev/{name}/status", get(routes::vehicle_status))
        .route(
            "/api/ev/{name}/canMoveToPosition/{x}/{y}",
            post(routes::can_move_to),
        )
        .with_state(state)
}

/// Serve the API on `addr` and tick the world every clock period until
/// Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState, clock: SimClock) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let clock_task = tokio::spawn(clock.run(state.world.clone(), shutdown_rx));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    let _ = shutdown_tx.send(true);
    clock_task.await.context("clock task panicked")?;
    Ok(())
}
