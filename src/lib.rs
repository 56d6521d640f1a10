//! Grid Traffic Simulation Library
//!
//! A grid traffic simulation that can run headless or behind an HTTP API.

pub mod simulation;

#[cfg(feature = "server")]
pub mod server;
