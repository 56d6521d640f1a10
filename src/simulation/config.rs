//! Engine tuning knobs

use super::signals::DEFAULT_PHASE_SECS;

/// Default simulation tick in seconds
pub const DEFAULT_TICK_SECS: f32 = 1.0;

/// Default number of random cells tried when spawning an NPC
pub const DEFAULT_SPAWN_ATTEMPTS: u32 = 100;

/// Configuration consumed by `SimWorld`
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Seconds of simulated time per tick
    pub tick_secs: f32,
    /// Length of one green slot
    pub signal_phase_secs: f32,
    /// Random cells tried before a spawn gives up
    pub spawn_attempts: u32,
    /// Minimum green time left for a vehicle to enter a signal cell
    pub crossing_margin_secs: f32,
    /// Arrived NPCs pick a new destination instead of parking
    pub npc_roaming: bool,
    /// Arrived vehicles leave the grid at the end of the tick
    pub despawn_arrived: bool,
    /// Seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
            signal_phase_secs: DEFAULT_PHASE_SECS,
            spawn_attempts: DEFAULT_SPAWN_ATTEMPTS,
            crossing_margin_secs: 0.0,
            npc_roaming: false,
            despawn_arrived: false,
            seed: None,
        }
    }
}
