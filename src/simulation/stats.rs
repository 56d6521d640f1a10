//! Running counters for a simulation session

use log::info;

/// Simulation statistics accumulated across ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimStats {
    pub ticks: u64,
    pub elapsed_secs: f32,
    pub vehicles_created: u64,
    pub npcs_spawned: u64,
    pub spawn_failures: u64,
    pub arrivals: u64,
    pub moves: u64,
    pub denied_moves: u64,
    pub removed: u64,
}

impl SimStats {
    /// Share of created vehicles that reached their destination, in percent
    pub fn success_rate(&self) -> f32 {
        if self.vehicles_created == 0 {
            0.0
        } else {
            (self.arrivals as f32 / self.vehicles_created as f32 * 100.0).min(100.0)
        }
    }

    /// Log the end-of-run block
    pub fn log_summary(&self, active_vehicles: usize, road_cells: usize, signals: usize) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", self.elapsed_secs);
        info!("Ticks: {}", self.ticks);
        info!("Total vehicles created: {}", self.vehicles_created);
        info!("NPCs spawned: {}", self.npcs_spawned);
        info!("Spawn failures: {}", self.spawn_failures);
        info!("Total arrivals: {}", self.arrivals);
        info!("Active vehicles: {}", active_vehicles);
        info!("Moves: {}, denied: {}", self.moves, self.denied_moves);
        info!("Road cells: {}, signals: {}", road_cells, signals);
        info!("Success rate: {:.1}%", self.success_rate());
    }
}
