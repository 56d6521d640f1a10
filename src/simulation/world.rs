//! Main simulation world that ties everything together
//!
//! `SimWorld` owns the signal scheduler, the occupancy table and the vehicle
//! registry, and shares the read-only grid map. It is the single entry point
//! for both the clock and external requests.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write;
use std::sync::Arc;

use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::grid_map::GridMap;
use super::occupancy::{DenyReason, MoveAuthority, MoveDecision, Occupancy};
use super::registry::{StepPolicy, StepReport, VehicleRegistry};
use super::signals::SignalScheduler;
use super::stats::SimStats;
use super::types::{Cell, SignalPhase, SignalState, VehicleKind};
use super::vehicle::{NewVehicle, VehicleSnapshot, VehicleStatus};

const ANSI_RED: &str = "\u{1b}[31m";
const ANSI_GREEN: &str = "\u{1b}[32m";
const ANSI_BLUE: &str = "\u{1b}[34m";
const ANSI_RESET: &str = "\u{1b}[0m";

/// The main simulation world
pub struct SimWorld {
    /// Road topology, shared read-only with any number of readers
    map: Arc<GridMap>,

    signals: SignalScheduler,

    occupancy: Occupancy,

    registry: VehicleRegistry,

    config: SimConfig,

    rng: StdRng,

    /// Suffix for the next generated NPC name
    next_npc: u64,

    /// Simulation time in seconds
    time: f32,

    stats: SimStats,
}

impl SimWorld {
    pub fn new(map: Arc<GridMap>, config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let signals = SignalScheduler::new(&map, config.signal_phase_secs);

        Self {
            map,
            signals,
            occupancy: Occupancy::new(),
            registry: VehicleRegistry::new(),
            config,
            rng,
            next_npc: 0,
            time: 0.0,
            stats: SimStats::default(),
        }
    }

    /// Create a world with the default configuration
    pub fn with_map(map: GridMap) -> Self {
        Self::new(Arc::new(map), SimConfig::default())
    }

    pub fn map(&self) -> &Arc<GridMap> {
        &self.map
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    fn step_policy(&self) -> StepPolicy {
        StepPolicy {
            crossing_margin: self.config.crossing_margin_secs,
            npc_roaming: self.config.npc_roaming,
        }
    }

    /// Main simulation tick.
    ///
    /// Signals advance first so a phase change is already visible to this
    /// tick's move checks.
    pub fn tick(&mut self, delta_secs: f32) -> StepReport {
        self.time += delta_secs;
        self.stats.ticks += 1;
        self.stats.elapsed_secs = self.time;

        self.signals.tick(delta_secs);
        self.step_vehicles()
    }

    /// Advance every moving vehicle by one cell without touching the signals
    pub fn step_vehicles(&mut self) -> StepReport {
        let policy = self.step_policy();
        let report = self.registry.step(
            &self.map,
            &self.signals,
            &mut self.occupancy,
            policy,
            &mut self.rng,
        );

        self.stats.moves += report.moves as u64;
        self.stats.denied_moves += report.denied.len() as u64;
        self.stats.arrivals += report.arrived.len() as u64;

        if self.config.despawn_arrived {
            for name in &report.arrived {
                let parked = self
                    .registry
                    .get(name)
                    .map(|vehicle| vehicle.arrived)
                    .unwrap_or(false);
                if parked && self.registry.remove(name, &mut self.occupancy).is_ok() {
                    self.stats.removed += 1;
                    info!("Despawned {} after arrival", name);
                }
            }
        }

        report
    }

    /// Create a vehicle from a client request
    pub fn create_vehicle(&mut self, spec: NewVehicle) -> SimResult<VehicleSnapshot> {
        let snapshot = self
            .registry
            .create(&self.map, &mut self.occupancy, spec)?
            .snapshot();
        self.stats.vehicles_created += 1;
        if snapshot.kind == VehicleKind::Npc {
            self.stats.npcs_spawned += 1;
        }
        Ok(snapshot)
    }

    fn next_npc_name(&mut self) -> String {
        loop {
            self.next_npc += 1;
            let name = format!("NPC_{}", self.next_npc);
            if !self.registry.contains(&name) {
                return name;
            }
        }
    }

    /// Spawn an NPC at `start` when it is a free road cell, otherwise at a
    /// random free road cell
    pub fn spawn_npc(&mut self, start: Option<Cell>) -> SimResult<VehicleSnapshot> {
        let name = self.next_npc_name();
        let attempts = self.config.spawn_attempts;
        let result = self
            .registry
            .spawn_random(
                &self.map,
                &mut self.occupancy,
                &mut self.rng,
                name,
                start,
                attempts,
            )
            .map(|vehicle| vehicle.snapshot());

        match result {
            Ok(snapshot) => {
                self.stats.vehicles_created += 1;
                self.stats.npcs_spawned += 1;
                Ok(snapshot)
            }
            Err(err) => {
                self.stats.spawn_failures += 1;
                warn!("NPC spawn failed: {}", err);
                Err(err)
            }
        }
    }

    /// Spawn up to `count` NPCs, skipping the ones that fail
    pub fn spawn_npcs(&mut self, count: usize) -> Vec<VehicleSnapshot> {
        (0..count).filter_map(|_| self.spawn_npc(None).ok()).collect()
    }

    pub fn start_vehicle(&mut self, name: &str) -> SimResult<Vec<Cell>> {
        self.registry.start(name)
    }

    pub fn stop_vehicle(&mut self, name: &str) -> SimResult<()> {
        self.registry.stop(name)
    }

    /// Remove a vehicle and free its cell
    pub fn remove_vehicle(&mut self, name: &str) -> SimResult<VehicleSnapshot> {
        let vehicle = self.registry.remove(name, &mut self.occupancy)?;
        self.stats.removed += 1;
        info!("Removed vehicle {}", name);
        Ok(vehicle.snapshot())
    }

    /// Judge a move of `name` from its current cell to `dest` without
    /// performing it. Only the next cell of the vehicle's route can be
    /// approved.
    pub fn check_move(&self, name: &str, dest: Cell) -> SimResult<MoveDecision> {
        let vehicle = self.registry.get(name)?;
        let authority = MoveAuthority::new(
            &self.map,
            &self.signals,
            &self.occupancy,
            self.config.crossing_margin_secs,
        );
        let decision = authority.check(name, vehicle.position(), dest);
        if decision.is_approved() && vehicle.next_cell() != Some(dest) {
            return Ok(MoveDecision::Denied(DenyReason::OffPath));
        }
        Ok(decision)
    }

    pub fn can_move_to(&self, name: &str, dest: Cell) -> SimResult<bool> {
        self.check_move(name, dest).map(|decision| decision.is_approved())
    }

    pub fn vehicles(&self) -> Vec<VehicleSnapshot> {
        self.registry.all()
    }

    pub fn vehicle(&self, name: &str) -> SimResult<VehicleSnapshot> {
        self.registry.get(name).map(|vehicle| vehicle.snapshot())
    }

    pub fn vehicle_status(&self, name: &str) -> SimResult<VehicleStatus> {
        self.registry.get(name).map(|vehicle| vehicle.status())
    }

    pub fn vehicle_count(&self) -> usize {
        self.registry.len()
    }

    pub fn signals(&self) -> Vec<SignalState> {
        self.signals.all_signals()
    }

    pub fn signal_phase(&self, cell: Cell) -> Option<SignalPhase> {
        self.signals.current_phase(cell)
    }

    pub fn signal_scheduler(&self) -> &SignalScheduler {
        &self.signals
    }

    /// Flip every signal now
    pub fn change_signals(&mut self) {
        self.signals.force_change();
        info!("Forced a phase change on {} signals", self.signals.len());
    }

    /// Route between two cells without creating a vehicle
    pub fn find_path(&self, start: Cell, end: Cell) -> SimResult<Vec<Cell>> {
        for endpoint in [start, end] {
            if !self.map.in_bounds(endpoint) {
                return Err(SimError::OutOfBounds(endpoint));
            }
        }
        self.map
            .find_path(start, end)
            .ok_or(SimError::InvalidEndpoint { start, end })
    }

    pub fn occupant(&self, cell: Cell) -> Option<&str> {
        self.occupancy.occupant(cell)
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        let (rows, cols) = self.map.bounds();
        println!("=== Traffic Simulation Summary ===");
        println!("Time: {:.2}s", self.time);
        println!(
            "Map: {}x{}, road cells: {}, signals: {}",
            rows,
            cols,
            self.map.road_count(),
            self.signals.len()
        );
        println!("Vehicles: {}", self.registry.len());

        if !self.registry.is_empty() {
            println!("--- Vehicles ---");
            for vehicle in self.registry.iter() {
                println!(
                    "  {} ({:?}): at {} -> {}, step {}/{}, moving={}, charge={}",
                    vehicle.name,
                    vehicle.kind,
                    vehicle.position(),
                    vehicle.end,
                    vehicle.current_path_index,
                    vehicle.path.len() - 1,
                    vehicle.moving,
                    vehicle.charge
                );
            }
        }
    }

    /// Render the grid with vehicles and signals, optionally ANSI-coloured
    pub fn render_map(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("{code}{text}{ANSI_RESET}")
            } else {
                text.to_string()
            }
        };

        let (rows, cols) = self.map.bounds();
        let mut out = String::from("   ");
        for y in 1..=cols {
            let _ = write!(out, "{:>2} ", y % 100);
        }
        out.push('\n');

        for x in 1..=rows {
            let _ = write!(out, "{:>2} ", x % 100);
            for y in 1..=cols {
                let cell = Cell::new(x, y);
                let symbol = if let Some(name) = self.occupancy.occupant(cell) {
                    let tag = name.chars().last().unwrap_or('V');
                    paint(ANSI_BLUE, &format!("[{tag}]"))
                } else if let Some(phase) = self.signals.current_phase(cell) {
                    match phase {
                        SignalPhase::Green => paint(ANSI_GREEN, "[G]"),
                        SignalPhase::Red => paint(ANSI_RED, "[R]"),
                    }
                } else if self.map.is_road(cell) {
                    "[ ]".to_string()
                } else {
                    "   ".to_string()
                };
                out.push_str(&symbol);
            }
            out.push('\n');
        }
        out
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== Traffic Map ===");
        println!("Legend: [x]=Vehicle, [G]/[R]=Signal, [ ]=Road");
        print!("{}", self.render_map(true));
        println!();
    }
}
