//! Vehicle creation, spawning and per-tick path following
//!
//! The registry owns every vehicle keyed by name. Operations that touch the
//! grid take the map, the signals and the occupancy table as explicit
//! arguments so the caller decides how they are shared.

use log::{debug, info};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeMap;

use super::error::{SimError, SimResult};
use super::grid_map::GridMap;
use super::occupancy::{DenyReason, MoveAuthority, MoveDecision, Occupancy};
use super::signals::SignalScheduler;
use super::types::{Cell, VehicleKind, MAX_CHARGE, MAX_VEHICLE_TYPE, NPC_MODELS, NPC_VEHICLE_TYPE};
use super::vehicle::{NewVehicle, SimVehicle, StepOutcome, VehicleSnapshot};

/// Knobs for one round of vehicle movement
#[derive(Debug, Clone, Copy, Default)]
pub struct StepPolicy {
    /// Minimum green time left to enter a signal cell
    pub crossing_margin: f32,
    /// Send NPCs to a fresh destination when they arrive
    pub npc_roaming: bool,
}

/// What happened during one round of vehicle movement
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub moves: usize,
    pub arrived: Vec<String>,
    pub denied: Vec<(String, DenyReason)>,
}

/// All vehicles in the simulation
#[derive(Debug, Clone, Default)]
pub struct VehicleRegistry {
    vehicles: BTreeMap<String, SimVehicle>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the request, compute the route and place the vehicle on its
    /// start cell
    pub fn create(
        &mut self,
        map: &GridMap,
        occupancy: &mut Occupancy,
        spec: NewVehicle,
    ) -> SimResult<&SimVehicle> {
        if spec.vehicle_type == 0 || spec.vehicle_type > MAX_VEHICLE_TYPE {
            return Err(SimError::InvalidVehicleType(spec.vehicle_type));
        }
        if self.vehicles.contains_key(&spec.name) {
            return Err(SimError::DuplicateName(spec.name));
        }
        for endpoint in [spec.start, spec.end] {
            if !map.in_bounds(endpoint) {
                return Err(SimError::OutOfBounds(endpoint));
            }
        }

        let invalid = || SimError::InvalidEndpoint {
            start: spec.start,
            end: spec.end,
        };
        if !map.is_road(spec.start) || !map.is_road(spec.end) {
            return Err(invalid());
        }
        let path = map.find_path(spec.start, spec.end).ok_or_else(invalid)?;

        occupancy.occupy(&spec.name, spec.start)?;

        let name = spec.name.clone();
        let vehicle = SimVehicle::new(spec, path);
        info!(
            "Created {:?} vehicle {} at {} heading to {} ({} cells)",
            vehicle.kind,
            vehicle.name,
            vehicle.start,
            vehicle.end,
            vehicle.path.len()
        );
        Ok(&*self.vehicles.entry(name).or_insert(vehicle))
    }

    /// Spawn an NPC heading to a random reachable destination.
    ///
    /// `hint` is tried first; when it is not a free road cell the start is
    /// sampled at random within the `attempts` budget.
    pub fn spawn_random<R: Rng>(
        &mut self,
        map: &GridMap,
        occupancy: &mut Occupancy,
        rng: &mut R,
        name: String,
        hint: Option<Cell>,
        attempts: u32,
    ) -> SimResult<&SimVehicle> {
        let start = match hint {
            Some(cell) if is_free_road(map, occupancy, cell) => cell,
            Some(cell) => {
                debug!("Spawn hint {} is not a free road cell, sampling", cell);
                sample_free_cell(map, occupancy, rng, attempts)?
            }
            None => sample_free_cell(map, occupancy, rng, attempts)?,
        };
        let end = random_destination(map, rng, start);
        let model = NPC_MODELS.choose(rng).map(|model| model.to_string());

        let spec = NewVehicle {
            name,
            start,
            end,
            vehicle_type: NPC_VEHICLE_TYPE,
            model,
            charge: MAX_CHARGE as i32,
            charging_rate: 0,
            moving: true,
        };
        self.create(map, occupancy, spec)
    }

    /// Set a vehicle moving and return its route. An arrived vehicle stays
    /// parked.
    pub fn start(&mut self, name: &str) -> SimResult<Vec<Cell>> {
        let vehicle = self.get_mut(name)?;
        vehicle.moving = !vehicle.arrived;
        Ok(vehicle.path.clone())
    }

    pub fn stop(&mut self, name: &str) -> SimResult<()> {
        self.get_mut(name)?.moving = false;
        Ok(())
    }

    /// Remove a vehicle and free its cell
    pub fn remove(&mut self, name: &str, occupancy: &mut Occupancy) -> SimResult<SimVehicle> {
        let vehicle = self
            .vehicles
            .remove(name)
            .ok_or_else(|| SimError::NotFound(name.to_string()))?;
        occupancy.release(name);
        Ok(vehicle)
    }

    pub fn get(&self, name: &str) -> SimResult<&SimVehicle> {
        self.vehicles
            .get(name)
            .ok_or_else(|| SimError::NotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> SimResult<&mut SimVehicle> {
        self.vehicles
            .get_mut(name)
            .ok_or_else(|| SimError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vehicles.contains_key(name)
    }

    pub fn all(&self) -> Vec<VehicleSnapshot> {
        self.vehicles.values().map(SimVehicle::snapshot).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimVehicle> {
        self.vehicles.values()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Try to advance every moving vehicle by one cell.
    ///
    /// Vehicles are visited in name order. A denied vehicle stays where it is
    /// and tries again on the next round.
    pub fn step<R: Rng>(
        &mut self,
        map: &GridMap,
        signals: &SignalScheduler,
        occupancy: &mut Occupancy,
        policy: StepPolicy,
        rng: &mut R,
    ) -> StepReport {
        let mut report = StepReport::default();

        for vehicle in self.vehicles.values_mut() {
            if !vehicle.moving {
                vehicle.charge_tick();
                continue;
            }

            let Some(next) = vehicle.next_cell() else {
                if !vehicle.arrived {
                    report.arrived.push(vehicle.name.clone());
                }
                vehicle.mark_arrived();
                continue;
            };

            let decision = MoveAuthority::new(map, signals, occupancy, policy.crossing_margin)
                .check(&vehicle.name, vehicle.position(), next);

            match decision {
                MoveDecision::Approved => {
                    if let Err(err) = occupancy.relocate(&vehicle.name, next) {
                        debug!("Move of {} to {} rejected: {}", vehicle.name, next, err);
                        continue;
                    }
                    report.moves += 1;

                    if vehicle.advance() == StepOutcome::Arrived {
                        info!("Vehicle {} arrived at {}", vehicle.name, vehicle.position());
                        report.arrived.push(vehicle.name.clone());

                        if policy.npc_roaming && vehicle.kind == VehicleKind::Npc {
                            let here = vehicle.position();
                            let destination = random_destination(map, rng, here);
                            if let Some(path) = map.find_path(here, destination) {
                                debug!("NPC {} roaming on to {}", vehicle.name, destination);
                                vehicle.reroute(path);
                            }
                        }
                    }
                }
                MoveDecision::Denied(reason) => {
                    debug!(
                        "Vehicle {} waits at {}: {:?} at {}",
                        vehicle.name,
                        vehicle.position(),
                        reason,
                        next
                    );
                    report.denied.push((vehicle.name.clone(), reason));
                }
            }
        }

        report
    }
}

/// Sample random cells until one is a free road, giving up after `attempts`
pub fn sample_free_cell<R: Rng>(
    map: &GridMap,
    occupancy: &Occupancy,
    rng: &mut R,
    attempts: u32,
) -> SimResult<Cell> {
    let (rows, cols) = map.bounds();
    for _ in 0..attempts {
        let cell = Cell::new(rng.random_range(1..=rows), rng.random_range(1..=cols));
        if is_free_road(map, occupancy, cell) {
            return Ok(cell);
        }
    }
    Err(SimError::NoValidCellFound { attempts })
}

fn is_free_road(map: &GridMap, occupancy: &Occupancy, cell: Cell) -> bool {
    map.is_road(cell) && occupancy.occupant(cell).is_none()
}

/// Pick a random cell reachable from `start`, preferring one other than
/// `start` itself
pub fn random_destination<R: Rng>(map: &GridMap, rng: &mut R, start: Cell) -> Cell {
    let candidates: Vec<Cell> = map
        .reachable_from(start)
        .into_iter()
        .filter(|cell| *cell != start)
        .collect();
    candidates.choose(rng).copied().unwrap_or(start)
}
