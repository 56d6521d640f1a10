//! Fixed-period driver for `SimWorld::tick`

use std::time::Duration;

use super::world::SimWorld;

/// Advances a world by a fixed amount of simulated time per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    period: Duration,
}

impl SimClock {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn from_secs(secs: f32) -> Self {
        Self::new(Duration::from_secs_f32(secs.max(0.001)))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn delta_secs(&self) -> f32 {
        self.period.as_secs_f32()
    }

    /// Run one tick of the world
    pub fn advance(&self, world: &mut SimWorld) {
        let report = world.tick(self.delta_secs());
        if !report.arrived.is_empty() {
            log::debug!(
                "t={:.1}s: {} moves, {} arrivals",
                world.time(),
                report.moves,
                report.arrived.len()
            );
        }
    }

    /// Tick a shared world every period until `shutdown` flips to true.
    /// The lock is held only for the duration of one tick.
    #[cfg(feature = "server")]
    pub async fn run(
        self,
        world: std::sync::Arc<parking_lot::Mutex<SimWorld>>,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        log::info!("Simulation clock started, period {:?}", self.period);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.advance(&mut world.lock());
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Simulation clock stopped");
    }
}
