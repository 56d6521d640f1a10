use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;

use grid_traffic_sim::simulation::{
    load_map, GridMap, SimClock, SimConfig, SimWorld, DEFAULT_PHASE_SECS, DEFAULT_SPAWN_ATTEMPTS,
    DEFAULT_TICK_SECS,
};

#[derive(Parser)]
#[command(name = "grid_traffic_sim")]
#[command(about = "Grid traffic simulation, headless or behind an HTTP API")]
struct Cli {
    /// Road grid CSV; the built-in demo grid is used when absent
    #[arg(long)]
    map: Option<PathBuf>,

    /// Signal grid CSV with the same shape as the road grid
    #[arg(long, requires = "map")]
    signals: Option<PathBuf>,

    /// Side length of the demo grid
    #[arg(long, default_value = "16")]
    demo_size: i32,

    /// Distance between streets in the demo grid
    #[arg(long, default_value = "5")]
    demo_spacing: i32,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = DEFAULT_TICK_SECS)]
    tick_secs: f32,

    /// Length of one green slot in seconds
    #[arg(long, default_value_t = DEFAULT_PHASE_SECS)]
    signal_phase_secs: f32,

    /// Random cells tried before an NPC spawn gives up
    #[arg(long, default_value_t = DEFAULT_SPAWN_ATTEMPTS)]
    spawn_attempts: u32,

    /// Minimum green time left to enter a signal cell
    #[arg(long, default_value = "0.0")]
    crossing_margin_secs: f32,

    /// Arrived NPCs pick a new destination
    #[arg(long)]
    npc_roaming: bool,

    /// Remove vehicles once they arrive
    #[arg(long)]
    despawn_arrived: bool,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Serve the HTTP API instead of running headless
    #[arg(long)]
    serve: bool,

    /// Address the HTTP API listens on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Number of ticks to run in headless mode
    #[arg(long, default_value = "60")]
    ticks: u32,

    /// NPCs spawned before the headless run
    #[arg(long, default_value = "10")]
    npcs: usize,

    /// Real-time pause between printed frames in headless mode
    #[arg(long, default_value = "0")]
    frame_delay_ms: u64,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            tick_secs: self.tick_secs,
            signal_phase_secs: self.signal_phase_secs,
            spawn_attempts: self.spawn_attempts,
            crossing_margin_secs: self.crossing_margin_secs,
            npc_roaming: self.npc_roaming,
            despawn_arrived: self.despawn_arrived,
            seed: self.seed,
        }
    }

    fn load_map(&self) -> anyhow::Result<GridMap> {
        match &self.map {
            Some(path) => load_map(path, self.signals.as_deref())
                .with_context(|| format!("failed to load map {}", path.display())),
            None => {
                info!(
                    "No map given, generating {}x{} demo grid",
                    self.demo_size, self.demo_size
                );
                GridMap::demo(self.demo_size, self.demo_spacing)
                    .context("failed to generate demo grid")
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let map = Arc::new(cli.load_map()?);
    let world = SimWorld::new(map, cli.sim_config());

    if cli.serve {
        #[cfg(feature = "server")]
        {
            run_server(world, &cli)
        }
        #[cfg(not(feature = "server"))]
        {
            anyhow::bail!("server feature is not enabled. Rebuild with --features server")
        }
    } else {
        run_headless(world, &cli);
        Ok(())
    }
}

/// Run the simulation in headless mode, drawing the grid once per simulated
/// second
fn run_headless(mut world: SimWorld, cli: &Cli) {
    let delta = world.config().tick_secs;
    let ticks_per_second = ((1.0 / delta).ceil() as u32).max(1);
    println!("Running grid traffic simulation in headless mode...");
    println!("Ticks: {}, Delta: {}s", cli.ticks, delta);
    println!();

    let spawned = world.spawn_npcs(cli.npcs);
    info!("Spawned {} of {} NPCs", spawned.len(), cli.npcs);

    println!("Initial state:");
    world.print_summary();
    world.draw_map();

    let clock = SimClock::from_secs(delta);
    let mut tick = 0;
    while tick < cli.ticks {
        let ticks_to_run = ticks_per_second.min(cli.ticks - tick);
        for _ in 0..ticks_to_run {
            tick += 1;
            clock.advance(&mut world);
        }

        println!("--- After tick {} ({:.1}s simulated time) ---", tick, world.time());
        world.draw_map();

        if tick < cli.ticks && cli.frame_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(cli.frame_delay_ms));
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();

    let map = world.map();
    world
        .stats()
        .log_summary(world.vehicle_count(), map.road_count(), map.signal_count());
}

#[cfg(feature = "server")]
fn run_server(world: SimWorld, cli: &Cli) -> anyhow::Result<()> {
    use grid_traffic_sim::server::{self, AppState};

    let clock = SimClock::from_secs(world.config().tick_secs);
    let state = AppState::new(world);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(server::serve(cli.bind, state, clock))
}
