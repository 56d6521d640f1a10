use std::fs;
use std::process::{Command, Output};

fn run_headless(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grid_traffic_sim"))
        .args(args)
        .env("RUST_LOG", "warn,grid_traffic_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Pull the number that follows `label` out of a log line
fn logged_value(stderr: &str, label: &str) -> String {
    let line = stderr
        .lines()
        .find(|line| line.contains(label))
        .unwrap_or_else(|| panic!("Missing '{}' statistic", label));
    line.split(label)
        .nth(1)
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default()
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--ticks", "20", "--npcs", "5", "--seed", "1"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Traffic Map ==="));
    assert!(stdout.contains("=== Final State ==="));
}

/// Test that simulation statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_headless(&["--ticks", "30", "--npcs", "8", "--seed", "2"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let created: u32 = logged_value(&stderr, "Total vehicles created:")
        .parse()
        .expect("Could not parse created count");
    assert_eq!(created, 8);

    for label in ["Total arrivals:", "Active vehicles:", "Road cells:"] {
        logged_value(&stderr, label);
    }

    let rate = logged_value(&stderr, "Success rate:");
    let rate: f32 = rate
        .strip_suffix('%')
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_else(|| panic!("Could not parse success rate {:?}", rate));
    assert!((0.0..=100.0).contains(&rate));
}

/// Test that a map can be loaded from CSV files
#[test]
fn test_headless_with_map_files() {
    let dir = std::env::temp_dir().join(format!("grid_traffic_sim_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let map_path = dir.join("map.csv");
    let signal_path = dir.join("signal.csv");
    fs::write(
        &map_path,
        "\"(1,2),(2,1)\",\"(1,1),(2,2)\"\n\"(1,1),(2,2)\",\"(1,2),(2,1)\"\n",
    )
    .unwrap();
    fs::write(&signal_path, "0,1\n0,0\n").unwrap();

    let output = run_headless(&[
        "--map",
        map_path.to_str().unwrap(),
        "--signals",
        signal_path.to_str().unwrap(),
        "--ticks",
        "5",
        "--npcs",
        "2",
        "--seed",
        "3",
    ]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stderr.contains("Loaded 2x2 map"), "stderr: {}", stderr);
    assert_eq!(logged_value(&stderr, "Road cells:"), "4, signals: 1");

    let _ = fs::remove_dir_all(&dir);
}

/// Test that a missing map aborts startup
#[test]
fn test_missing_map_fails() {
    let output = run_headless(&["--map", "/nonexistent/map.csv"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load map"), "stderr: {}", stderr);
}
