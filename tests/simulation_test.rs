use std::process::Command;

fn run_headless(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_junction_sim"))
        .args(args)
        .env("RUST_LOG", "warn,junction_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--ticks", "300", "--seed", "7", "--map-every", "0"]);

    // Check that the simulation exited successfully
    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);

    // Verify simulation complete message is present
    assert!(
        stderr.contains("=== SIMULATION COMPLETE ==="),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that simulation statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_headless(&["--ticks", "300", "--seed", "7", "--map-every", "0"]);

    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);

    // Check for key statistics in the output
    for line in [
        "Total vehicles spawned:",
        "Active vehicles:",
        "Vehicles exited:",
        "Signal decisions: 30",
    ] {
        assert!(stderr.contains(line), "Missing '{}' statistic", line);
    }
}

/// Test that the terminal map is printed on request
#[test]
fn test_map_printed_to_stdout() {
    let output = run_headless(&["--ticks", "20", "--seed", "1", "--map-every", "10"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tick 10 | signal"));
    assert!(stdout.contains("=== Junction Map ==="));
}

/// Test that a broken configuration is rejected before the run starts
#[test]
fn test_invalid_config_fails() {
    let path = std::env::temp_dir().join(format!("junction_sim_bad_{}.yaml", std::process::id()));
    std::fs::write(&path, "road:\n  horizontal_top: 500.0\n  horizontal_bottom: 300.0\n").unwrap();

    let output = run_headless(&["--ticks", "10", "--config", path.to_str().unwrap()]);
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
}

/// Test that an interrupt ends the run after the current tick with the usual summary
#[cfg(unix)]
#[test]
fn test_interrupt_stops_run_gracefully() {
    use std::process::Stdio;
    use std::time::Duration;

    let child = Command::new(env!("CARGO_BIN_EXE_junction_sim"))
        .args(["--ticks", "1000000000", "--seed", "3", "--map-every", "0"])
        .env("RUST_LOG", "warn,junction_sim=info")
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start simulation");

    std::thread::sleep(Duration::from_millis(1500));
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to send interrupt");
    assert!(status.success());

    let output = child.wait_with_output().expect("Simulation did not exit");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stderr.contains("Stop requested after"), "stderr: {}", stderr);
    assert!(stderr.contains("=== SIMULATION COMPLETE ==="), "stderr: {}", stderr);
}
