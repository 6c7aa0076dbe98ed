use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use junction_sim::alerts::{AlertWorker, Announcer, AnnouncerConfig, AnnouncerState, LogAlertSink};
use junction_sim::render::{AsciiSink, FrameSink};
use junction_sim::simulation::{SimConfig, SimWorld, StopHandle};

#[derive(Parser)]
#[command(name = "junction_sim")]
#[command(about = "Adaptive traffic signal simulation with optional UI")]
struct Cli {
    /// Run with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Number of simulation ticks to run in headless mode
    #[arg(long, default_value = "3600")]
    ticks: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks between signal decisions
    #[arg(long)]
    decision_interval: Option<u64>,

    /// Frames per simulated second
    #[arg(long)]
    fps: Option<u32>,

    /// Print the terminal map every N ticks (0 disables it)
    #[arg(long, default_value = "600")]
    map_every: u64,

    /// Seconds of quiet required before a priority shift is announced
    #[arg(long, default_value = "8.0")]
    announce_gap: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.ui {
        return run_with_ui(config, cli.seed);
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run_headless(&cli, config)
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(interval) = cli.decision_interval {
        config.decision_interval = interval;
    }
    if let Some(fps) = cli.fps {
        config.frame.fps = fps;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_world(config: SimConfig, seed: Option<u64>) -> Result<SimWorld> {
    let world = match seed {
        Some(seed) => SimWorld::new_with_seed(config, seed)?,
        None => SimWorld::new(config)?,
    };
    Ok(world)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli, config: SimConfig) -> Result<()> {
    info!("Running junction simulation in headless mode");
    info!(
        "Ticks: {}, {} fps, decision every {} ticks",
        cli.ticks, config.frame.fps, config.decision_interval
    );
    if let Some(seed) = cli.seed {
        info!("Seed: {}", seed);
    }

    let tick_secs = config.frame.tick_secs() as f64;
    let mut world = build_world(config, cli.seed)?;

    let alert_config = AnnouncerConfig {
        min_repeat_secs: cli.announce_gap,
        ..AnnouncerConfig::default()
    };
    let mut alerts = AlertWorker::spawn(LogAlertSink, alert_config.queue_capacity)?;
    let announcer = Announcer::new(alert_config);
    let mut voice = AnnouncerState::default();
    let mut map = (cli.map_every > 0).then(|| AsciiSink::new(cli.map_every));

    println!("Initial state:");
    world.print_summary();
    println!();

    let stop = StopHandle::new();
    let handler = stop.clone();
    ctrlc::set_handler(move || handler.request_stop())
        .context("Failed to install termination handler")?;

    let ran = world.run(cli.ticks, &stop, |world, report| {
        if let Some(update) = &report.update {
            let now = report.tick as f64 * tick_secs;
            if let Some(announcement) = announcer.observe(&mut voice, update, now) {
                alerts.submit(&announcement);
            }
        }
        if let Some(sink) = map.as_mut() {
            sink.emit(&world.snapshot())?;
        }
        Ok(())
    })?;

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();

    world
        .stats
        .log_summary(world.agents().len(), world.config().frame.tick_secs());
    info!("Ticks run: {}, alerts dropped: {}", ran, alerts.dropped());
    alerts.shutdown()
}

#[cfg(feature = "ui")]
fn run_with_ui(config: SimConfig, seed: Option<u64>) -> Result<()> {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;

    let (width, height) = (config.frame.width as u32, config.frame.height as u32);
    let fps = config.frame.fps as f64;
    let world = build_world(config, seed)?;

    println!("Starting Junction Sim UI...");
    println!();
    println!("Controls:");
    println!("  SPACE       - Pause/resume");
    println!("  ESC         - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: "warn,junction_sim=info".to_string(),
                    level: bevy::log::Level::INFO,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Junction Sim".into(),
                        resolution: (width, height).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .insert_resource(Time::<Fixed>::from_hz(fps))
        .insert_resource(junction_sim::ui::SimWorldResource::new(world))
        .add_plugins(junction_sim::ui::JunctionUIPlugin)
        .run();
    Ok(())
}

#[cfg(not(feature = "ui"))]
fn run_with_ui(_config: SimConfig, _seed: Option<u64>) -> Result<()> {
    anyhow::bail!("UI feature is not enabled. Rebuild with --features ui")
}
