//! Main simulation world that ties everything together
//!
//! This is the entry point for running the junction simulation without any
//! Bevy dependencies. One tick runs, in order: spawn, count and decide (on
//! decision ticks), move, cull. Renderers read a `FrameSnapshot` afterwards.

use anyhow::{bail, Result};
use log::{debug, info};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::bands::{DetectionBands, TrafficCounts};
use super::braking::stop_line_limit;
use super::collision::{following_limit, gap_ahead};
use super::config::{FrameConfig, SimConfig};
use super::error::ConfigError;
use super::frame::{kind_color, DrawRect, FrameSnapshot};
use super::signal::{SignalPhase, SignalState, SignalUpdate};
use super::spawner::{SpawnController, Stream};
use super::stats::SimulationStats;
use super::types::{AgentId, Direction, Position, VehicleKind};
use super::vehicle::VehicleAgent;

/// What one tick did
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Index of the tick that just ran
    pub tick: u64,
    pub spawned: Vec<(AgentId, Stream)>,
    pub rejected_spawns: usize,
    /// Present only on decision ticks
    pub update: Option<SignalUpdate>,
    /// Agents culled at the end of the tick, already marked removed
    pub removed: Vec<VehicleAgent>,
}

/// Shared flag for asking a running loop to stop after the current tick
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cap on an agent's speed for this tick: the cruise speed, lowered by the
/// vehicle ahead and by a red stop line.
pub fn target_speed(
    agent: &VehicleAgent,
    agents: &[VehicleAgent],
    phase: &SignalPhase,
    config: &SimConfig,
) -> f32 {
    let mut target = agent.base_speed();
    let gap = gap_ahead(agent, agents, &config.driving);
    if let Some(limit) = following_limit(gap, agent.base_speed(), &config.driving) {
        target = target.min(limit);
    }
    if let Some(limit) = stop_line_limit(agent, phase, &config.road, &config.driving) {
        target = target.min(limit);
    }
    target
}

/// Whether an agent's origin is still within `margin` of the frame
fn in_view(position: Position, frame: &FrameConfig, margin: f32) -> bool {
    -margin < position.x
        && position.x < frame.width + margin
        && -margin < position.y
        && position.y < frame.height + margin
}

/// Remove agents that left the frame by more than `margin`, returning them
/// marked as removed. Running it twice without movement removes nothing more.
pub fn cull(agents: &mut Vec<VehicleAgent>, frame: &FrameConfig, margin: f32) -> Vec<VehicleAgent> {
    let (kept, mut removed): (Vec<_>, Vec<_>) = std::mem::take(agents)
        .into_iter()
        .partition(|agent| in_view(agent.position(), frame, margin));
    *agents = kept;
    for agent in &mut removed {
        agent.mark_removed();
    }
    removed
}

/// Occupancy counts plus the heading of the last ambulance seen
pub fn survey(
    agents: &[VehicleAgent],
    bands: &DetectionBands,
    frame: &FrameConfig,
) -> (TrafficCounts, Option<Direction>) {
    let counts = bands.count(
        agents.iter().map(VehicleAgent::bounding_rect),
        frame.width,
        frame.height,
    );
    let ambulance = agents
        .iter()
        .filter(|agent| agent.kind() == VehicleKind::Ambulance)
        .last()
        .map(VehicleAgent::direction);
    (counts, ambulance)
}

/// The main simulation world
pub struct SimWorld {
    config: SimConfig,

    /// All live agents, in ascending y order after each movement phase
    agents: Vec<VehicleAgent>,

    spawner: SpawnController,

    bands: DetectionBands,

    /// Last resolved signal, starts with the horizontal road green
    phase: SignalPhase,

    /// Most recent decision
    last_update: Option<SignalUpdate>,

    /// Number of ticks completed
    tick: u64,

    /// Next ID to assign
    next_id: usize,

    rng: StdRng,

    pub stats: SimulationStats,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new_internal(SimConfig::default(), StdRng::from_rng(&mut rand::rng()))
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: StdRng) -> Self {
        let bands = config.detection_bands();
        Self {
            config,
            agents: Vec::new(),
            spawner: SpawnController::new(),
            bands,
            phase: SignalPhase::default(),
            last_update: None,
            tick: 0,
            next_id: 0,
            rng,
            stats: SimulationStats::default(),
        }
    }

    /// Create a world, rejecting an invalid configuration up front
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new_internal(config, StdRng::from_rng(&mut rand::rng())))
    }

    /// Create a world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new_internal(config, StdRng::seed_from_u64(seed)))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn agents(&self) -> &[VehicleAgent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&VehicleAgent> {
        self.agents.iter().find(|agent| agent.id() == id)
    }

    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    pub fn last_update(&self) -> Option<&SignalUpdate> {
        self.last_update.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn bands(&self) -> &DetectionBands {
        &self.bands
    }

    /// Insert an agent between ticks with a fixed cruise speed
    pub fn add_agent(
        &mut self,
        kind: VehicleKind,
        direction: Direction,
        position: Position,
        base_speed: f32,
    ) -> AgentId {
        self.insert(|id| VehicleAgent::new(id, kind, direction, position, base_speed))
    }

    /// Insert an agent between ticks, built from a fresh ID
    pub fn insert(&mut self, build: impl FnOnce(AgentId) -> VehicleAgent) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.push(build(id));
        self.stats.peak_agents = self.stats.peak_agents.max(self.agents.len());
        id
    }

    fn is_decision_tick(&self, tick: u64) -> bool {
        tick % self.config.decision_interval == 0
    }

    /// Main simulation tick.
    ///
    /// Works on a staged copy of the agent set; if anything goes wrong the
    /// world keeps the state left by the previous tick.
    pub fn tick(&mut self) -> Result<TickReport> {
        let tick = self.tick;
        let mut agents = self.agents.clone();
        let mut next_id = self.next_id;
        let mut spawner = self.spawner.clone();

        // Spawn
        let outcome = spawner.run(tick, &mut agents, &mut next_id, &self.config, &mut self.rng);

        // Count and decide
        let mut phase = self.phase;
        let update = if self.is_decision_tick(tick) {
            let (counts, ambulance) = survey(&agents, &self.bands, &self.config.frame);
            let update = SignalUpdate::assess(tick, counts, ambulance.is_some(), ambulance);
            phase = update.phase;
            Some(update)
        } else {
            None
        };

        // Move
        agents.sort_by_key(|agent| OrderedFloat(agent.position().y));
        for index in 0..agents.len() {
            let target = target_speed(&agents[index], &agents, &phase, &self.config);
            agents[index].integrate(target, &self.config.driving);
            let position = agents[index].position();
            if !position.is_finite() {
                bail!(
                    "Agent {:?} reached a non-finite position on tick {}",
                    agents[index].id(),
                    tick
                );
            }
        }
        let peak = agents.len();

        // Cull
        let removed = cull(&mut agents, &self.config.frame, self.config.cull_margin);
        for agent in &removed {
            debug!("Agent {:?} ({}) left the junction", agent.id(), agent.kind().label());
        }

        // Commit
        self.agents = agents;
        self.next_id = next_id;
        self.spawner = spawner;
        self.tick += 1;

        if let Some(update) = &update {
            let switched = update.phase.green != self.phase.green;
            if update.state != self.phase.state || switched {
                if update.state == SignalState::Emergency {
                    info!(
                        "Emergency override on tick {}: ambulance heading {:?}, green for {:?}",
                        tick, update.ambulance_direction, update.phase.green
                    );
                } else {
                    info!(
                        "Signal {} -> {} on tick {} (H: {}, V: {})",
                        self.phase.state,
                        update.state,
                        tick,
                        update.counts.horizontal,
                        update.counts.vertical
                    );
                }
            }
            self.stats.record_decision(update, switched);
            self.last_update = Some(*update);
        }
        self.phase = phase;

        for (_, stream) in &outcome.spawned {
            self.stats.record_spawn(*stream);
        }
        self.stats.rejected_spawns += outcome.rejected.len() as u64;
        self.stats.exited += removed.len() as u64;
        self.stats.ticks = self.tick;
        self.stats.peak_agents = self.stats.peak_agents.max(peak);

        Ok(TickReport {
            tick,
            spawned: outcome.spawned,
            rejected_spawns: outcome.rejected.len(),
            update,
            removed,
        })
    }

    /// Run up to `ticks` ticks, handing each report to `observer`.
    ///
    /// A stop request is honoured between ticks. Returns the number of ticks run.
    pub fn run<F>(&mut self, ticks: u64, stop: &StopHandle, mut observer: F) -> Result<u64>
    where
        F: FnMut(&SimWorld, &TickReport) -> Result<()>,
    {
        let mut ran = 0;
        while ran < ticks {
            if stop.is_stop_requested() {
                info!("Stop requested after {} ticks", ran);
                break;
            }
            let report = self.tick()?;
            ran += 1;
            observer(self, &report)?;
        }
        Ok(ran)
    }

    /// Drawable state after the last tick
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.tick,
            width: self.config.frame.width,
            height: self.config.frame.height,
            road: self.config.road.clone(),
            phase: self.phase,
            counts: self
                .last_update
                .map(|update| update.counts)
                .unwrap_or_default(),
            rects: self
                .agents
                .iter()
                .map(|agent| DrawRect {
                    id: agent.id(),
                    kind: agent.kind(),
                    direction: agent.direction(),
                    rect: agent.bounding_rect(),
                    color: kind_color(agent.kind()),
                })
                .collect(),
        }
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Junction Simulation Summary ===");
        println!(
            "Tick: {} ({:.2}s)",
            self.tick,
            self.tick as f32 * self.config.frame.tick_secs()
        );
        println!(
            "Signal: {} (green for {:?})",
            self.phase.state, self.phase.green
        );
        if let Some(update) = &self.last_update {
            println!(
                "Queues: H={} V={} | Congestion: {} | Ambulance: {}",
                update.counts.horizontal,
                update.counts.vertical,
                update.congestion(),
                if update.ambulance_present { "yes" } else { "no" }
            );
        }
        println!("Vehicles: {}", self.agents.len());
        for kind in VehicleKind::REGULAR
            .iter()
            .chain(std::iter::once(&VehicleKind::Ambulance))
        {
            let count = self.agents.iter().filter(|a| a.kind() == *kind).count();
            if count > 0 {
                println!("  {}: {}", kind.label(), count);
            }
        }
        let stopped = self.agents.iter().filter(|a| a.speed() == 0.0).count();
        println!("Stopped vehicles: {}", stopped);
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== Junction Map ===");
        println!("Legend: C=Car, M=Motorcycle, A=Auto, B=Bus, T=Truck, E=Ambulance, -=Road, |=Road, +=Junction");
        println!();
        print!("{}", crate::render::ascii_map(&self.snapshot()));
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::vehicle::AgentState;

    fn quiet_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.spawn.base_rate = 0.0;
        config.spawn.burst_rate = 0.0;
        config.spawn.emergency_interval = u64::MAX;
        config
    }

    #[test]
    fn invalid_config_fails_fast() {
        let mut config = SimConfig::default();
        config.road.horizontal_bottom = config.road.horizontal_top;
        assert!(SimWorld::new(config).is_err());
    }

    #[test]
    fn cull_is_idempotent() {
        let frame = FrameConfig::default();
        let mut agents = vec![
            VehicleAgent::new(AgentId(0), VehicleKind::Car, Direction::Right, Position::new(1431.0, 400.0), 7.0),
            VehicleAgent::new(AgentId(1), VehicleKind::Car, Direction::Right, Position::new(1429.0, 400.0), 7.0),
            VehicleAgent::new(AgentId(2), VehicleKind::Bus, Direction::Up, Position::new(700.0, -151.0), 4.5),
            VehicleAgent::new(AgentId(3), VehicleKind::Bus, Direction::Down, Position::new(600.0, -100.0), 4.5),
        ];
        let removed = cull(&mut agents, &frame, 150.0);
        let ids: Vec<_> = removed.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![AgentId(0), AgentId(2)]);
        assert!(removed.iter().all(|a| a.state() == AgentState::Removed));

        let remaining: Vec<_> = agents.iter().map(|a| a.id()).collect();
        assert!(cull(&mut agents, &frame, 150.0).is_empty());
        let again: Vec<_> = agents.iter().map(|a| a.id()).collect();
        assert_eq!(remaining, again);
    }

    #[test]
    fn first_tick_decides_and_later_ticks_wait_for_the_cadence() {
        let mut world = SimWorld::new_with_seed(quiet_config(), 1).unwrap();
        world.add_agent(VehicleKind::Car, Direction::Down, Position::new(600.0, 50.0), 6.0);
        let report = world.tick().unwrap();
        let update = report.update.expect("tick 0 is a decision tick");
        assert_eq!(update.counts.vertical, 1);
        assert_eq!(update.state, SignalState::Vertical);
        for _ in 1..10 {
            assert!(world.tick().unwrap().update.is_none());
        }
        assert!(world.tick().unwrap().update.is_some());
        assert_eq!(world.stats.decisions, 2);
    }

    #[test]
    fn run_stops_between_ticks() {
        let mut world = SimWorld::new_with_seed(quiet_config(), 2).unwrap();
        let stop = StopHandle::new();
        let ran = world
            .run(100, &stop, |world, _| {
                if world.ticks() == 5 {
                    stop.request_stop();
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(ran, 5);
        assert_eq!(world.ticks(), 5);
    }

    #[test]
    fn failed_tick_leaves_previous_state() {
        let mut world = SimWorld::new_with_seed(quiet_config(), 4).unwrap();
        let steady = world.add_agent(VehicleKind::Car, Direction::Right, Position::new(0.0, 420.0), 6.0);
        world.tick().unwrap();
        let before = world.agent(steady).unwrap().position();
        let stats = world.stats.clone();

        // Moves after the car in y order, so the car has already been updated when it fails
        world.add_agent(VehicleKind::Bus, Direction::Down, Position::new(560.0, 600.0), f32::INFINITY);
        let err = world.tick().unwrap_err();
        assert!(err.to_string().contains("non-finite position"));

        assert_eq!(world.ticks(), 1);
        assert_eq!(world.agents().len(), 2);
        assert_eq!(world.agent(steady).unwrap().position(), before);
        assert_eq!(world.agent(steady).unwrap().position().x, 6.0);
        assert_eq!(world.stats.ticks, stats.ticks);
        assert_eq!(world.stats.decisions, stats.decisions);
    }

    #[test]
    fn snapshot_lists_every_agent() {
        let mut world = SimWorld::new_with_seed(quiet_config(), 3).unwrap();
        world.add_agent(VehicleKind::Truck, Direction::Left, Position::new(900.0, 260.0), 3.5);
        world.add_agent(VehicleKind::Ambulance, Direction::Up, Position::new(700.0, 600.0), 9.0);
        world.tick().unwrap();
        let snapshot = world.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.rects.len(), 2);
        assert_eq!(snapshot.rects[0].kind, VehicleKind::Truck);
        assert_eq!(snapshot.rects[1].color, kind_color(VehicleKind::Ambulance));
    }
}
