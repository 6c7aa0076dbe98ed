//! Traffic generation at the frame edges
//!
//! Regular streams fire with a per-tick probability that alternates between a
//! base and a burst rate; ambulances arrive on a fixed timer.

use log::debug;
use rand::Rng;

use super::config::{FrameConfig, RoadGeometry, SimConfig, SpawnConfig};
use super::types::{AgentId, Axis, Direction, Position, VehicleKind};
use super::vehicle::VehicleAgent;

/// Source of new agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Horizontal,
    Vertical,
    Emergency,
}

/// What happened during one spawn phase
#[derive(Debug, Clone, Default)]
pub struct SpawnOutcome {
    pub spawned: Vec<(AgentId, Stream)>,
    /// Triggers that fired but found the entry point occupied
    pub rejected: Vec<Stream>,
}

/// Per-tick spawn decisions. Holds only the emergency timer.
#[derive(Debug, Clone, Default)]
pub struct SpawnController {
    emergency_timer: u64,
}

impl SpawnController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn probabilities for (horizontal, vertical) on `tick`
    pub fn rates(tick: u64, spawn: &SpawnConfig) -> (f64, f64) {
        if tick % spawn.burst_cycle < spawn.burst_cycle / 2 {
            (spawn.burst_rate, spawn.base_rate)
        } else {
            (spawn.base_rate, spawn.burst_rate)
        }
    }

    /// Run every stream once, inserting accepted agents into `agents`.
    ///
    /// Later streams see agents inserted earlier in the same call.
    pub fn run<R: Rng>(
        &mut self,
        tick: u64,
        agents: &mut Vec<VehicleAgent>,
        next_id: &mut usize,
        config: &SimConfig,
        rng: &mut R,
    ) -> SpawnOutcome {
        let mut outcome = SpawnOutcome::default();

        self.emergency_timer += 1;
        if self.emergency_timer > config.spawn.emergency_interval {
            self.emergency_timer = 0;
            let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
            let position = entry_point(
                direction,
                config.spawn.ambulance_offset,
                0.0,
                &config.road,
                &config.frame,
                &config.spawn,
            );
            let clearance = (config.spawn.ambulance_clearance, config.spawn.ambulance_clearance);
            self.try_insert(
                Stream::Emergency,
                VehicleKind::Ambulance,
                direction,
                position,
                clearance,
                agents,
                next_id,
                rng,
                &mut outcome,
            );
        }

        let (rate_horizontal, rate_vertical) = Self::rates(tick, &config.spawn);
        for (stream, axis, rate) in [
            (Stream::Horizontal, Axis::Horizontal, rate_horizontal),
            (Stream::Vertical, Axis::Vertical, rate_vertical),
        ] {
            if !rng.random_bool(rate) {
                continue;
            }
            let directions = axis.directions();
            let direction = directions[rng.random_range(0..directions.len())];
            let offset = rng.random_range(config.spawn.lane_offset_min..=config.spawn.lane_offset_max);
            let position = entry_point(
                direction,
                offset as f32,
                config.spawn.lane_inset,
                &config.road,
                &config.frame,
                &config.spawn,
            );
            let (along, across) = (config.spawn.clearance_along, config.spawn.clearance_across);
            let clearance = match axis {
                Axis::Horizontal => (along, across),
                Axis::Vertical => (across, along),
            };
            let kind = VehicleKind::REGULAR[rng.random_range(0..VehicleKind::REGULAR.len())];
            self.try_insert(
                stream, kind, direction, position, clearance, agents, next_id, rng, &mut outcome,
            );
        }

        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn try_insert<R: Rng>(
        &self,
        stream: Stream,
        kind: VehicleKind,
        direction: Direction,
        position: Position,
        clearance: (f32, f32),
        agents: &mut Vec<VehicleAgent>,
        next_id: &mut usize,
        rng: &mut R,
        outcome: &mut SpawnOutcome,
    ) {
        if is_occupied(position, clearance, agents) {
            debug!(
                "Spawn of {} heading {:?} rejected at ({:.0}, {:.0})",
                kind.label(),
                direction,
                position.x,
                position.y
            );
            outcome.rejected.push(stream);
            return;
        }
        let id = AgentId(*next_id);
        *next_id += 1;
        debug!(
            "Spawned {} {:?} heading {:?} at ({:.0}, {:.0})",
            kind.label(),
            id,
            direction,
            position.x,
            position.y
        );
        agents.push(VehicleAgent::spawn(id, kind, direction, position, rng));
        outcome.spawned.push((id, stream));
    }
}

/// Off-screen entry point for a vehicle heading in `direction`.
///
/// `offset` is measured from the road edge on the driver's side; `inset`
/// keeps the footprint on the road for the lanes measured from the far edge.
pub fn entry_point(
    direction: Direction,
    offset: f32,
    inset: f32,
    road: &RoadGeometry,
    frame: &FrameConfig,
    spawn: &SpawnConfig,
) -> Position {
    match direction {
        Direction::Right => Position::new(-spawn.entry_before, road.horizontal_bottom - offset - inset),
        Direction::Left => Position::new(frame.width + spawn.entry_after, road.horizontal_top + offset),
        Direction::Down => Position::new(road.vertical_left + offset, -spawn.entry_before),
        Direction::Up => Position::new(road.vertical_right - offset - inset, frame.height + spawn.entry_after),
    }
}

/// Whether any agent's origin lies within `(dx, dy)` of `position`
pub fn is_occupied(position: Position, (dx, dy): (f32, f32), agents: &[VehicleAgent]) -> bool {
    agents.iter().any(|agent| {
        let p = agent.position();
        (p.x - position.x).abs() < dx && (p.y - position.y).abs() < dy
    })
}
