//! Stop-line braking for traffic without right-of-way

use super::config::{DrivingThresholds, RoadGeometry};
use super::signal::SignalPhase;
use super::types::Direction;
use super::vehicle::VehicleAgent;

/// Distance from the front bumper to the agent's stop line.
///
/// Returns `None` once the rear of the agent has passed the line. The value
/// goes negative while the nose is already over the line.
pub fn distance_to_stop(agent: &VehicleAgent, road: &RoadGeometry) -> Option<f32> {
    let line = road.stop_line(agent.direction());
    let position = agent.position();
    let approaching = match agent.direction() {
        Direction::Right => position.x < line,
        Direction::Left => position.x > line,
        Direction::Down => position.y < line,
        Direction::Up => position.y > line,
    };
    if !approaching {
        return None;
    }
    let edge = agent.leading_edge();
    Some(match agent.direction() {
        Direction::Right | Direction::Down => line - edge,
        Direction::Left | Direction::Up => edge - line,
    })
}

/// Speed cap from a distance to the stop line
pub fn braking_limit(distance: f32, driving: &DrivingThresholds) -> Option<f32> {
    if distance <= driving.stop_clamp {
        Some(0.0)
    } else if distance < driving.braking_distance {
        Some(distance / driving.braking_ramp)
    } else {
        None
    }
}

/// Speed cap imposed by the signal, `None` when the agent may proceed.
///
/// Ambulances never brake for a stop line.
pub fn stop_line_limit(
    agent: &VehicleAgent,
    phase: &SignalPhase,
    road: &RoadGeometry,
    driving: &DrivingThresholds,
) -> Option<f32> {
    if agent.kind().is_ambulance() || phase.has_right_of_way(agent.kind(), agent.direction()) {
        return None;
    }
    distance_to_stop(agent, road).and_then(|distance| braking_limit(distance, driving))
}
