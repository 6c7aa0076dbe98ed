//! Same-lane following distance
//!
//! A plain scan over every agent. One junction holds a few dozen vehicles, so
//! there is no spatial index.

use super::config::DrivingThresholds;
use super::types::{Axis, Direction};
use super::vehicle::VehicleAgent;

/// Whether `other` shares a lane with `agent` and is strictly ahead of it
fn is_leader(agent: &VehicleAgent, other: &VehicleAgent, lane_tolerance: f32) -> bool {
    let (me, them) = (agent.position(), other.position());
    let same_lane = match agent.axis() {
        Axis::Horizontal => (me.y - them.y).abs() < lane_tolerance,
        Axis::Vertical => (me.x - them.x).abs() < lane_tolerance,
    };
    if !same_lane {
        return false;
    }
    match agent.direction() {
        Direction::Right => them.x > me.x,
        Direction::Left => them.x < me.x,
        Direction::Down => them.y > me.y,
        Direction::Up => them.y < me.y,
    }
}

/// Distance from `agent`'s front bumper to the rear of `leader`
fn bumper_gap(agent: &VehicleAgent, leader: &VehicleAgent) -> f32 {
    let me = agent.bounding_rect();
    let them = leader.bounding_rect();
    match agent.direction() {
        Direction::Right => them.x - me.right(),
        Direction::Left => me.x - them.right(),
        Direction::Down => them.y - me.bottom(),
        Direction::Up => me.y - them.bottom(),
    }
}

/// Gap to the nearest same-lane agent ahead, or infinity when the lane is clear
pub fn gap_ahead<'a, I>(agent: &VehicleAgent, others: I, driving: &DrivingThresholds) -> f32
where
    I: IntoIterator<Item = &'a VehicleAgent>,
{
    others
        .into_iter()
        .filter(|other| other.id() != agent.id())
        .filter(|other| is_leader(agent, other, driving.lane_tolerance))
        .map(|leader| bumper_gap(agent, leader))
        .fold(f32::INFINITY, f32::min)
}

/// Speed cap imposed by a gap, `None` when the gap is comfortable
pub fn following_limit(gap: f32, base_speed: f32, driving: &DrivingThresholds) -> Option<f32> {
    if gap < driving.stop_gap {
        Some(0.0)
    } else if gap < driving.caution_gap {
        Some(base_speed * driving.caution_factor)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::{AgentId, Position, VehicleKind};

    fn car(id: usize, direction: Direction, x: f32, y: f32) -> VehicleAgent {
        VehicleAgent::new(AgentId(id), VehicleKind::Car, direction, Position::new(x, y), 7.0)
    }

    #[test]
    fn empty_lane_has_infinite_gap() {
        let driving = DrivingThresholds::default();
        let me = car(0, Direction::Right, 0.0, 400.0);
        let agents = vec![me.clone()];
        assert_eq!(gap_ahead(&me, &agents, &driving), f32::INFINITY);
        assert_eq!(following_limit(f32::INFINITY, 7.0, &driving), None);
    }

    #[test]
    fn picks_the_nearest_leader() {
        let driving = DrivingThresholds::default();
        let me = car(0, Direction::Right, 0.0, 400.0);
        // Horizontal car is 50 long: front bumper at x = 50
        let agents = vec![
            me.clone(),
            car(1, Direction::Right, 300.0, 405.0),
            car(2, Direction::Right, 110.0, 395.0),
        ];
        assert_eq!(gap_ahead(&me, &agents, &driving), 60.0);
    }

    #[test]
    fn ignores_other_lanes_and_agents_behind() {
        let driving = DrivingThresholds::default();
        let me = car(0, Direction::Left, 500.0, 300.0);
        let agents = vec![
            me.clone(),
            // Behind (larger x for a westbound car)
            car(1, Direction::Left, 600.0, 300.0),
            // Ahead but in the neighbouring lane
            car(2, Direction::Left, 400.0, 325.0),
        ];
        assert_eq!(gap_ahead(&me, &agents, &driving), f32::INFINITY);
    }

    #[test]
    fn vertical_lanes_use_x_offset() {
        let driving = DrivingThresholds::default();
        // Vertical car is 50 tall
        let me = car(0, Direction::Up, 600.0, 600.0);
        let leader = car(1, Direction::Up, 610.0, 520.0);
        let agents = vec![me.clone(), leader];
        assert_eq!(gap_ahead(&me, &agents, &driving), 30.0);
    }

    #[test]
    fn gap_thresholds() {
        let driving = DrivingThresholds::default();
        assert_eq!(following_limit(39.9, 8.0, &driving), Some(0.0));
        assert_eq!(following_limit(40.0, 8.0, &driving), Some(4.0));
        assert_eq!(following_limit(79.9, 8.0, &driving), Some(4.0));
        assert_eq!(following_limit(80.0, 8.0, &driving), None);
        // Overlapping footprints give a negative gap
        assert_eq!(following_limit(-10.0, 8.0, &driving), Some(0.0));
    }
}
