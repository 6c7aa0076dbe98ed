//! Vehicle agents and their kinematics
//!
//! Standalone implementation that doesn't depend on Bevy.

use rand::Rng;

use super::config::DrivingThresholds;
use super::types::{AgentId, Axis, Direction, Position, Rect, VehicleKind, AMBULANCE_SPEED};

/// Lifecycle of an agent. Transitions only go forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgentState {
    /// Inserted but not yet moved
    Idle,
    Moving,
    /// Culled after leaving the visible area
    Removed,
}

/// A vehicle in the junction simulation
#[derive(Debug, Clone)]
pub struct VehicleAgent {
    id: AgentId,
    kind: VehicleKind,
    direction: Direction,
    /// Top-left corner of the footprint
    position: Position,
    width: f32,
    height: f32,
    base_speed: f32,
    speed: f32,
    state: AgentState,
}

impl VehicleAgent {
    /// Create an agent with an explicit cruise speed.
    ///
    /// The footprint comes from `kind` and is rotated for horizontal travel.
    pub fn new(
        id: AgentId,
        kind: VehicleKind,
        direction: Direction,
        position: Position,
        base_speed: f32,
    ) -> Self {
        let (mut width, mut height) = kind.footprint();
        if direction.axis() == Axis::Horizontal {
            std::mem::swap(&mut width, &mut height);
        }
        let base_speed = base_speed.max(0.0);
        Self {
            id,
            kind,
            direction,
            position,
            width,
            height,
            base_speed,
            speed: base_speed,
            state: AgentState::Idle,
        }
    }

    /// Create an agent, sampling its cruise speed from the kind's range
    pub fn spawn<R: Rng>(
        id: AgentId,
        kind: VehicleKind,
        direction: Direction,
        position: Position,
        rng: &mut R,
    ) -> Self {
        let base_speed = match kind {
            VehicleKind::Ambulance => AMBULANCE_SPEED,
            _ => rng.random_range(kind.speed_range()),
        };
        Self::new(id, kind, direction, position, base_speed)
    }

    /// Override the starting speed before the agent enters the world
    pub fn with_initial_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn axis(&self) -> Axis {
        self.direction.axis()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn bounding_rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    pub fn center(&self) -> Position {
        self.bounding_rect().center()
    }

    /// Coordinate of the front bumper along the travel axis
    pub fn leading_edge(&self) -> f32 {
        match self.direction {
            Direction::Right => self.position.x + self.width,
            Direction::Left => self.position.x,
            Direction::Down => self.position.y + self.height,
            Direction::Up => self.position.y,
        }
    }

    /// Ease the speed toward `target` and advance along the travel axis.
    ///
    /// Speed never overshoots the target and never drops below zero.
    pub(crate) fn integrate(&mut self, target: f32, driving: &DrivingThresholds) {
        let target = target.max(0.0);
        if self.speed < target {
            self.speed = (self.speed + driving.acceleration).min(target);
        } else if self.speed > target {
            self.speed = (self.speed - driving.deceleration).max(target);
        }
        self.speed = self.speed.max(0.0);

        let (dx, dy) = self.direction.unit();
        self.position.x += dx * self.speed;
        self.position.y += dy * self.speed;
        if self.state == AgentState::Idle {
            self.state = AgentState::Moving;
        }
    }

    pub(crate) fn mark_removed(&mut self) {
        self.state = AgentState::Removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn agent(kind: VehicleKind, direction: Direction, base_speed: f32) -> VehicleAgent {
        VehicleAgent::new(AgentId(0), kind, direction, Position::new(100.0, 100.0), base_speed)
    }

    #[test]
    fn horizontal_agents_have_rotated_footprint() {
        let vertical = agent(VehicleKind::Bus, Direction::Down, 4.5);
        let horizontal = agent(VehicleKind::Bus, Direction::Left, 4.5);
        assert_eq!(vertical.size(), (40.0, 90.0));
        assert_eq!(horizontal.size(), (90.0, 40.0));
    }

    #[test]
    fn spawned_speeds_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in VehicleKind::REGULAR {
            for _ in 0..50 {
                let a = VehicleAgent::spawn(AgentId(1), kind, Direction::Right, Position::default(), &mut rng);
                assert!(kind.speed_range().contains(&a.base_speed()), "{:?}", kind);
                assert!(a.base_speed() < AMBULANCE_SPEED);
                assert_eq!(a.speed(), a.base_speed());
            }
        }
        let ambulance = VehicleAgent::spawn(
            AgentId(2),
            VehicleKind::Ambulance,
            Direction::Up,
            Position::default(),
            &mut rng,
        );
        assert_eq!(ambulance.base_speed(), AMBULANCE_SPEED);
    }

    #[test]
    fn bounding_rect_is_a_projection_of_state() {
        let a = agent(VehicleKind::Car, Direction::Right, 7.0);
        assert_eq!(a.bounding_rect(), Rect::new(100.0, 100.0, 50.0, 30.0));
        assert_eq!(a.center(), Position::new(125.0, 115.0));
        assert_eq!(a.leading_edge(), 150.0);
    }

    #[test]
    fn integrate_moves_along_direction_and_leaves_idle() {
        let driving = DrivingThresholds::default();
        let mut a = agent(VehicleKind::Car, Direction::Up, 6.5);
        assert_eq!(a.state(), AgentState::Idle);
        a.integrate(6.5, &driving);
        assert_eq!(a.position(), Position::new(100.0, 93.5));
        assert_eq!(a.state(), AgentState::Moving);
    }

    #[test]
    fn acceleration_reaches_cruise_without_overshoot() {
        let driving = DrivingThresholds::default();
        let mut a = agent(VehicleKind::Car, Direction::Right, 7.3).with_initial_speed(0.0);
        let bound = (7.3_f32 / driving.acceleration).ceil() as usize;
        for _ in 0..bound {
            a.integrate(a.base_speed(), &driving);
            assert!(a.speed() <= a.base_speed());
        }
        assert!((a.speed() - a.base_speed()).abs() < 1e-4);
    }

    #[test]
    fn speed_never_goes_negative() {
        let driving = DrivingThresholds::default();
        let mut a = agent(VehicleKind::Truck, Direction::Left, 3.2).with_initial_speed(0.2);
        let x = a.position().x;
        a.integrate(0.0, &driving);
        assert_eq!(a.speed(), 0.0);
        assert_eq!(a.position().x, x);
    }
}
