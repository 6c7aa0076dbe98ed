//! Core types for the junction simulation
//!
//! These are standalone types that don't depend on Bevy.

use serde::{Deserialize, Serialize};

/// A unique identifier for simulated agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// Kind of vehicle in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Car,
    Motorcycle,
    /// Auto-rickshaw
    Auto,
    Bus,
    Truck,
    /// Priority vehicle, triggers the emergency override
    Ambulance,
}

impl VehicleKind {
    /// Kinds drawn by the regular traffic streams
    pub const REGULAR: [VehicleKind; 5] = [
        VehicleKind::Car,
        VehicleKind::Motorcycle,
        VehicleKind::Auto,
        VehicleKind::Bus,
        VehicleKind::Truck,
    ];

    pub fn is_ambulance(self) -> bool {
        matches!(self, VehicleKind::Ambulance)
    }

    /// Footprint for a vertically travelling vehicle as (width, height)
    pub fn footprint(self) -> (f32, f32) {
        match self {
            VehicleKind::Motorcycle => (15.0, 30.0),
            VehicleKind::Auto => (25.0, 35.0),
            VehicleKind::Car => (30.0, 50.0),
            VehicleKind::Bus => (40.0, 90.0),
            VehicleKind::Truck => (40.0, 100.0),
            VehicleKind::Ambulance => (35.0, 60.0),
        }
    }

    /// Cruise speed range in units per tick. Ambulances get a fixed speed.
    pub fn speed_range(self) -> std::ops::Range<f32> {
        match self {
            VehicleKind::Car => 6.0..8.0,
            VehicleKind::Motorcycle => 7.0..9.0,
            VehicleKind::Auto => 5.0..7.0,
            VehicleKind::Bus => 4.0..5.0,
            VehicleKind::Truck => 3.0..4.0,
            VehicleKind::Ambulance => AMBULANCE_SPEED..AMBULANCE_SPEED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Motorcycle => "motorcycle",
            VehicleKind::Auto => "auto",
            VehicleKind::Bus => "bus",
            VehicleKind::Truck => "truck",
            VehicleKind::Ambulance => "ambulance",
        }
    }
}

/// Travel direction of an agent in screen coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// Unit step along the travel axis
    pub fn unit(self) -> (f32, f32) {
        match self {
            Direction::Right => (1.0, 0.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Down => (0.0, 1.0),
            Direction::Up => (0.0, -1.0),
        }
    }
}

/// One of the two perpendicular roads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::Horizontal => [Direction::Right, Direction::Left],
            Axis::Vertical => [Direction::Down, Direction::Up],
        }
    }
}

/// A 2D position in frame units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// Fixed cruise speed of ambulances, the fastest kind on the road
pub const AMBULANCE_SPEED: f32 = 9.0;
