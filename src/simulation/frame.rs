//! Per-tick drawable state handed to renderers

use super::bands::TrafficCounts;
use super::config::RoadGeometry;
use super::signal::SignalPhase;
use super::types::{AgentId, Axis, Direction, Rect, VehicleKind};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
}

/// Body color for each kind of vehicle
pub fn kind_color(kind: VehicleKind) -> Rgb {
    match kind {
        VehicleKind::Car => Rgb(200, 0, 0),
        VehicleKind::Motorcycle => Rgb(0, 100, 200),
        VehicleKind::Auto => Rgb(255, 255, 0),
        VehicleKind::Bus => Rgb(0, 100, 0),
        VehicleKind::Truck => Rgb(255, 165, 0),
        VehicleKind::Ambulance => Rgb(255, 255, 255),
    }
}

/// One vehicle to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub id: AgentId,
    pub kind: VehicleKind,
    pub direction: Direction,
    pub rect: Rect,
    pub color: Rgb,
}

/// Everything a renderer needs to reproduce one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Number of ticks completed when the snapshot was taken
    pub tick: u64,
    pub width: f32,
    pub height: f32,
    pub road: RoadGeometry,
    pub phase: SignalPhase,
    /// Counts from the most recent decision
    pub counts: TrafficCounts,
    /// Vehicles in ascending y order
    pub rects: Vec<DrawRect>,
}

impl FrameSnapshot {
    /// Lamp color for the given road
    pub fn lamp(&self, axis: Axis) -> Rgb {
        if self.phase.green == axis {
            Rgb::GREEN
        } else {
            Rgb::RED
        }
    }
}
