//! UI components and resources for linking Bevy entities to simulation state

use bevy::prelude::*;
use std::collections::HashMap;

use crate::alerts::{Announcer, AnnouncerState};
use crate::simulation::{AgentId, Axis, FrameConfig, Rgb, SimWorld};

/// Resource wrapper for the simulation world
#[derive(Resource)]
pub struct SimWorldResource(pub SimWorld);

impl SimWorldResource {
    pub fn new(world: SimWorld) -> Self {
        Self(world)
    }
}

impl Default for SimWorldResource {
    fn default() -> Self {
        Self(SimWorld::default())
    }
}

/// Pause state toggled from the keyboard
#[derive(Resource, Default)]
pub struct SimControl {
    pub paused: bool,
}

/// Announcer memory plus the last phrase shown on screen
#[derive(Resource, Default)]
pub struct AlertFeed {
    pub announcer: Announcer,
    pub state: AnnouncerState,
    pub last: Option<String>,
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker for entities synced from simulation
#[derive(Component)]
pub struct SimSynced;

/// Links a Bevy entity to a simulation agent
#[derive(Component)]
pub struct AgentLink(pub AgentId);

/// Signal lamp for one road
#[derive(Component)]
pub struct SignalLamp(pub Axis);

/// Marker for HUD text lines
#[derive(Component)]
pub enum StatusText {
    Signal,
    Queues,
    Congestion,
    Alert,
}

/// Resource to track Bevy entities mapped to simulation agents
#[derive(Resource, Default)]
pub struct EntityMappings {
    pub agents: HashMap<AgentId, Entity>,
}

/// Frame coordinates (origin top-left, y down) to Bevy world coordinates
/// (origin at the window center, y up)
pub fn to_world(frame: &FrameConfig, x: f32, y: f32) -> Vec2 {
    Vec2::new(x - frame.width / 2.0, frame.height / 2.0 - y)
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::srgb_u8(rgb.0, rgb.1, rgb.2)
}
