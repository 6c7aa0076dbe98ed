//! Standalone junction simulation module
//!
//! This module contains all the core simulation logic: agents, following and
//! braking rules, spawning, the signal policy and the tick loop. It runs
//! without the Bevy game engine and can be tested from the console.

mod bands;
mod braking;
mod collision;
mod config;
mod error;
mod frame;
mod signal;
mod spawner;
mod stats;
mod types;
mod vehicle;
mod world;

pub use bands::{BandRange, DetectionBands, TrafficCounts};
pub use braking::{braking_limit, distance_to_stop, stop_line_limit};
pub use collision::{following_limit, gap_ahead};
pub use config::{DrivingThresholds, FrameConfig, RoadGeometry, SimConfig, SpawnConfig};
pub use error::ConfigError;
pub use frame::{kind_color, DrawRect, FrameSnapshot, Rgb};
pub use signal::{
    congestion_level, decide, emergency_axis, Congestion, SignalPhase, SignalState, SignalUpdate,
};
pub use spawner::{entry_point, is_occupied, SpawnController, SpawnOutcome, Stream};
pub use stats::SimulationStats;
pub use types::{AgentId, Axis, Direction, Position, Rect, VehicleKind, AMBULANCE_SPEED};
pub use vehicle::{AgentState, VehicleAgent};
pub use world::{cull, survey, target_speed, SimWorld, StopHandle, TickReport};
