//! Tunable simulation parameters
//!
//! Every constant the tick loop depends on lives here so it can be overridden
//! from a YAML file. Missing keys fall back to the defaults below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::bands::DetectionBands;
use super::error::ConfigError;
use super::types::Direction;

/// Output frame and tick rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: f32,
    pub height: f32,
    /// Simulation ticks per second of output
    pub fps: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            fps: 60,
        }
    }
}

impl FrameConfig {
    /// Duration of one tick in seconds
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.fps as f32
    }
}

/// Two perpendicular road strips and the stop-line offset around the junction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadGeometry {
    /// Top edge of the horizontal road
    pub horizontal_top: f32,
    /// Bottom edge of the horizontal road
    pub horizontal_bottom: f32,
    /// Left edge of the vertical road
    pub vertical_left: f32,
    /// Right edge of the vertical road
    pub vertical_right: f32,
    /// Distance between the junction boundary and each stop line
    pub stop_margin: f32,
}

impl Default for RoadGeometry {
    fn default() -> Self {
        Self {
            horizontal_top: 240.0,
            horizontal_bottom: 480.0,
            vertical_left: 520.0,
            vertical_right: 760.0,
            stop_margin: 20.0,
        }
    }
}

impl RoadGeometry {
    /// Coordinate of the stop line for traffic travelling in `direction`.
    ///
    /// Eastbound traffic stops left of the junction, westbound traffic right
    /// of it, and likewise for the vertical road.
    pub fn stop_line(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Right => self.vertical_left - self.stop_margin,
            Direction::Left => self.vertical_right + self.stop_margin,
            Direction::Down => self.horizontal_top - self.stop_margin,
            Direction::Up => self.horizontal_bottom + self.stop_margin,
        }
    }

    pub fn validate(&self, frame: &FrameConfig) -> Result<(), ConfigError> {
        if !(frame.width > 0.0 && frame.height > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "frame {}x{} has no area",
                frame.width, frame.height
            )));
        }
        if !(self.horizontal_top >= 0.0
            && self.horizontal_top < self.horizontal_bottom
            && self.horizontal_bottom <= frame.height)
        {
            return Err(ConfigError::InvalidGeometry(format!(
                "horizontal road {}..{} is empty or outside 0..{}",
                self.horizontal_top, self.horizontal_bottom, frame.height
            )));
        }
        if !(self.vertical_left >= 0.0
            && self.vertical_left < self.vertical_right
            && self.vertical_right <= frame.width)
        {
            return Err(ConfigError::InvalidGeometry(format!(
                "vertical road {}..{} is empty or outside 0..{}",
                self.vertical_left, self.vertical_right, frame.width
            )));
        }
        if !(self.stop_margin >= 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "stop margin {} is negative",
                self.stop_margin
            )));
        }
        // Each approach needs some road between the frame edge and its stop line.
        let approaches = [
            (Direction::Right, self.stop_line(Direction::Right), 0.0 < self.stop_line(Direction::Right)),
            (Direction::Left, self.stop_line(Direction::Left), self.stop_line(Direction::Left) < frame.width),
            (Direction::Down, self.stop_line(Direction::Down), 0.0 < self.stop_line(Direction::Down)),
            (Direction::Up, self.stop_line(Direction::Up), self.stop_line(Direction::Up) < frame.height),
        ];
        for (direction, line, inside) in approaches {
            if !inside {
                return Err(ConfigError::InvalidGeometry(format!(
                    "stop line for {:?} traffic at {} leaves no approach inside the frame",
                    direction, line
                )));
            }
        }
        Ok(())
    }
}

/// Traffic generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Per-tick spawn probability outside a burst
    pub base_rate: f64,
    /// Per-tick spawn probability during a burst
    pub burst_rate: f64,
    /// Ticks per burst cycle; horizontal bursts first, vertical second
    pub burst_cycle: u64,
    /// An ambulance spawns once the emergency timer exceeds this many ticks
    pub emergency_interval: u64,
    /// Lane offset range (inclusive) from the road edge
    pub lane_offset_min: i32,
    pub lane_offset_max: i32,
    /// Extra inset applied on the far-side lanes so footprints stay on the road
    pub lane_inset: f32,
    /// Fixed lane offset used for ambulances
    pub ambulance_offset: f32,
    /// How far outside the near frame edge (left/top) vehicles enter
    pub entry_before: f32,
    /// How far outside the far frame edge (right/bottom) vehicles enter
    pub entry_after: f32,
    /// Spawn rejection window along the travel axis
    pub clearance_along: f32,
    /// Spawn rejection window across the travel axis
    pub clearance_across: f32,
    /// Spawn rejection window for ambulances, both axes
    pub ambulance_clearance: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.15,
            burst_rate: 0.3,
            burst_cycle: 300,
            emergency_interval: 700,
            lane_offset_min: 10,
            lane_offset_max: 80,
            lane_inset: 20.0,
            ambulance_offset: 60.0,
            entry_before: 100.0,
            entry_after: 50.0,
            clearance_along: 80.0,
            clearance_across: 60.0,
            ambulance_clearance: 100.0,
        }
    }
}

impl SpawnConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, rate) in [("base_rate", self.base_rate), ("burst_rate", self.burst_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("{} is not a probability", rate),
                });
            }
        }
        if self.burst_cycle == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "burst_cycle",
                reason: "must be at least one tick".to_string(),
            });
        }
        if self.lane_offset_min > self.lane_offset_max {
            return Err(ConfigError::InvalidParameter {
                name: "lane_offset_min",
                reason: format!(
                    "{} exceeds lane_offset_max {}",
                    self.lane_offset_min, self.lane_offset_max
                ),
            });
        }
        Ok(())
    }
}

/// Following, braking and acceleration thresholds in frame units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivingThresholds {
    /// Cross-axis distance under which two agents share a lane
    pub lane_tolerance: f32,
    /// Gap under which a follower stops
    pub stop_gap: f32,
    /// Gap under which a follower slows to `caution_factor` of its cruise speed
    pub caution_gap: f32,
    pub caution_factor: f32,
    /// Distance to a stop line at which braking starts
    pub braking_distance: f32,
    /// Distance to a stop line at which the target speed is forced to zero
    pub stop_clamp: f32,
    /// Target speed near a stop line is `distance / braking_ramp`
    pub braking_ramp: f32,
    /// Speed gained per tick
    pub acceleration: f32,
    /// Speed shed per tick
    pub deceleration: f32,
}

impl Default for DrivingThresholds {
    fn default() -> Self {
        Self {
            lane_tolerance: 20.0,
            stop_gap: 40.0,
            caution_gap: 80.0,
            caution_factor: 0.5,
            braking_distance: 150.0,
            stop_clamp: 5.0,
            braking_ramp: 10.0,
            acceleration: 0.3,
            deceleration: 0.5,
        }
    }
}

impl DrivingThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("lane_tolerance", self.lane_tolerance),
            ("braking_ramp", self.braking_ramp),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("{} must be positive", value),
                });
            }
        }
        if !(0.0 <= self.stop_gap && self.stop_gap <= self.caution_gap) {
            return Err(ConfigError::InvalidParameter {
                name: "stop_gap",
                reason: format!(
                    "expected 0 <= stop_gap ({}) <= caution_gap ({})",
                    self.stop_gap, self.caution_gap
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.caution_factor) {
            return Err(ConfigError::InvalidParameter {
                name: "caution_factor",
                reason: format!("{} is outside 0..1", self.caution_factor),
            });
        }
        if !(self.stop_clamp < self.braking_distance) {
            return Err(ConfigError::InvalidParameter {
                name: "stop_clamp",
                reason: format!(
                    "{} must be below braking_distance {}",
                    self.stop_clamp, self.braking_distance
                ),
            });
        }
        Ok(())
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub frame: FrameConfig,
    pub road: RoadGeometry,
    pub spawn: SpawnConfig,
    pub driving: DrivingThresholds,
    /// Occupancy bands; derived from the road strips when absent
    pub bands: Option<DetectionBands>,
    /// Signal is recomputed every this many ticks
    pub decision_interval: u64,
    /// Agents further than this outside the frame are removed
    pub cull_margin: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            road: RoadGeometry::default(),
            spawn: SpawnConfig::default(),
            driving: DrivingThresholds::default(),
            bands: None,
            decision_interval: 10,
            cull_margin: 150.0,
        }
    }
}

impl SimConfig {
    /// Load a YAML configuration file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SimConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.road.validate(&self.frame)?;
        self.spawn.validate()?;
        self.driving.validate()?;
        if self.frame.fps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "fps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.decision_interval == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "decision_interval",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.cull_margin >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "cull_margin",
                reason: format!("{} is negative", self.cull_margin),
            });
        }
        if let Some(bands) = &self.bands {
            bands.validate()?;
        }
        Ok(())
    }

    /// Bands used for counting, falling back to the road strips
    pub fn detection_bands(&self) -> DetectionBands {
        self.bands
            .unwrap_or_else(|| DetectionBands::from_road(&self.road, &self.frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_stop_lines_sit_outside_the_junction() {
        let road = RoadGeometry::default();
        assert_eq!(road.stop_line(Direction::Right), 500.0);
        assert_eq!(road.stop_line(Direction::Left), 780.0);
        assert_eq!(road.stop_line(Direction::Down), 220.0);
        assert_eq!(road.stop_line(Direction::Up), 500.0);
    }

    #[test]
    fn zero_width_road_is_rejected() {
        let mut config = SimConfig::default();
        config.road.vertical_right = config.road.vertical_left;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn road_outside_frame_is_rejected() {
        let mut config = SimConfig::default();
        config.road.horizontal_bottom = config.frame.height + 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn stop_line_past_frame_edge_is_rejected() {
        let mut config = SimConfig::default();
        config.road.stop_margin = 600.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn zero_decision_interval_is_rejected() {
        let config = SimConfig {
            decision_interval: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "decision_interval",
                ..
            })
        ));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "decision_interval: 5\ndriving:\n  acceleration: 0.4\n";
        let config: SimConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.decision_interval, 5);
        assert_eq!(config.driving.acceleration, 0.4);
        assert_eq!(config.driving.deceleration, 0.5);
        assert_eq!(config.road, RoadGeometry::default());
    }
}
