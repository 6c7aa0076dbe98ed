//! Detection boundary
//!
//! Anything that produces labelled boxes (a camera pipeline or the simulation
//! itself) is counted through the same bands and decided by the same policy.

use std::fmt;

use crate::simulation::{
    DetectionBands, Rect, SignalUpdate, TrafficCounts, VehicleAgent, VehicleKind,
};

/// Coarse class attached to a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionLabel {
    Motorcycle,
    Car,
    Truck,
    Bus,
    Ambulance,
}

impl DetectionLabel {
    /// Classify a motion blob by its contour area in pixels.
    ///
    /// Blobs under 800 px are noise. Ambulances cannot be told apart by size.
    pub fn from_contour_area(area: f32) -> Option<Self> {
        if !area.is_finite() || area < 800.0 {
            None
        } else if area < 2000.0 {
            Some(DetectionLabel::Motorcycle)
        } else if area < 6000.0 {
            Some(DetectionLabel::Car)
        } else if area < 12000.0 {
            Some(DetectionLabel::Truck)
        } else {
            Some(DetectionLabel::Bus)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionLabel::Motorcycle => "motorcycle",
            DetectionLabel::Car => "car",
            DetectionLabel::Truck => "truck",
            DetectionLabel::Bus => "bus",
            DetectionLabel::Ambulance => "ambulance",
        }
    }
}

impl fmt::Display for DetectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VehicleKind> for DetectionLabel {
    fn from(kind: VehicleKind) -> Self {
        match kind {
            VehicleKind::Motorcycle => DetectionLabel::Motorcycle,
            // Autos are car-sized blobs
            VehicleKind::Car | VehicleKind::Auto => DetectionLabel::Car,
            VehicleKind::Bus => DetectionLabel::Bus,
            VehicleKind::Truck => DetectionLabel::Truck,
            VehicleKind::Ambulance => DetectionLabel::Ambulance,
        }
    }
}

/// Axis-aligned box in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl BoundingBox {
    /// Returns `None` for negative or non-finite extents
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Option<Self> {
        let finite = x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite();
        if !finite || w < 0.0 || h < 0.0 {
            return None;
        }
        Some(Self { x, y, w, h })
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedObject {
    pub label: DetectionLabel,
    pub bbox: BoundingBox,
}

/// Source of detections for one frame
pub trait Detector {
    type Frame: ?Sized;

    fn detect(&mut self, frame: &Self::Frame) -> Vec<DetectedObject>;
}

/// Reports every simulated agent exactly where it is
#[derive(Debug, Default)]
pub struct GroundTruthDetector {
    /// Agents skipped because their box was malformed
    pub dropped: usize,
}

impl Detector for GroundTruthDetector {
    type Frame = [VehicleAgent];

    fn detect(&mut self, agents: &[VehicleAgent]) -> Vec<DetectedObject> {
        let mut objects = Vec::with_capacity(agents.len());
        for agent in agents {
            let rect = agent.bounding_rect();
            match BoundingBox::new(rect.x, rect.y, rect.w, rect.h) {
                Some(bbox) => objects.push(DetectedObject {
                    label: agent.kind().into(),
                    bbox,
                }),
                None => self.dropped += 1,
            }
        }
        objects
    }
}

/// Count detections per band and decide the signal.
///
/// Detections carry no heading, so an emergency resolves to the horizontal
/// road.
pub fn assess_detections(
    tick: u64,
    objects: &[DetectedObject],
    bands: &DetectionBands,
    width: f32,
    height: f32,
) -> SignalUpdate {
    let counts: TrafficCounts =
        bands.count(objects.iter().map(|object| object.bbox.rect()), width, height);
    let ambulance_present = objects
        .iter()
        .any(|object| object.label == DetectionLabel::Ambulance);
    SignalUpdate::assess(tick, counts, ambulance_present, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{
        survey, AgentId, Axis, Direction, FrameConfig, Position, RoadGeometry, SignalState,
    };

    #[test]
    fn contour_area_thresholds() {
        assert_eq!(DetectionLabel::from_contour_area(799.0), None);
        assert_eq!(DetectionLabel::from_contour_area(800.0), Some(DetectionLabel::Motorcycle));
        assert_eq!(DetectionLabel::from_contour_area(1999.0), Some(DetectionLabel::Motorcycle));
        assert_eq!(DetectionLabel::from_contour_area(2000.0), Some(DetectionLabel::Car));
        assert_eq!(DetectionLabel::from_contour_area(6000.0), Some(DetectionLabel::Truck));
        assert_eq!(DetectionLabel::from_contour_area(12000.0), Some(DetectionLabel::Bus));
        assert_eq!(DetectionLabel::from_contour_area(f32::NAN), None);
    }

    #[test]
    fn malformed_boxes_are_rejected() {
        assert!(BoundingBox::new(0.0, 0.0, -1.0, 10.0).is_none());
        assert!(BoundingBox::new(0.0, 0.0, 10.0, f32::INFINITY).is_none());
        assert!(BoundingBox::new(f32::NAN, 0.0, 10.0, 10.0).is_none());
        assert!(BoundingBox::new(-50.0, -50.0, 0.0, 0.0).is_some());
    }

    #[test]
    fn live_bands_count_center_of_frame() {
        let bands = DetectionBands::centered(0.35, 0.65);
        let boxed = |x, y, w, h| DetectedObject {
            label: DetectionLabel::Car,
            bbox: BoundingBox::new(x, y, w, h).unwrap(),
        };
        // 960x540 camera frame: horizontal band y 189..351, vertical x 336..624
        let objects = vec![
            boxed(50.0, 250.0, 60.0, 40.0),
            boxed(800.0, 260.0, 60.0, 40.0),
            boxed(450.0, 40.0, 40.0, 60.0),
        ];
        let update = assess_detections(0, &objects, &bands, 960.0, 540.0);
        assert_eq!(update.counts, TrafficCounts { horizontal: 2, vertical: 1 });
        assert_eq!(update.state, SignalState::Horizontal);
    }

    #[test]
    fn ambulance_detection_forces_emergency_on_the_horizontal_road() {
        let bands = DetectionBands::centered(0.35, 0.65);
        let objects = vec![DetectedObject {
            label: DetectionLabel::Ambulance,
            bbox: BoundingBox::new(450.0, 40.0, 40.0, 60.0).unwrap(),
        }];
        let update = assess_detections(3, &objects, &bands, 960.0, 540.0);
        assert_eq!(update.state, SignalState::Emergency);
        assert!(update.ambulance_present);
        assert_eq!(update.phase.green, Axis::Horizontal);
    }

    #[test]
    fn counts_match_between_agents_and_ground_truth_detections() {
        let frame = FrameConfig::default();
        let bands = DetectionBands::from_road(&RoadGeometry::default(), &frame);
        let agents = vec![
            VehicleAgent::new(AgentId(0), VehicleKind::Car, Direction::Right, Position::new(100.0, 400.0), 7.0),
            VehicleAgent::new(AgentId(1), VehicleKind::Auto, Direction::Left, Position::new(900.0, 260.0), 6.0),
            VehicleAgent::new(AgentId(2), VehicleKind::Bus, Direction::Down, Position::new(580.0, 20.0), 4.5),
            VehicleAgent::new(AgentId(3), VehicleKind::Truck, Direction::Up, Position::new(700.0, 600.0), 3.5),
            VehicleAgent::new(AgentId(4), VehicleKind::Motorcycle, Direction::Down, Position::new(100.0, 20.0), 8.0),
        ];

        let (expected, _) = survey(&agents, &bands, &frame);
        let mut detector = GroundTruthDetector::default();
        let objects = detector.detect(&agents);
        let update = assess_detections(0, &objects, &bands, frame.width, frame.height);

        assert_eq!(detector.dropped, 0);
        assert_eq!(objects.len(), agents.len());
        assert_eq!(update.counts, expected);
        assert_eq!(objects[1].label, DetectionLabel::Car);
    }
}
