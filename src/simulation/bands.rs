//! Occupancy bands used to count queued traffic per road
//!
//! Bands are stored as fractions of the frame so the same geometry can be
//! applied to simulated agents and to boxes coming out of a video detector.

use serde::{Deserialize, Serialize};

use super::config::{FrameConfig, RoadGeometry};
use super::error::ConfigError;
use super::types::{Axis, Rect};

/// Open interval `lo..hi` expressed as a fraction of a frame dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub lo: f32,
    pub hi: f32,
}

impl BandRange {
    pub fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    /// Strict membership of `value` measured against a frame dimension of `extent`
    fn contains(&self, value: f32, extent: f32) -> bool {
        self.lo * extent < value && value < self.hi * extent
    }
}

/// The horizontal band spans the full frame width between two y fractions;
/// the vertical band spans the full height between two x fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionBands {
    pub horizontal: BandRange,
    pub vertical: BandRange,
}

/// Per-road occupancy counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficCounts {
    pub horizontal: usize,
    pub vertical: usize,
}

impl TrafficCounts {
    pub fn total(&self) -> usize {
        self.horizontal + self.vertical
    }
}

impl DetectionBands {
    /// Central band used on live camera footage
    pub fn centered(lo: f32, hi: f32) -> Self {
        Self {
            horizontal: BandRange::new(lo, hi),
            vertical: BandRange::new(lo, hi),
        }
    }

    /// Bands matching the two road strips of a simulated junction
    pub fn from_road(road: &RoadGeometry, frame: &FrameConfig) -> Self {
        Self {
            horizontal: BandRange::new(
                road.horizontal_top / frame.height,
                road.horizontal_bottom / frame.height,
            ),
            vertical: BandRange::new(
                road.vertical_left / frame.width,
                road.vertical_right / frame.width,
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, band) in [("horizontal", self.horizontal), ("vertical", self.vertical)] {
            if !(0.0 <= band.lo && band.lo < band.hi && band.hi <= 1.0) {
                return Err(ConfigError::InvalidBands(format!(
                    "{} band {}..{} must be a non-empty range inside 0..1",
                    name, band.lo, band.hi
                )));
            }
        }
        Ok(())
    }

    /// Which band a rectangle is counted in, judged by its center only.
    ///
    /// A center inside both bands (the junction square) counts as horizontal.
    pub fn classify(&self, rect: &Rect, width: f32, height: f32) -> Option<Axis> {
        let center = rect.center();
        if self.horizontal.contains(center.y, height) {
            Some(Axis::Horizontal)
        } else if self.vertical.contains(center.x, width) {
            Some(Axis::Vertical)
        } else {
            None
        }
    }

    /// Count rectangles per band
    pub fn count<I>(&self, rects: I, width: f32, height: f32) -> TrafficCounts
    where
        I: IntoIterator<Item = Rect>,
    {
        let mut counts = TrafficCounts::default();
        for rect in rects {
            match self.classify(&rect, width, height) {
                Some(Axis::Horizontal) => counts.horizontal += 1,
                Some(Axis::Vertical) => counts.vertical += 1,
                None => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f32 = 1000.0;
    const H: f32 = 1000.0;

    #[test]
    fn counts_by_center_not_origin() {
        let bands = DetectionBands::centered(0.35, 0.65);
        // Origin outside the band, center inside it
        let rect = Rect::new(10.0, 300.0, 40.0, 200.0);
        assert_eq!(bands.classify(&rect, W, H), Some(Axis::Horizontal));
    }

    #[test]
    fn junction_square_counts_as_horizontal() {
        let bands = DetectionBands::centered(0.35, 0.65);
        let rect = Rect::new(490.0, 490.0, 20.0, 20.0);
        assert_eq!(bands.classify(&rect, W, H), Some(Axis::Horizontal));
    }

    #[test]
    fn band_edges_are_exclusive() {
        let bands = DetectionBands::centered(0.25, 0.75);
        // Center y exactly on the lower edge, x outside the vertical band
        let rect = Rect::new(0.0, 240.0, 20.0, 20.0);
        assert_eq!(bands.classify(&rect, W, H), None);
    }

    #[test]
    fn count_splits_bands() {
        let bands = DetectionBands::centered(0.35, 0.65);
        let rects = vec![
            Rect::new(100.0, 480.0, 40.0, 20.0),
            Rect::new(800.0, 490.0, 40.0, 20.0),
            Rect::new(490.0, 100.0, 20.0, 40.0),
            Rect::new(100.0, 100.0, 20.0, 40.0),
        ];
        let counts = bands.count(rects, W, H);
        assert_eq!(counts, TrafficCounts { horizontal: 2, vertical: 1 });
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn inverted_band_is_invalid() {
        let bands = DetectionBands::centered(0.6, 0.4);
        assert!(matches!(bands.validate(), Err(ConfigError::InvalidBands(_))));
    }

    #[test]
    fn road_bands_follow_the_strips() {
        let bands = DetectionBands::from_road(&RoadGeometry::default(), &FrameConfig::default());
        // Middle of the eastbound lane
        let car = Rect::new(100.0, 400.0, 50.0, 30.0);
        assert_eq!(bands.classify(&car, 1280.0, 720.0), Some(Axis::Horizontal));
        // Southbound car above the junction
        let car = Rect::new(600.0, 50.0, 30.0, 50.0);
        assert_eq!(bands.classify(&car, 1280.0, 720.0), Some(Axis::Vertical));
    }
}
