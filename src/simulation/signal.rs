//! Signal decision policy
//!
//! The decision is memoryless: every call looks only at the counts it is given.
//! Debouncing announcements is the consumer's job (see `crate::alerts`).

use std::fmt;

use super::bands::TrafficCounts;
use super::types::{Axis, Direction, VehicleKind};

/// Decided signal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalState {
    #[default]
    Horizontal,
    Vertical,
    /// Priority vehicle present, overrides the queue comparison
    Emergency,
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalState::Horizontal => write!(f, "Horizontal"),
            SignalState::Vertical => write!(f, "Vertical"),
            SignalState::Emergency => write!(f, "Emergency"),
        }
    }
}

/// Pick the right-of-way from queue counts.
///
/// Ties go to the horizontal road.
pub fn decide(count_horizontal: usize, count_vertical: usize, ambulance_present: bool) -> SignalState {
    if ambulance_present {
        SignalState::Emergency
    } else if count_horizontal >= count_vertical {
        SignalState::Horizontal
    } else {
        SignalState::Vertical
    }
}

/// Axis that gets green while an ambulance is travelling in `direction`
pub fn emergency_axis(direction: Option<Direction>) -> Axis {
    direction.map(Direction::axis).unwrap_or(Axis::Horizontal)
}

/// What the braking logic needs to know about the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalPhase {
    pub state: SignalState,
    /// Road whose traffic may cross the stop line
    pub green: Axis,
}

impl SignalPhase {
    /// Resolve a decided state into a phase, using the ambulance heading for
    /// the emergency case
    pub fn resolve(state: SignalState, ambulance_direction: Option<Direction>) -> Self {
        let green = match state {
            SignalState::Horizontal => Axis::Horizontal,
            SignalState::Vertical => Axis::Vertical,
            SignalState::Emergency => emergency_axis(ambulance_direction),
        };
        Self { state, green }
    }

    /// Whether an agent of `kind` heading in `direction` may proceed
    pub fn has_right_of_way(&self, kind: VehicleKind, direction: Direction) -> bool {
        if kind.is_ambulance() {
            return self.state == SignalState::Emergency;
        }
        direction.axis() == self.green
    }
}

/// Coarse congestion rating over the total queued vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Congestion {
    Low,
    Medium,
    High,
}

impl fmt::Display for Congestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Congestion::Low => write!(f, "Low"),
            Congestion::Medium => write!(f, "Medium"),
            Congestion::High => write!(f, "High"),
        }
    }
}

pub fn congestion_level(total: usize) -> Congestion {
    if total > 25 {
        Congestion::High
    } else if total > 10 {
        Congestion::Medium
    } else {
        Congestion::Low
    }
}

/// One signal decision, as handed to UI and audio consumers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalUpdate {
    pub tick: u64,
    pub state: SignalState,
    pub phase: SignalPhase,
    pub counts: TrafficCounts,
    pub ambulance_present: bool,
    pub ambulance_direction: Option<Direction>,
}

impl SignalUpdate {
    /// Decide and resolve in one step
    pub fn assess(
        tick: u64,
        counts: TrafficCounts,
        ambulance_present: bool,
        ambulance_direction: Option<Direction>,
    ) -> Self {
        let state = decide(counts.horizontal, counts.vertical, ambulance_present);
        Self {
            tick,
            state,
            phase: SignalPhase::resolve(state, ambulance_direction),
            counts,
            ambulance_present,
            ambulance_direction,
        }
    }

    pub fn congestion(&self) -> Congestion {
        congestion_level(self.counts.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn larger_queue_wins() {
        assert_eq!(decide(3, 7, false), SignalState::Vertical);
        assert_eq!(decide(7, 3, false), SignalState::Horizontal);
    }

    #[test]
    fn tie_goes_horizontal() {
        assert_eq!(decide(5, 5, false), SignalState::Horizontal);
        assert_eq!(decide(0, 0, false), SignalState::Horizontal);
    }

    #[test]
    fn ambulance_overrides_counts() {
        for (h, v) in [(0, 0), (10, 0), (0, 10), (4, 4)] {
            assert_eq!(decide(h, v, true), SignalState::Emergency);
        }
    }

    #[test]
    fn decision_matches_comparison_over_a_grid() {
        for h in 0..30 {
            for v in 0..30 {
                let expected = if h >= v {
                    SignalState::Horizontal
                } else {
                    SignalState::Vertical
                };
                assert_eq!(decide(h, v, false), expected);
            }
        }
    }

    #[test]
    fn emergency_axis_follows_ambulance() {
        assert_eq!(emergency_axis(Some(Direction::Left)), Axis::Horizontal);
        assert_eq!(emergency_axis(Some(Direction::Up)), Axis::Vertical);
        assert_eq!(emergency_axis(None), Axis::Horizontal);
    }

    #[test]
    fn right_of_way_under_emergency() {
        let phase = SignalPhase::resolve(SignalState::Emergency, Some(Direction::Down));
        assert!(phase.has_right_of_way(VehicleKind::Ambulance, Direction::Left));
        assert!(phase.has_right_of_way(VehicleKind::Bus, Direction::Up));
        assert!(!phase.has_right_of_way(VehicleKind::Car, Direction::Right));
    }

    #[test]
    fn ambulance_needs_emergency_state_for_right_of_way() {
        let phase = SignalPhase::resolve(SignalState::Horizontal, None);
        assert!(!phase.has_right_of_way(VehicleKind::Ambulance, Direction::Right));
        assert!(phase.has_right_of_way(VehicleKind::Car, Direction::Right));
    }

    #[test]
    fn congestion_thresholds() {
        assert_eq!(congestion_level(10), Congestion::Low);
        assert_eq!(congestion_level(11), Congestion::Medium);
        assert_eq!(congestion_level(25), Congestion::Medium);
        assert_eq!(congestion_level(26), Congestion::High);
    }
}
