//! Run statistics collected by the tick loop

use log::info;

use super::signal::{SignalState, SignalUpdate};
use super::spawner::Stream;

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub ticks: u64,
    pub spawned_horizontal: u64,
    pub spawned_vertical: u64,
    pub spawned_emergency: u64,
    pub rejected_spawns: u64,
    /// Agents culled after leaving the frame
    pub exited: u64,
    pub decisions: u64,
    /// Decisions whose resolved green road differed from the previous one
    pub signal_switches: u64,
    pub emergency_decisions: u64,
    pub peak_agents: usize,
}

impl SimulationStats {
    pub fn total_spawned(&self) -> u64 {
        self.spawned_horizontal + self.spawned_vertical + self.spawned_emergency
    }

    pub(crate) fn record_spawn(&mut self, stream: Stream) {
        match stream {
            Stream::Horizontal => self.spawned_horizontal += 1,
            Stream::Vertical => self.spawned_vertical += 1,
            Stream::Emergency => self.spawned_emergency += 1,
        }
    }

    pub(crate) fn record_decision(&mut self, update: &SignalUpdate, switched: bool) {
        self.decisions += 1;
        if update.state == SignalState::Emergency {
            self.emergency_decisions += 1;
        }
        if switched {
            self.signal_switches += 1;
        }
    }

    /// Log the end-of-run block
    pub fn log_summary(&self, active_agents: usize, tick_secs: f32) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks: {}", self.ticks);
        info!("Simulated time: {:.2}s", self.ticks as f32 * tick_secs);
        info!("Total vehicles spawned: {}", self.total_spawned());
        info!(
            "Spawned per stream: horizontal={} vertical={} emergency={}",
            self.spawned_horizontal, self.spawned_vertical, self.spawned_emergency
        );
        info!("Rejected spawns: {}", self.rejected_spawns);
        info!("Vehicles exited: {}", self.exited);
        info!("Active vehicles: {}", active_agents);
        info!("Peak vehicles: {}", self.peak_agents);
        info!("Signal decisions: {}", self.decisions);
        info!("Signal switches: {}", self.signal_switches);
        info!("Emergency decisions: {}", self.emergency_decisions);
    }
}
