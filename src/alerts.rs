//! Spoken alerts driven by signal decisions
//!
//! `Announcer` turns a stream of `SignalUpdate`s into the few events worth
//! saying out loud; `AlertWorker` speaks them on a background thread so the
//! tick loop never waits on audio.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::simulation::{SignalState, SignalUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Minimum quiet time before a priority shift is spoken
    pub min_repeat_secs: f64,
    /// Alerts waiting for the speaker before new ones are dropped
    pub queue_capacity: usize,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            min_repeat_secs: 8.0,
            queue_capacity: 4,
        }
    }
}

/// Memory carried between decisions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnouncerState {
    pub last_signal: SignalState,
    pub emergency_active: bool,
    /// Time of the last spoken alert, in seconds
    pub last_voice_at: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Announcement {
    EmergencyStarted,
    EmergencyCleared,
    PriorityShift {
        to: SignalState,
        horizontal: usize,
        vertical: usize,
    },
}

impl Announcement {
    pub fn phrase(&self) -> String {
        match self {
            Announcement::EmergencyStarted => {
                "Emergency vehicle detected. Priority given to ambulance lane.".to_string()
            }
            Announcement::EmergencyCleared => {
                "Emergency vehicle passed. Reverting to normal traffic flow.".to_string()
            }
            Announcement::PriorityShift { to, .. } => {
                format!("Volume increased in {} lane. Switching priority.", to)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Announcer {
    config: AnnouncerConfig,
}

impl Announcer {
    pub fn new(config: AnnouncerConfig) -> Self {
        Self { config }
    }

    fn quiet_for(&self, state: &AnnouncerState, now_secs: f64) -> bool {
        state
            .last_voice_at
            .is_none_or(|at| now_secs - at > self.config.min_repeat_secs)
    }

    /// Fold one decision into `state`, returning what to say if anything.
    ///
    /// Emergency transitions are always spoken. Queue-driven switches update
    /// `last_signal` every time but are only spoken after a quiet period.
    pub fn observe(
        &self,
        state: &mut AnnouncerState,
        update: &SignalUpdate,
        now_secs: f64,
    ) -> Option<Announcement> {
        if update.ambulance_present {
            if state.emergency_active {
                return None;
            }
            state.emergency_active = true;
            state.last_voice_at = Some(now_secs);
            return Some(Announcement::EmergencyStarted);
        }

        let mut spoken = None;
        if state.emergency_active {
            state.emergency_active = false;
            state.last_voice_at = Some(now_secs);
            spoken = Some(Announcement::EmergencyCleared);
        }

        if update.state != state.last_signal {
            state.last_signal = update.state;
            if spoken.is_none() && self.quiet_for(state, now_secs) {
                state.last_voice_at = Some(now_secs);
                spoken = Some(Announcement::PriorityShift {
                    to: update.state,
                    horizontal: update.counts.horizontal,
                    vertical: update.counts.vertical,
                });
            }
        }
        spoken
    }
}

/// Something that can say a phrase
pub trait AlertSink {
    fn speak(&mut self, phrase: &str) -> Result<()>;
}

/// Writes alerts to the log instead of a speaker
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn speak(&mut self, phrase: &str) -> Result<()> {
        info!("ALERT: {}", phrase);
        Ok(())
    }
}

/// Background speaker fed through a bounded queue
pub struct AlertWorker {
    sender: Option<SyncSender<String>>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    dropped: u64,
}

impl AlertWorker {
    pub fn spawn<S>(mut sink: S, capacity: usize) -> Result<Self>
    where
        S: AlertSink + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel::<String>(capacity.max(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let worker = thread::Builder::new()
            .name("alert-worker".to_string())
            .spawn(move || {
                while let Ok(phrase) = receiver.recv() {
                    if flag.load(Ordering::SeqCst) {
                        continue;
                    }
                    if let Err(err) = sink.speak(&phrase) {
                        warn!("Alert sink failed: {:#}", err);
                    }
                }
            })
            .context("Failed to start alert worker")?;

        Ok(Self {
            sender: Some(sender),
            cancelled,
            worker: Some(worker),
            dropped: 0,
        })
    }

    /// Queue an announcement. Returns false when it was dropped.
    pub fn submit(&mut self, announcement: &Announcement) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(announcement.phrase()) {
            Ok(()) => true,
            Err(TrySendError::Full(phrase)) => {
                self.dropped += 1;
                warn!("Alert queue full, dropping: {}", phrase);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                warn!("Alert worker has stopped");
                false
            }
        }
    }

    /// Alerts dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Cancel pending alerts and wait for the worker to exit
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("Alert worker panicked"))?;
        }
        Ok(())
    }
}

impl Drop for AlertWorker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
