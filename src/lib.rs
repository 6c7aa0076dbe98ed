//! Junction Simulation Library
//!
//! A four-way junction whose signal follows the longer queue and yields to
//! ambulances. Runs headless or with a Bevy UI.

pub mod alerts;
pub mod detection;
pub mod render;
pub mod simulation;

#[cfg(feature = "ui")]
pub mod ui;
