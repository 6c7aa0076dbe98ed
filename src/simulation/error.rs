//! Configuration errors
//!
//! Everything that can go wrong with the simulation inputs is rejected when the
//! configuration is built, never in the middle of a tick.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A road, frame or stop-line region collapses to zero area or leaves the frame
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Detection band fractions outside 0..1 or empty
    #[error("invalid detection band: {0}")]
    InvalidBands(String),

    /// A tunable that must be positive or ordered is not
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
