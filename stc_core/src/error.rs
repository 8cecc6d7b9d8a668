//! Error types for the space-time cube core.

use thiserror::Error;

/// Errors returned by the match-log query layer.
///
/// The query layer never substitutes defaults: a bad player id or step
/// range is reported to the caller instead of being clamped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// Player id outside the fixed roster of four agents
    #[error("player id {player} is outside the valid range 0..=3")]
    PlayerOutOfRange { player: usize },

    /// Step index past the end of the recorded log
    #[error("step {step} is out of bounds for a log of {len} steps")]
    StepOutOfRange { step: usize, len: usize },

    /// Step range with `from > to` or a bound past the end of the log
    #[error("invalid step range {from}..={to} for a log of {len} steps")]
    InvalidRange { from: usize, to: usize, len: usize },
}

/// Errors that can occur while loading a recorded match log.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the log file failed
    #[error("failed to read match log: {0}")]
    Io(#[from] std::io::Error),

    /// The log is not valid JSON or does not match the record layout
    #[error("failed to parse match log: {0}")]
    Json(#[from] serde_json::Error),

    /// A log with zero recorded steps has no step 0 to query
    #[error("match log contains no steps")]
    EmptyLog,

    /// Every step must carry the full roster of four agents
    #[error("step {step} has {count} agents, expected 4")]
    WrongAgentCount { step: usize, count: usize },
}

/// Errors returned when configuring a mesh builder.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// A tube cross-section needs at least a triangle
    #[error("tube cross-section needs at least 3 sides, got {sides}")]
    CrossSectionTooSmall { sides: usize },

    /// A tube with zero or negative radius has no surface
    #[error("tube radius must be positive, got {radius}")]
    NonPositiveRadius { radius: f32 },
}
