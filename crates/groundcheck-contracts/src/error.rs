//! Error types for the groundcheck engine.
//!
//! Errors are reserved for misuse of an operation: an unregistered tool, a
//! payload that cannot be decoded, an unparsable timestamp. Data that merely
//! looks bad (a stale quote, a zero reference price, an empty answer) is
//! never an error; it becomes a `ValidationFinding`.

use thiserror::Error;

/// The unified error type for the groundcheck crates.
#[derive(Debug, Error)]
pub enum GroundcheckError {
    /// The tool layer reported a tool outside the closed set of known tools.
    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },

    /// A time value could not be parsed as an absolute point in time.
    #[error("malformed timestamp '{value}': {reason}")]
    MalformedTimestamp { value: String, reason: String },

    /// A known tool returned a payload that does not match its response shape.
    #[error("malformed response for tool '{tool}': {reason}")]
    MalformedResponse { tool: String, reason: String },

    /// `finalize` referenced a record id the recorder never issued.
    #[error("unknown trace record {id}")]
    UnknownRecord { id: u64 },

    /// `finalize` was called twice for the same record.
    #[error("trace record {id} is already completed")]
    AlreadyCompleted { id: u64 },

    /// The completion time is not a valid end for the record.
    #[error("invalid completion for trace record {id}: {reason}")]
    InvalidCompletion { id: u64, reason: String },

    /// The trace recorder could not append or read its state.
    #[error("trace write failed: {reason}")]
    TraceWriteFailed { reason: String },

    /// The production monitor could not fold a report into its metrics.
    #[error("monitor write failed: {reason}")]
    MonitorWriteFailed { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the groundcheck crates.
pub type GroundcheckResult<T> = Result<T, GroundcheckError>;
