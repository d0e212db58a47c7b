//! Seam traits for the groundcheck pipeline.
//!
//! - `Scanner`: inspects an answer for hallucination fingerprints
//! - `ReportSink`: receives every finished report (the production monitor)
//!
//! The orchestrator depends only on these traits, so scans and sinks can be
//! swapped or mocked without touching the validation algorithm.

use groundcheck_contracts::{
    error::GroundcheckResult,
    finding::{ValidationFinding, ValidationReport},
    trace::CallTrace,
};

use crate::claims::PriceClaim;

/// A hallucination scan over one agent answer.
///
/// Implementations must be pure with respect to their inputs: the same
/// answer, claims and trace always produce the same findings, in the same
/// order. Scans report failures only; a clean answer yields an empty vector.
pub trait Scanner: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// Scan `answer` and its pre-extracted price `claims` against `trace`.
    fn scan(&self, answer: &str, claims: &[PriceClaim], trace: &CallTrace) -> Vec<ValidationFinding>;
}

/// A consumer of finished validation reports.
///
/// Implementations hold long-lived shared state and must serialize
/// concurrent `ingest` calls themselves.
pub trait ReportSink: Send + Sync {
    /// Fold one report into the sink's state.
    fn ingest(&self, report: &ValidationReport) -> GroundcheckResult<()>;
}
