//! Sealed trace types.
//!
//! `SealedRecord` wraps a completed `ToolCallRecord` with the SHA-256 digests
//! that link it into a chain. `SealedTrace` is the audit export of a whole
//! trace, produced by `TraceRecorder::seal()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use groundcheck_contracts::trace::{CallTrace, ResponseId, ToolCallRecord};

/// One tool call committed into the hash chain.
///
/// Modifying any field of `record` invalidates `digest` and every later
/// `prev_digest`, which `verify_chain` detects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedRecord {
    /// Position in the chain; equal to `record.sequence`.
    pub sequence: u64,
    pub record: ToolCallRecord,
    /// Digest (hex) of the previous entry, or `GENESIS_DIGEST` for the first.
    pub prev_digest: String,
    /// Digest (hex) over (response_id, sequence, prev_digest, canonical JSON of record).
    pub digest: String,
}

impl SealedRecord {
    /// The sentinel `prev_digest` of the first entry: 64 hex zeros.
    pub const GENESIS_DIGEST: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// The tamper-evident audit export of one response's trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedTrace {
    pub response_id: ResponseId,
    /// Every record in call order.
    pub records: Vec<SealedRecord>,
    /// Wall-clock time (UTC) the trace was sealed.
    pub sealed_at: DateTime<Utc>,
    /// Digest of the last entry; empty for an empty trace.
    pub terminal_digest: String,
}

impl SealedTrace {
    /// The plain trace the seal commits to.
    pub fn to_trace(&self) -> CallTrace {
        CallTrace {
            response_id: self.response_id,
            records: self.records.iter().map(|s| s.record.clone()).collect(),
        }
    }
}
