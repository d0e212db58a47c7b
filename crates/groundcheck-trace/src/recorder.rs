//! The call trace recorder.
//!
//! `TraceRecorder` captures every tool call made while one answer is being
//! produced. Concurrent tool tasks share one recorder (it is cheaply
//! cloneable) and append through a single mutex, so the sequence counter
//! fixes the call order without gaps or duplicates.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use groundcheck_contracts::{
    error::{GroundcheckError, GroundcheckResult},
    tool::{ToolName, ToolResponse},
    trace::{CallTrace, Parameters, RecordId, ResponseId, ToolCallRecord},
};

use crate::{
    chain::hash_record,
    sealed::{SealedRecord, SealedTrace},
};

/// The mutable interior of a `TraceRecorder`.
pub(crate) struct TraceState {
    /// Records in append order; index equals sequence.
    pub(crate) records: Vec<ToolCallRecord>,
    /// The next sequence number to assign (starts at 0).
    pub(crate) next_sequence: u64,
}

/// Append-only recorder for the tool calls of one agent response.
///
/// # Thread safety
///
/// Clones share the same `Arc<Mutex<TraceState>>`. `record` and `finalize`
/// each hold the lock for the whole update, so appends are atomic.
#[derive(Clone)]
pub struct TraceRecorder {
    response_id: ResponseId,
    pub(crate) state: Arc<Mutex<TraceState>>,
}

impl TraceRecorder {
    /// Create an empty recorder for `response_id`.
    pub fn new(response_id: ResponseId) -> Self {
        Self {
            response_id,
            state: Arc::new(Mutex::new(TraceState {
                records: Vec::new(),
                next_sequence: 0,
            })),
        }
    }

    pub fn response_id(&self) -> ResponseId {
        self.response_id
    }

    /// Record a tool call reported by name with a raw JSON payload.
    ///
    /// # Errors
    ///
    /// - `UnknownTool` if `tool_name` is outside the known tool set
    /// - `MalformedResponse` if `response` does not decode for that tool
    /// - `TraceWriteFailed` if the recorder state is poisoned
    pub fn record(
        &self,
        tool_name: &str,
        parameters: Parameters,
        response: serde_json::Value,
        issued_at: DateTime<Utc>,
    ) -> GroundcheckResult<RecordId> {
        let tool: ToolName = tool_name.parse().map_err(|e| {
            warn!(response_id = %self.response_id.0, tool = tool_name, "rejected unknown tool");
            e
        })?;
        let response = ToolResponse::from_payload(tool, response).map_err(|e| {
            warn!(response_id = %self.response_id.0, tool = %tool, error = %e, "rejected malformed payload");
            e
        })?;
        self.record_typed(response, parameters, issued_at)
    }

    /// Record a tool call whose response is already typed.
    pub fn record_typed(
        &self,
        response: ToolResponse,
        parameters: Parameters,
        issued_at: DateTime<Utc>,
    ) -> GroundcheckResult<RecordId> {
        let mut state = self.lock_for_write()?;

        let sequence = state.next_sequence;
        let id = RecordId(sequence);
        let tool_name = response.tool();
        state.records.push(ToolCallRecord {
            id,
            sequence,
            tool_name,
            parameters,
            response,
            issued_at,
            completed_at: None,
        });
        state.next_sequence += 1;

        debug!(
            response_id = %self.response_id.0,
            sequence,
            tool = %tool_name,
            "tool call recorded"
        );
        Ok(id)
    }

    /// Mark a record as completed. A record can be finalized exactly once.
    ///
    /// # Errors
    ///
    /// - `UnknownRecord` if `id` was never issued by this recorder
    /// - `AlreadyCompleted` if the record was finalized before
    /// - `InvalidCompletion` if `completed_at` precedes the record's `issued_at`
    pub fn finalize(&self, id: RecordId, completed_at: DateTime<Utc>) -> GroundcheckResult<()> {
        let mut state = self.lock_for_write()?;

        let index = usize::try_from(id.0).map_err(|_| GroundcheckError::UnknownRecord { id: id.0 })?;
        let record = state
            .records
            .get_mut(index)
            .ok_or(GroundcheckError::UnknownRecord { id: id.0 })?;

        if record.completed_at.is_some() {
            return Err(GroundcheckError::AlreadyCompleted { id: id.0 });
        }
        if completed_at < record.issued_at {
            return Err(GroundcheckError::InvalidCompletion {
                id: id.0,
                reason: format!(
                    "completed_at {} precedes issued_at {}",
                    completed_at.to_rfc3339(),
                    record.issued_at.to_rfc3339()
                ),
            });
        }
        record.completed_at = Some(completed_at);
        Ok(())
    }

    /// A snapshot of the trace so far. Safe to call while calls are in flight.
    pub fn get_trace(&self) -> CallTrace {
        let state = self.lock_for_read();
        CallTrace {
            response_id: self.response_id,
            records: state.records.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock_for_read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export the trace with every record committed into a SHA-256 chain.
    ///
    /// In-flight records are sealed as they are; sealing does not close the
    /// recorder.
    pub fn seal(&self) -> GroundcheckResult<SealedTrace> {
        let state = self.lock_for_read();

        let mut records = Vec::with_capacity(state.records.len());
        let mut prev_digest = SealedRecord::GENESIS_DIGEST.to_string();
        for record in &state.records {
            let digest = hash_record(&self.response_id, record.sequence, record, &prev_digest)?;
            records.push(SealedRecord {
                sequence: record.sequence,
                record: record.clone(),
                prev_digest,
                digest: digest.clone(),
            });
            prev_digest = digest;
        }

        let terminal_digest = records.last().map(|r| r.digest.clone()).unwrap_or_default();
        info!(
            response_id = %self.response_id.0,
            record_count = records.len(),
            terminal_digest = %terminal_digest,
            "trace sealed"
        );

        Ok(SealedTrace {
            response_id: self.response_id,
            records,
            sealed_at: Utc::now(),
            terminal_digest,
        })
    }

    fn lock_for_write(&self) -> GroundcheckResult<MutexGuard<'_, TraceState>> {
        self.state.lock().map_err(|e| GroundcheckError::TraceWriteFailed {
            reason: format!("trace state lock poisoned: {e}"),
        })
    }

    /// Readers see the last consistent state even after a writer panicked:
    /// every append completes under the lock before it is visible.
    fn lock_for_read(&self) -> MutexGuard<'_, TraceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
