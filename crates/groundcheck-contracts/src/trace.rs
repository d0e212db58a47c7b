//! Tool-call trace types.
//!
//! A `CallTrace` is the ordered record of every tool call the agent made
//! while producing one answer. Order is the temporal call order and is
//! significant; it is fixed by the recorder's sequence counter, never by
//! comparing timestamps.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::{ToolName, ToolResponse};

/// Identifier of the agent response a trace and its report belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub uuid::Uuid);

impl ResponseId {
    /// Create a new, unique response id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a record within one trace. Equal to the record's sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

/// Arguments passed to a tool call.
pub type Parameters = BTreeMap<String, serde_json::Value>;

/// One tool invocation and its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: RecordId,
    /// Position in the trace, starting at 0. Breaks timestamp ties.
    pub sequence: u64,
    pub tool_name: ToolName,
    pub parameters: Parameters,
    pub response: ToolResponse,
    /// When the call was issued (UTC).
    pub issued_at: DateTime<Utc>,
    /// When the response arrived. `None` while the call is in flight.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ToolCallRecord {
    /// Wall-clock duration of the call, once completed.
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|done| (done - self.issued_at).num_milliseconds())
    }

    /// Look up a string parameter (e.g. `"query"` on a web search).
    pub fn string_param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }
}

/// The ordered tool calls made for one agent response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTrace {
    pub response_id: ResponseId,
    pub records: Vec<ToolCallRecord>,
}

impl CallTrace {
    /// An empty trace for the given response.
    pub fn empty(response_id: ResponseId) -> Self {
        Self {
            response_id,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolCallRecord> {
        self.records.iter()
    }

    /// Records produced by `tool`, in call order.
    pub fn by_tool(&self, tool: ToolName) -> impl Iterator<Item = &ToolCallRecord> {
        self.records.iter().filter(move |r| r.tool_name == tool)
    }

    /// True if at least one search or browse call was made.
    pub fn has_research(&self) -> bool {
        self.records.iter().any(|r| r.tool_name.is_research())
    }

    /// Summarise tool usage for reporting.
    pub fn usage_summary(&self) -> ToolUsageSummary {
        let tools_used: BTreeSet<ToolName> = self.records.iter().map(|r| r.tool_name).collect();

        let mut data_sources = BTreeSet::new();
        for record in &self.records {
            if record.tool_name == ToolName::BrowsePage {
                if let Some(url) = record.string_param("url") {
                    data_sources.insert(url.to_string());
                }
            }
            for url in record.response.source_urls() {
                data_sources.insert(url.to_string());
            }
        }

        let durations: Vec<i64> = self.records.iter().filter_map(|r| r.duration_ms()).collect();
        let avg_duration_ms = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
        };

        ToolUsageSummary {
            total_calls: self.records.len(),
            tools_used: tools_used.into_iter().collect(),
            avg_duration_ms,
            data_sources: data_sources.into_iter().collect(),
        }
    }
}

/// Aggregate view of which tools a response used and where its data came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolUsageSummary {
    pub total_calls: usize,
    /// Distinct tools, sorted.
    pub tools_used: Vec<ToolName>,
    /// Mean duration over completed calls; `None` when none completed.
    pub avg_duration_ms: Option<f64>,
    /// Distinct source URLs, sorted.
    pub data_sources: Vec<String>,
}
