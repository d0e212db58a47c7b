//! Replaying a logged tool-call session into a `TraceRecorder`.
//!
//! A tool layer that logs its calls as JSON can have them validated after
//! the fact. Each call goes through `TraceRecorder::record`, so unknown tools
//! and malformed payloads are rejected exactly as they would be live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use groundcheck_contracts::{
    error::GroundcheckResult,
    trace::{Parameters, ResponseId},
};
use groundcheck_trace::TraceRecorder;

/// One logged tool call, as the tool layer reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    /// Tool name, e.g. `"fetch_price"`.
    pub tool: String,
    #[serde(default)]
    pub parameters: Parameters,
    /// The raw response payload.
    pub response: serde_json::Value,
    pub issued_at: DateTime<Utc>,
    /// `None` for a call still in flight when the log was written.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Record `calls` in order under a new response id.
///
/// # Errors
///
/// The first recorder error: `UnknownTool`, `MalformedResponse` or
/// `InvalidCompletion`.
pub fn replay(calls: Vec<RawToolCall>) -> GroundcheckResult<TraceRecorder> {
    let recorder = TraceRecorder::new(ResponseId::new());
    for call in calls {
        let id = recorder.record(&call.tool, call.parameters, call.response, call.issued_at)?;
        if let Some(completed_at) = call.completed_at {
            recorder.finalize(id, completed_at)?;
        }
    }
    Ok(recorder)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use groundcheck_contracts::{error::GroundcheckError, tool::ToolName};

    use super::*;
    use crate::{mock_data, pipeline::ValidationPipeline};

    const SAMPLE_TRACE: &str = include_str!("../../../demos/btc_trace.json");
    const SAMPLE_ANSWER: &str = include_str!("../../../demos/btc_answer.txt");

    fn raw(tool: &str, response: serde_json::Value) -> RawToolCall {
        RawToolCall {
            tool: tool.to_string(),
            parameters: Parameters::new(),
            response,
            issued_at: Utc.with_ymd_and_hms(2024, 12, 18, 14, 34, 0).unwrap(),
            completed_at: None,
        }
    }

    #[test]
    fn sample_session_replays_in_order() {
        let calls: Vec<RawToolCall> = serde_json::from_str(SAMPLE_TRACE).unwrap();
        let trace = replay(calls).unwrap().get_trace();

        let tools: Vec<ToolName> = trace.iter().map(|r| r.tool_name).collect();
        assert_eq!(tools, vec![ToolName::WebSearch, ToolName::BrowsePage, ToolName::FetchPrice]);
        assert!(trace.iter().all(|r| r.completed_at.is_some()));
    }

    #[test]
    fn sample_session_validates_clean() {
        let calls: Vec<RawToolCall> = serde_json::from_str(SAMPLE_TRACE).unwrap();
        let trace = replay(calls).unwrap().get_trace();
        let pipeline = ValidationPipeline::from_default_config().unwrap();

        let report = pipeline
            .run(&trace, SAMPLE_ANSWER, &mock_data::reference_prices(), mock_data::reference_now())
            .unwrap();
        assert!(report.overall_passed, "failures: {:?}", report.failures().collect::<Vec<_>>());
    }

    #[test]
    fn unknown_tool_stops_the_replay() {
        let calls = vec![
            raw("fetch_price", json!({"symbol": "BTC-USD", "price": 1.0, "timestamp": "2024-12-18T14:34:00Z"})),
            raw("stock_screener", json!({})),
        ];
        match replay(calls) {
            Err(GroundcheckError::UnknownTool { name }) => assert_eq!(name, "stock_screener"),
            Err(other) => panic!("expected UnknownTool, got {other:?}"),
            Ok(_) => panic!("expected UnknownTool, got a trace"),
        }
    }

    #[test]
    fn in_flight_calls_stay_open() {
        let calls = vec![raw("code_execution", json!({"output": "sma_20 = 118402.7"}))];
        let trace = replay(calls).unwrap().get_trace();
        assert_eq!(trace.len(), 1);
        assert!(trace.records[0].completed_at.is_none());
    }
}
