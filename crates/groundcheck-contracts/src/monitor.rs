//! Rolling quality metrics and alert types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{finding::ValidationReport, trace::ResponseId};

/// Limits the production monitor compares its rolling metrics against.
///
/// Loaded once and treated as read-only. A new configuration replaces the
/// whole value; fields are never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Highest tolerable share of reports with at least one hallucination finding.
    pub max_hallucination_rate: f64,
    /// Lowest tolerable mean `fresh_data_ratio`.
    pub min_freshness_rate: f64,
    /// Lowest tolerable mean `price_accurate_ratio`.
    pub min_price_accuracy: f64,
    /// Lowest tolerable mean number of tool calls per request.
    pub min_tool_calls_per_request: f64,
    /// Highest tolerable share of reports with `overall_passed == false`.
    pub max_failure_rate: f64,
    /// No alerts are raised until this many reports are in the window.
    pub min_samples: usize,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_hallucination_rate: 0.10,
            min_freshness_rate: 0.90,
            min_price_accuracy: 0.95,
            min_tool_calls_per_request: 1.0,
            max_failure_rate: 0.25,
            min_samples: 1,
        }
    }
}

/// The per-report facts the monitor keeps in its rolling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub response_id: ResponseId,
    pub evaluated_at: DateTime<Utc>,
    pub overall_passed: bool,
    pub tool_calls_total: usize,
    pub fresh_data_ratio: f64,
    pub price_accurate_ratio: f64,
    pub hallucination_count: usize,
    pub critical_count: usize,
}

impl From<&ValidationReport> for ReportSummary {
    fn from(report: &ValidationReport) -> Self {
        Self {
            response_id: report.response_id,
            evaluated_at: report.evaluated_at,
            overall_passed: report.overall_passed,
            tool_calls_total: report.tool_calls_total,
            fresh_data_ratio: report.fresh_data_ratio,
            price_accurate_ratio: report.price_accurate_ratio,
            hallucination_count: report.hallucination_count,
            critical_count: report.critical_count(),
        }
    }
}

/// A consistent snapshot of the monitor's accumulated statistics.
///
/// Counters cover every report ever ingested and only grow. Rates are means
/// over the retained window and are recomputed on every ingest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RollingMetrics {
    pub reports_ingested: u64,
    pub failed_reports: u64,
    pub hallucinating_reports: u64,
    pub total_tool_calls: u64,
    pub total_findings: u64,
    pub critical_findings: u64,
    /// Number of reports the rates below are computed over.
    pub window_len: usize,
    pub hallucination_rate: f64,
    pub freshness_rate: f64,
    pub price_accuracy_rate: f64,
    pub avg_tool_calls: f64,
    pub failure_rate: f64,
    pub last_ingested_at: Option<DateTime<Utc>>,
}

/// The rolling metric an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMetric {
    HallucinationRate,
    FreshnessRate,
    PriceAccuracy,
    ToolCallsPerRequest,
    FailureRate,
}

impl fmt::Display for AlertMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertMetric::HallucinationRate => "hallucination rate",
            AlertMetric::FreshnessRate => "freshness rate",
            AlertMetric::PriceAccuracy => "price accuracy",
            AlertMetric::ToolCallsPerRequest => "tool calls per request",
            AlertMetric::FailureRate => "failure rate",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// A threshold breach observed on the rolling metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub metric: AlertMetric,
    pub observed: f64,
    pub threshold: f64,
    pub message: String,
}
