//! Validation findings and the per-response report.
//!
//! Every check produces one or more `ValidationFinding`s. The orchestrator
//! collects them into a `ValidationReport` whose scores are derived from the
//! findings alone, so a report can always be re-derived from what it contains.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::trace::{ResponseId, ToolUsageSummary};

/// The family of check a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Freshness,
    PriceAccuracy,
    Hallucination,
    ToolUsage,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Freshness => "freshness",
            Category::PriceAccuracy => "price_accuracy",
            Category::Hallucination => "hallucination",
            Category::ToolUsage => "tool_usage",
        };
        f.write_str(name)
    }
}

/// How much a finding matters to the presentation layer.
///
/// Ordered: `Info < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// The outcome of a single check on a single subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub category: Category,
    /// Stable identifier of the check (e.g. `"stale_language"`).
    pub check: String,
    /// The symbol, URL, record or text span that was checked.
    pub subject: String,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
}

impl ValidationFinding {
    /// A passing finding. Passing findings are always `Info`.
    pub fn pass(
        category: Category,
        check: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            check: check.into(),
            subject: subject.into(),
            passed: true,
            message: message.into(),
            severity: Severity::Info,
        }
    }

    /// A failing finding with the given severity.
    pub fn fail(
        category: Category,
        check: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            category,
            check: check.into(),
            subject: subject.into(),
            passed: false,
            message: message.into(),
            severity,
        }
    }

    /// True if this finding blocks the response.
    pub fn is_blocking(&self) -> bool {
        !self.passed && self.severity == Severity::Critical
    }
}

/// The verdict for one agent response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub response_id: ResponseId,
    /// The `reference_now` the report was evaluated against.
    pub evaluated_at: DateTime<Utc>,
    pub findings: Vec<ValidationFinding>,
    pub tool_calls_total: usize,
    pub tool_usage: ToolUsageSummary,
    pub fresh_data_ratio: f64,
    pub price_accurate_ratio: f64,
    pub hallucination_count: usize,
    /// True only if no critical finding failed.
    pub overall_passed: bool,
}

impl ValidationReport {
    /// Build a report, deriving every score from `findings`.
    pub fn from_findings(
        response_id: ResponseId,
        evaluated_at: DateTime<Utc>,
        findings: Vec<ValidationFinding>,
        tool_usage: ToolUsageSummary,
    ) -> Self {
        let fresh_data_ratio = category_ratio(&findings, Category::Freshness);
        let price_accurate_ratio = category_ratio(&findings, Category::PriceAccuracy);
        let hallucination_count = findings
            .iter()
            .filter(|f| f.category == Category::Hallucination && !f.passed)
            .count();
        let overall_passed = !findings.iter().any(ValidationFinding::is_blocking);

        Self {
            response_id,
            evaluated_at,
            tool_calls_total: tool_usage.total_calls,
            tool_usage,
            fresh_data_ratio,
            price_accurate_ratio,
            hallucination_count,
            overall_passed,
            findings,
        }
    }

    /// Findings that did not pass, in report order.
    pub fn failures(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| !f.passed)
    }

    /// Number of failed critical findings.
    pub fn critical_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_blocking()).count()
    }

    /// Findings of one category, in report order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(move |f| f.category == category)
    }
}

/// passed / total for one category; 1.0 when the category is empty.
fn category_ratio(findings: &[ValidationFinding], category: Category) -> f64 {
    let (passed, total) = findings
        .iter()
        .filter(|f| f.category == category)
        .fold((0usize, 0usize), |(p, t), f| (p + usize::from(f.passed), t + 1));
    if total == 0 {
        1.0
    } else {
        passed as f64 / total as f64
    }
}
