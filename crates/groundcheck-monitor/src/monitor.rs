//! The production monitor.
//!
//! `ProductionMonitor` is the only long-lived mutable state in the engine.
//! It is constructed once at process start and shared by reference (usually
//! an `Arc`), never through a global. Writers (`ingest`) are serialized by a
//! write lock; readers (`snapshot`, `evaluate`, `recent`) see a consistent
//! state between two ingests.

use std::{
    collections::VecDeque,
    sync::{PoisonError, RwLock, RwLockReadGuard},
};

use tracing::{info, warn};

use groundcheck_contracts::{
    config::MonitorConfig,
    error::{GroundcheckError, GroundcheckResult},
    finding::ValidationReport,
    monitor::{Alert, AlertMetric, AlertSeverity, AlertThresholds, ReportSummary, RollingMetrics},
};
use groundcheck_core::traits::ReportSink;

struct MonitorState {
    window: VecDeque<ReportSummary>,
    metrics: RollingMetrics,
}

/// Accumulates validation reports into rolling metrics and raises alerts.
pub struct ProductionMonitor {
    capacity: usize,
    state: RwLock<MonitorState>,
}

impl ProductionMonitor {
    /// Create a monitor whose rates cover the last `window` reports.
    ///
    /// A zero window is treated as one.
    pub fn new(window: usize) -> Self {
        let capacity = window.max(1);
        Self {
            capacity,
            state: RwLock::new(MonitorState {
                window: VecDeque::with_capacity(capacity),
                metrics: RollingMetrics::default(),
            }),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.window)
    }

    pub fn window_capacity(&self) -> usize {
        self.capacity
    }

    /// Fold one report into the counters and the rolling window.
    ///
    /// # Errors
    ///
    /// Returns `MonitorWriteFailed` if a previous writer panicked while
    /// holding the lock.
    pub fn ingest(&self, report: &ValidationReport) -> GroundcheckResult<()> {
        let mut state = self.state.write().map_err(|e| GroundcheckError::MonitorWriteFailed {
            reason: format!("monitor state lock poisoned: {e}"),
        })?;

        let summary = ReportSummary::from(report);

        let metrics = &mut state.metrics;
        metrics.reports_ingested += 1;
        metrics.failed_reports += u64::from(!summary.overall_passed);
        metrics.hallucinating_reports += u64::from(summary.hallucination_count > 0);
        metrics.total_tool_calls += summary.tool_calls_total as u64;
        metrics.total_findings += report.findings.len() as u64;
        metrics.critical_findings += summary.critical_count as u64;
        metrics.last_ingested_at = Some(summary.evaluated_at);

        state.window.push_back(summary);
        while state.window.len() > self.capacity {
            state.window.pop_front();
        }

        let MonitorState { window, metrics } = &mut *state;
        recompute_rates(metrics, window);

        info!(
            response_id = %report.response_id.0,
            reports_ingested = metrics.reports_ingested,
            window_len = metrics.window_len,
            hallucination_rate = metrics.hallucination_rate,
            failure_rate = metrics.failure_rate,
            "report ingested"
        );

        Ok(())
    }

    /// A consistent copy of the current metrics.
    pub fn snapshot(&self) -> RollingMetrics {
        self.read().metrics.clone()
    }

    /// The last `n` report summaries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ReportSummary> {
        let state = self.read();
        let skip = state.window.len().saturating_sub(n);
        state.window.iter().skip(skip).cloned().collect()
    }

    /// Compare the current metrics against `thresholds`.
    pub fn evaluate(&self, thresholds: &AlertThresholds) -> Vec<Alert> {
        let alerts = evaluate_metrics(&self.snapshot(), thresholds);
        for alert in &alerts {
            warn!(
                metric = %alert.metric,
                observed = alert.observed,
                threshold = alert.threshold,
                severity = ?alert.severity,
                "alert raised"
            );
        }
        alerts
    }

    /// Readers recover a poisoned lock: the window is only mutated under the
    /// write lock, so the last completed ingest is what they observe.
    fn read(&self) -> RwLockReadGuard<'_, MonitorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProductionMonitor {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default())
    }
}

impl ReportSink for ProductionMonitor {
    fn ingest(&self, report: &ValidationReport) -> GroundcheckResult<()> {
        ProductionMonitor::ingest(self, report)
    }
}

fn recompute_rates(metrics: &mut RollingMetrics, window: &VecDeque<ReportSummary>) {
    metrics.window_len = window.len();
    if window.is_empty() {
        return;
    }
    metrics.hallucination_rate = mean(window, |s| if s.hallucination_count > 0 { 1.0 } else { 0.0 });
    metrics.freshness_rate = mean(window, |s| s.fresh_data_ratio);
    metrics.price_accuracy_rate = mean(window, |s| s.price_accurate_ratio);
    metrics.avg_tool_calls = mean(window, |s| s.tool_calls_total as f64);
    metrics.failure_rate = mean(window, |s| if s.overall_passed { 0.0 } else { 1.0 });
}

fn mean(window: &VecDeque<ReportSummary>, value: impl Fn(&ReportSummary) -> f64) -> f64 {
    window.iter().map(value).sum::<f64>() / window.len() as f64
}

/// Compare `metrics` against `thresholds`; pure.
///
/// Every breached threshold yields its own alert, in a fixed order. No alerts
/// are raised while the window holds fewer than `min_samples` reports.
pub fn evaluate_metrics(metrics: &RollingMetrics, thresholds: &AlertThresholds) -> Vec<Alert> {
    if metrics.window_len == 0 || metrics.window_len < thresholds.min_samples {
        return Vec::new();
    }

    let mut alerts = Vec::new();

    if metrics.hallucination_rate > thresholds.max_hallucination_rate {
        alerts.push(above(
            AlertSeverity::Critical,
            AlertMetric::HallucinationRate,
            metrics.hallucination_rate,
            thresholds.max_hallucination_rate,
        ));
    }
    if metrics.price_accuracy_rate < thresholds.min_price_accuracy {
        alerts.push(below(
            AlertSeverity::Critical,
            AlertMetric::PriceAccuracy,
            metrics.price_accuracy_rate,
            thresholds.min_price_accuracy,
        ));
    }
    if metrics.avg_tool_calls < thresholds.min_tool_calls_per_request {
        alerts.push(below(
            AlertSeverity::Critical,
            AlertMetric::ToolCallsPerRequest,
            metrics.avg_tool_calls,
            thresholds.min_tool_calls_per_request,
        ));
    }
    if metrics.freshness_rate < thresholds.min_freshness_rate {
        alerts.push(below(
            AlertSeverity::Warning,
            AlertMetric::FreshnessRate,
            metrics.freshness_rate,
            thresholds.min_freshness_rate,
        ));
    }
    if metrics.failure_rate > thresholds.max_failure_rate {
        alerts.push(above(
            AlertSeverity::Warning,
            AlertMetric::FailureRate,
            metrics.failure_rate,
            thresholds.max_failure_rate,
        ));
    }

    alerts
}

fn above(severity: AlertSeverity, metric: AlertMetric, observed: f64, threshold: f64) -> Alert {
    Alert {
        severity,
        metric,
        observed,
        threshold,
        message: format!("{metric} {observed:.3} exceeds maximum {threshold:.3}"),
    }
}

fn below(severity: AlertSeverity, metric: AlertMetric, observed: f64, threshold: f64) -> Alert {
    Alert {
        severity,
        metric,
        observed,
        threshold,
        message: format!("{metric} {observed:.3} is below minimum {threshold:.3}"),
    }
}
