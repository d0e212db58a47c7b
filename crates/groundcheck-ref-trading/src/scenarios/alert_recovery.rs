//! Scenario 5: Alert Raising and Clearing
//!
//! A production monitor with a 20-report window sees three answers that
//! fall back on training-time knowledge among seventeen clean ones. The
//! hallucination rate of 0.15 exceeds the 0.10 threshold and raises one
//! critical alert. Ten more clean answers push the offending reports out of
//! the window and the alert clears with no threshold change.

use chrono::Duration;

use groundcheck_contracts::{
    error::GroundcheckResult,
    monitor::{Alert, RollingMetrics},
};

use super::print_header;
use crate::{
    mock_data,
    pipeline::{ValidationPipeline, DEFAULT_PROFILE},
};

pub const WINDOW: usize = 20;
pub const HALLUCINATING: usize = 3;
pub const CLEAN_BEFORE: usize = 17;
pub const CLEAN_AFTER: usize = 10;

/// Alerts and metrics observed at the two checkpoints.
#[derive(Debug, Clone)]
pub struct AlertRun {
    pub raised: Vec<Alert>,
    pub metrics_at_raise: RollingMetrics,
    pub after_recovery: Vec<Alert>,
    pub metrics_after_recovery: RollingMetrics,
}

fn submit(pipeline: &ValidationPipeline, answer: &str, count: usize) -> GroundcheckResult<()> {
    for _ in 0..count {
        let recorder = mock_data::research_trace(mock_data::reference_now() - Duration::minutes(2))?;
        pipeline.run(
            &recorder.get_trace(),
            answer,
            &mock_data::reference_prices(),
            mock_data::reference_now(),
        )?;
    }
    Ok(())
}

pub fn run() -> GroundcheckResult<AlertRun> {
    let mut config = groundcheck_config::from_toml_str(DEFAULT_PROFILE)?;
    config.monitor.window = WINDOW;
    let pipeline = ValidationPipeline::with_config(config)?;

    submit(&pipeline, mock_data::STALE_MEMORY_ANSWER, HALLUCINATING)?;
    submit(&pipeline, mock_data::GROUNDED_ANSWER, CLEAN_BEFORE)?;
    let raised = pipeline.alerts();
    let metrics_at_raise = pipeline.metrics();

    submit(&pipeline, mock_data::GROUNDED_ANSWER, CLEAN_AFTER)?;
    Ok(AlertRun {
        raised,
        metrics_at_raise,
        after_recovery: pipeline.alerts(),
        metrics_after_recovery: pipeline.metrics(),
    })
}

/// Run Scenario 5 and print the walk-through.
pub fn run_scenario() -> GroundcheckResult<()> {
    print_header("Scenario 5: Alert Raising and Clearing");
    let run = run()?;

    println!(
        "  Ingested {HALLUCINATING} hallucinating + {CLEAN_BEFORE} clean report(s) into a window of {WINDOW}"
    );
    println!(
        "  Hallucination rate:  {:.2}",
        run.metrics_at_raise.hallucination_rate
    );
    if run.raised.is_empty() {
        println!("  Alerts:              none");
    }
    for alert in &run.raised {
        println!("  ALERT [{:?}] {}", alert.severity, alert.message);
    }
    println!();

    println!("  Ingested {CLEAN_AFTER} more clean report(s)");
    println!(
        "  Hallucination rate:  {:.2} (window of {})",
        run.metrics_after_recovery.hallucination_rate, run.metrics_after_recovery.window_len
    );
    println!(
        "  Alerts:              {}",
        if run.after_recovery.is_empty() { "cleared".to_string() } else { format!("{} still active", run.after_recovery.len()) }
    );
    println!(
        "  Lifetime counters:   {} report(s), {} hallucinating",
        run.metrics_after_recovery.reports_ingested, run.metrics_after_recovery.hallucinating_reports
    );
    println!();
    println!("  Scenario 5 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use groundcheck_contracts::monitor::{AlertMetric, AlertSeverity};

    use super::*;

    #[test]
    fn hallucination_alert_raises_then_clears() {
        let run = run().unwrap();

        assert!(
            (run.metrics_at_raise.hallucination_rate - 0.15).abs() < 1e-9,
            "rate {}",
            run.metrics_at_raise.hallucination_rate
        );
        assert_eq!(run.raised.len(), 1, "alerts: {:?}", run.raised);
        assert_eq!(run.raised[0].metric, AlertMetric::HallucinationRate);
        assert_eq!(run.raised[0].severity, AlertSeverity::Critical);
        assert_eq!(run.raised[0].threshold, 0.10);

        assert!(run.metrics_after_recovery.hallucination_rate < 0.10);
        assert!(run.after_recovery.is_empty(), "alerts: {:?}", run.after_recovery);
    }

    #[test]
    fn counters_keep_the_full_history() {
        let run = run().unwrap();
        let m = &run.metrics_after_recovery;
        assert_eq!(m.reports_ingested, (HALLUCINATING + CLEAN_BEFORE + CLEAN_AFTER) as u64);
        assert_eq!(m.hallucinating_reports, HALLUCINATING as u64);
        assert_eq!(m.window_len, WINDOW);
    }
}
