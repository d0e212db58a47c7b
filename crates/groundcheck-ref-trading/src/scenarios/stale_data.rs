//! Scenario 2: Stale Data
//!
//! Same research and the same answer as Scenario 1, but the quote the agent
//! fetched is ten minutes old. Price-like data has a five minute window, so
//! the freshness check on the quote fails critically and blocks the answer
//! even though the stated price is still accurate.

use chrono::Duration;

use groundcheck_contracts::error::GroundcheckResult;

use super::{print_header, print_run, validate_recorded, ScenarioRun};
use crate::{mock_data, pipeline::ValidationPipeline};

/// How old the fetched quote is.
pub const QUOTE_AGE_MINUTES: i64 = 10;

pub fn run(pipeline: &ValidationPipeline) -> GroundcheckResult<ScenarioRun> {
    let quoted_at = mock_data::reference_now() - Duration::minutes(QUOTE_AGE_MINUTES);
    let recorder = mock_data::research_trace(quoted_at)?;
    validate_recorded(pipeline, &recorder, mock_data::GROUNDED_ANSWER)
}

/// Run Scenario 2 and print the walk-through.
pub fn run_scenario() -> GroundcheckResult<()> {
    print_header("Scenario 2: Stale Data");
    let pipeline = ValidationPipeline::from_default_config()?;
    let run = run(&pipeline)?;
    print_run(mock_data::GROUNDED_ANSWER, &run);
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use groundcheck_contracts::finding::{Category, Severity};

    use super::*;

    #[test]
    fn stale_quote_blocks_the_answer() {
        let pipeline = ValidationPipeline::from_default_config().unwrap();
        let report = run(&pipeline).unwrap().report;

        assert!(!report.overall_passed);
        let stale: Vec<_> = report
            .in_category(Category::Freshness)
            .filter(|f| !f.passed)
            .collect();
        assert_eq!(stale.len(), 1, "only the quote is stale: {stale:?}");
        assert_eq!(stale[0].subject, "fetch_price #2");
        assert_eq!(stale[0].severity, Severity::Critical);
        assert!(stale[0].message.contains("10m 0s old"), "message: {}", stale[0].message);
    }

    #[test]
    fn accuracy_still_passes_on_stale_data() {
        let pipeline = ValidationPipeline::from_default_config().unwrap();
        let report = run(&pipeline).unwrap().report;
        assert_eq!(report.price_accurate_ratio, 1.0);
        assert_eq!(report.hallucination_count, 0);
        assert!((report.fresh_data_ratio - 2.0 / 3.0).abs() < 1e-9, "ratio {}", report.fresh_data_ratio);
    }

    #[test]
    fn a_wider_window_accepts_the_same_quote() {
        let mut config =
            groundcheck_config::from_toml_str(crate::pipeline::DEFAULT_PROFILE).unwrap();
        config.freshness.tight_window_secs = 15 * 60;
        let pipeline = ValidationPipeline::with_config(config).unwrap();
        assert!(run(&pipeline).unwrap().report.overall_passed);
    }
}
