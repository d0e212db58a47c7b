//! Scenario 4: Under-Researched
//!
//! The agent fetched live quotes for BTC-USD and ETH-USD and quoted both
//! correctly, but never searched or browsed for context. A recommendation
//! built on a bare price has no research behind it, so the tool-usage check
//! fails critically regardless of price correctness.

use groundcheck_contracts::error::GroundcheckResult;

use super::{print_header, print_run, validate_recorded, ScenarioRun};
use crate::{mock_data, pipeline::ValidationPipeline};

pub fn run(pipeline: &ValidationPipeline) -> GroundcheckResult<ScenarioRun> {
    let recorder = mock_data::price_only_trace()?;
    validate_recorded(pipeline, &recorder, mock_data::PRICE_ONLY_ANSWER)
}

/// Run Scenario 4 and print the walk-through.
pub fn run_scenario() -> GroundcheckResult<()> {
    print_header("Scenario 4: Under-Researched");
    let pipeline = ValidationPipeline::from_default_config()?;
    let run = run(&pipeline)?;
    print_run(mock_data::PRICE_ONLY_ANSWER, &run);
    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use groundcheck_contracts::finding::{Category, Severity};

    use super::*;

    #[test]
    fn missing_research_is_critical() {
        let pipeline = ValidationPipeline::from_default_config().unwrap();
        let report = run(&pipeline).unwrap().report;

        assert!(!report.overall_passed);
        let research = report
            .findings
            .iter()
            .find(|f| f.check == "research_presence")
            .expect("a research finding");
        assert!(!research.passed);
        assert_eq!(research.category, Category::ToolUsage);
        assert_eq!(research.severity, Severity::Critical);
        assert_eq!(report.critical_count(), 1, "research is the only blocker");
    }

    #[test]
    fn both_prices_are_still_correct() {
        let pipeline = ValidationPipeline::from_default_config().unwrap();
        let report = run(&pipeline).unwrap().report;

        let subjects: Vec<&str> = report
            .in_category(Category::PriceAccuracy)
            .map(|f| f.subject.as_str())
            .collect();
        assert_eq!(subjects, vec!["BTC-USD", "ETH-USD"]);
        assert_eq!(report.price_accurate_ratio, 1.0);
        assert_eq!(report.fresh_data_ratio, 1.0);
        assert_eq!(report.hallucination_count, 0);
    }
}
