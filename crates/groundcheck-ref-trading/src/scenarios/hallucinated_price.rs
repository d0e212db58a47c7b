//! Scenario 3: Hallucinated Price
//!
//! The agent searched and browsed, but never fetched a quote, and then
//! stated a bitcoin price of $60,000, half the real value. No tool returned
//! anything near that number.
//!
//!   - price accuracy: ~50% off the reference → critical
//!   - uncited claim: $60,000 matches no tool value → critical
//!   - the stop level $58,000 is uncited too → warning

use groundcheck_contracts::{error::GroundcheckResult, trace::ResponseId};
use groundcheck_trace::TraceRecorder;

use super::{print_header, print_run, validate_recorded, ScenarioRun};
use crate::{mock_data, pipeline::ValidationPipeline};

pub fn run(pipeline: &ValidationPipeline) -> GroundcheckResult<ScenarioRun> {
    let recorder = TraceRecorder::new(ResponseId::new());
    mock_data::record_btc_research(&recorder)?;
    validate_recorded(pipeline, &recorder, mock_data::HALLUCINATED_ANSWER)
}

/// Run Scenario 3 and print the walk-through.
pub fn run_scenario() -> GroundcheckResult<()> {
    print_header("Scenario 3: Hallucinated Price");
    let pipeline = ValidationPipeline::from_default_config()?;
    let run = run(&pipeline)?;
    print_run(mock_data::HALLUCINATED_ANSWER, &run);
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use groundcheck_contracts::finding::{Category, Severity};

    use super::*;

    #[test]
    fn invented_price_fails_accuracy_and_citation() {
        let pipeline = ValidationPipeline::from_default_config().unwrap();
        let report = run(&pipeline).unwrap().report;

        assert!(!report.overall_passed);

        let accuracy = report
            .in_category(Category::PriceAccuracy)
            .find(|f| f.check == "price_accuracy")
            .expect("an accuracy finding for BTC-USD");
        assert!(!accuracy.passed);
        assert_eq!(accuracy.severity, Severity::Critical);
        assert!(accuracy.message.contains("49.89%"), "message: {}", accuracy.message);

        let uncited: Vec<_> = report.findings.iter().filter(|f| f.check == "uncited_claim").collect();
        assert_eq!(uncited.len(), 2, "uncited: {uncited:?}");
        assert_eq!(uncited[0].subject, "BTC-USD $60,000");
        assert_eq!(uncited[0].severity, Severity::Critical);
        assert_eq!(uncited[1].subject, "$58,000");
        assert_eq!(uncited[1].severity, Severity::Warning);
        assert_eq!(report.hallucination_count, 2);
    }

    #[test]
    fn research_data_itself_is_fine() {
        let pipeline = ValidationPipeline::from_default_config().unwrap();
        let report = run(&pipeline).unwrap().report;
        assert_eq!(report.fresh_data_ratio, 1.0);
        assert!(report
            .in_category(Category::ToolUsage)
            .all(|f| f.passed), "tool usage: {:?}", report.in_category(Category::ToolUsage).collect::<Vec<_>>());
    }
}
