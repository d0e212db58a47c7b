//! Scenario 1: Fresh and Accurate
//!
//! The agent searches for the current bitcoin price, opens the quote page,
//! fetches a live quote two minutes old and states a price within a few
//! dollars of it. Every check passes.
//!
//!   1. web_search with an `after:` date scope → research present, fresh results
//!   2. browse_page on the quote page → fresh, extracted price recorded
//!   3. fetch_price quoted 2 minutes ago → inside the 5 minute window
//!   4. Answer "BTC-USD is $119,750" → 0.006% off the reference, cited by the quote

use chrono::Duration;

use groundcheck_contracts::error::GroundcheckResult;

use super::{print_header, print_run, validate_recorded, ScenarioRun};
use crate::{mock_data, pipeline::ValidationPipeline};

pub fn run(pipeline: &ValidationPipeline) -> GroundcheckResult<ScenarioRun> {
    let recorder = mock_data::research_trace(mock_data::reference_now() - Duration::minutes(2))?;
    validate_recorded(pipeline, &recorder, mock_data::GROUNDED_ANSWER)
}

/// Run Scenario 1 and print the walk-through.
pub fn run_scenario() -> GroundcheckResult<()> {
    print_header("Scenario 1: Fresh and Accurate");
    let pipeline = ValidationPipeline::from_default_config()?;
    let run = run(&pipeline)?;
    print_run(mock_data::GROUNDED_ANSWER, &run);
    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}
