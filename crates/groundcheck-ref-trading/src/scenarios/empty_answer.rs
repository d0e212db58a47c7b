//! Scenario 6: Empty Answer
//!
//! The agent produced nothing: no tool calls and an empty answer. The
//! report carries exactly one critical finding and fails. Validating the
//! same inputs again yields the same findings.

use groundcheck_contracts::{error::GroundcheckResult, trace::ResponseId};
use groundcheck_trace::TraceRecorder;

use super::{print_header, print_run, validate_recorded, ScenarioRun};
use crate::pipeline::ValidationPipeline;

pub fn run(pipeline: &ValidationPipeline) -> GroundcheckResult<ScenarioRun> {
    let recorder = TraceRecorder::new(ResponseId::new());
    validate_recorded(pipeline, &recorder, "")
}

/// Run Scenario 6 and print the walk-through.
pub fn run_scenario() -> GroundcheckResult<()> {
    print_header("Scenario 6: Empty Answer");
    let pipeline = ValidationPipeline::from_default_config()?;
    let run = run(&pipeline)?;
    print_run("", &run);
    println!("  Scenario 6 complete.");
    println!();
    Ok(())
}
