//! Trading reference runtime demo scenarios.
//!
//! Each scenario records a tool-call trace with the real `TraceRecorder`,
//! seals it, and validates the sealed trace through a `ValidationPipeline`
//! built from the shipped configuration profile. Every scenario exposes a
//! `run` function returning its outcome for tests and a `run_scenario`
//! function that prints a walk-through for the demo binary.

pub mod alert_recovery;
pub mod empty_answer;
pub mod fresh_accurate;
pub mod hallucinated_price;
pub mod stale_data;
pub mod under_researched;

use groundcheck_contracts::{error::GroundcheckResult, finding::ValidationReport};
use groundcheck_trace::{verify_sealed, SealedTrace, TraceRecorder};

use crate::{mock_data, pipeline::ValidationPipeline};

/// What a single-answer scenario produced.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub report: ValidationReport,
    /// The trace exactly as it was validated.
    pub sealed: SealedTrace,
}

impl ScenarioRun {
    pub fn integrity_ok(&self) -> bool {
        verify_sealed(&self.sealed)
    }
}

/// Seal `recorder` and validate the sealed trace against the mock reference data.
pub(crate) fn validate_recorded(
    pipeline: &ValidationPipeline,
    recorder: &TraceRecorder,
    answer: &str,
) -> GroundcheckResult<ScenarioRun> {
    let sealed = recorder.seal()?;
    let report = pipeline.run(
        &sealed.to_trace(),
        answer,
        &mock_data::reference_prices(),
        mock_data::reference_now(),
    )?;
    Ok(ScenarioRun { report, sealed })
}

// ── Printing ─────────────────────────────────────────────────────────────────

pub(crate) fn print_header(title: &str) {
    println!("=== {title} ===");
    println!();
}

pub(crate) fn print_run(answer: &str, run: &ScenarioRun) {
    let report = &run.report;
    let tools: Vec<String> = run
        .sealed
        .records
        .iter()
        .map(|r| r.record.tool_name.to_string())
        .collect();

    if tools.is_empty() {
        println!("  Trace:            (no tool calls)");
    } else {
        println!("  Trace:            {} call(s): {}", tools.len(), tools.join(", "));
    }
    println!("  Answer:           {answer:?}");
    println!();
    println!(
        "  Verdict:          {}",
        if report.overall_passed { "PASS" } else { "FAIL" }
    );
    println!("  Fresh data:       {:.0}%", report.fresh_data_ratio * 100.0);
    println!("  Price accuracy:   {:.0}%", report.price_accurate_ratio * 100.0);
    println!("  Hallucinations:   {}", report.hallucination_count);

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("  Failed checks:");
        for finding in failures {
            println!(
                "    [{}] {} {}: {}",
                finding.severity, finding.check, finding.subject, finding.message
            );
        }
    }
    println!();

    let digest = run.sealed.terminal_digest.get(..12).unwrap_or(&run.sealed.terminal_digest);
    println!(
        "  Trace seal:       {} ({} record(s), terminal digest {digest})",
        if run.integrity_ok() { "VERIFIED" } else { "FAILED" },
        run.sealed.records.len()
    );
    println!();
}
