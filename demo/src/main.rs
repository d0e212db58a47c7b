//! groundcheck Trading Reference Runtime: Demo CLI
//!
//! Runs the trading demo scenarios, or validates a logged agent session
//! from disk.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- fresh-accurate
//!   cargo run -p demo -- alert-recovery
//!   cargo run -p demo -- validate --trace demos/btc_trace.json \
//!       --answer demos/btc_answer.txt --prices demos/btc_prices.json \
//!       --now 2024-12-18T14:35:00Z
//!   cargo run -p demo -- show-config --config config/default.toml

use std::{collections::BTreeMap, fs, path::PathBuf, process::ExitCode};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use groundcheck_config::ConfigHandle;
use groundcheck_core::render_markdown;
use groundcheck_ref_trading::{
    pipeline::DEFAULT_PROFILE,
    replay,
    scenarios::{alert_recovery, empty_answer, fresh_accurate, hallucinated_price, stale_data, under_researched},
    RawToolCall, ValidationPipeline,
};

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

// ── CLI definition ────────────────────────────────────────────────────────────

/// groundcheck: validation and anti-hallucination checks for LLM trading
/// recommendations.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "groundcheck trading reference runtime demo",
    long_about = "Runs groundcheck demo scenarios showing freshness, price accuracy,\n\
                  hallucination and tool-usage checks, plus production alerting."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all six trading scenarios in sequence.
    RunAll,
    /// Scenario 1: fresh data, accurate price, every check passes.
    FreshAccurate,
    /// Scenario 2: a ten minute old quote blocks the answer.
    StaleData,
    /// Scenario 3: a price no tool returned.
    HallucinatedPrice,
    /// Scenario 4: correct prices without any research calls.
    UnderResearched,
    /// Scenario 5: hallucination-rate alert raising and clearing.
    AlertRecovery,
    /// Scenario 6: empty trace and empty answer.
    EmptyAnswer,
    /// Validate a logged session: tool calls, answer text and reference prices.
    Validate {
        /// JSON array of tool calls in call order.
        #[arg(long)]
        trace: PathBuf,
        /// File holding the agent's answer text.
        #[arg(long)]
        answer: PathBuf,
        /// JSON object mapping symbol to reference price.
        #[arg(long)]
        prices: PathBuf,
        /// Engine configuration TOML; the shipped profile when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Evaluation instant (RFC 3339); the current time when omitted.
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        /// Print the report as JSON instead of Markdown.
        #[arg(long)]
        json: bool,
    },
    /// Load, validate and print an engine configuration.
    ShowConfig {
        /// Engine configuration TOML; the shipped profile when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Set RUST_LOG=debug for per-check progress.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_all().map(|()| true),
        Command::FreshAccurate => scenario(fresh_accurate::run_scenario),
        Command::StaleData => scenario(stale_data::run_scenario),
        Command::HallucinatedPrice => scenario(hallucinated_price::run_scenario),
        Command::UnderResearched => scenario(under_researched::run_scenario),
        Command::AlertRecovery => scenario(alert_recovery::run_scenario),
        Command::EmptyAnswer => scenario(empty_answer::run_scenario),
        Command::Validate {
            trace,
            answer,
            prices,
            config,
            now,
            json,
        } => run_validate(trace, answer, prices, config, now, json),
        Command::ShowConfig { config } => show_config(config).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        // The report was produced, but the answer failed validation.
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Demo error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn scenario(run: fn() -> groundcheck_contracts::error::GroundcheckResult<()>) -> DemoResult<bool> {
    print_banner();
    run()?;
    Ok(true)
}

fn run_all() -> DemoResult<()> {
    print_banner();
    fresh_accurate::run_scenario()?;
    stale_data::run_scenario()?;
    hallucinated_price::run_scenario()?;
    under_researched::run_scenario()?;
    alert_recovery::run_scenario()?;
    empty_answer::run_scenario()?;
    println!("All scenarios completed.");
    Ok(())
}

// ── Validate from disk ────────────────────────────────────────────────────────

fn load_pipeline(config: Option<PathBuf>) -> DemoResult<ValidationPipeline> {
    let pipeline = match config {
        Some(path) => ValidationPipeline::new(ConfigHandle::from_file(&path)?)?,
        None => ValidationPipeline::from_default_config()?,
    };
    Ok(pipeline)
}

fn run_validate(
    trace: PathBuf,
    answer: PathBuf,
    prices: PathBuf,
    config: Option<PathBuf>,
    now: Option<DateTime<Utc>>,
    json: bool,
) -> DemoResult<bool> {
    let calls: Vec<RawToolCall> = serde_json::from_str(&fs::read_to_string(&trace)?)?;
    let answer = fs::read_to_string(&answer)?;
    let prices: BTreeMap<String, f64> = serde_json::from_str(&fs::read_to_string(&prices)?)?;

    let pipeline = load_pipeline(config)?;
    let recorder = replay(calls)?;
    let report = pipeline.run(&recorder.get_trace(), &answer, &prices, now.unwrap_or_else(Utc::now))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_markdown(&report));
    }
    Ok(report.overall_passed)
}

fn show_config(config: Option<PathBuf>) -> DemoResult<()> {
    let config = match config {
        Some(path) => groundcheck_config::from_file(&path)?,
        None => groundcheck_config::from_toml_str(DEFAULT_PROFILE)?,
    };
    print!("{}", groundcheck_config::to_toml_string(&config)?);
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("groundcheck: Trading Recommendation Validation");
    println!("==============================================");
    println!();
    println!("Checks per answer:");
    println!("  [1] Freshness: every timestamped tool result within its window");
    println!("  [2] Price accuracy: headline prices within tolerance of the reference");
    println!("  [3] Hallucination scans: stale phrasing, uncited figures, implausible prices");
    println!("  [4] Tool usage: tool calls present, research done, searches date-scoped");
    println!("  [5] Report folded into the production monitor's rolling window");
    println!();
}
