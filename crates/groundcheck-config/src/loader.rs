//! Loading and validating `EngineConfig` documents.
//!
//! Every section of the document is optional; missing fields take their
//! defaults. A document that parses but holds unusable values (a zero
//! window, an inverted range, a rate above 1) is rejected as a whole.

use std::path::Path;

use chrono::TimeDelta;
use tracing::debug;

use groundcheck_contracts::{
    config::EngineConfig,
    error::{GroundcheckError, GroundcheckResult},
};

/// Parse `s` as TOML and validate the resulting configuration.
///
/// Returns `ConfigError` if the TOML is malformed, does not match the
/// `EngineConfig` schema, or fails `validate`.
pub fn from_toml_str(s: &str) -> GroundcheckResult<EngineConfig> {
    let config: EngineConfig = toml::from_str(s).map_err(|e| GroundcheckError::ConfigError {
        reason: format!("failed to parse configuration TOML: {e}"),
    })?;
    validate(&config)?;
    debug!(
        ranges = config.ranges.len(),
        phrases = config.hallucination.phrases.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Read the file at `path` and parse it with `from_toml_str`.
pub fn from_file(path: &Path) -> GroundcheckResult<EngineConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| GroundcheckError::ConfigError {
        reason: format!("failed to read configuration file '{}': {e}", path.display()),
    })?;
    from_toml_str(&contents)
}

/// Serialize `config` back to a TOML document.
pub fn to_toml_string(config: &EngineConfig) -> GroundcheckResult<String> {
    toml::to_string(config).map_err(|e| GroundcheckError::ConfigError {
        reason: format!("failed to serialize configuration: {e}"),
    })
}

/// Check every value in `config`, reporting the first problem found.
pub fn validate(config: &EngineConfig) -> GroundcheckResult<()> {
    let f = &config.freshness;
    if f.tight_window_secs <= 0 {
        return invalid(format!("freshness.tight_window_secs must be positive, got {}", f.tight_window_secs));
    }
    if f.loose_window_secs <= 0 {
        return invalid(format!("freshness.loose_window_secs must be positive, got {}", f.loose_window_secs));
    }
    if f.clock_skew_secs < 0 {
        return invalid(format!("freshness.clock_skew_secs must not be negative, got {}", f.clock_skew_secs));
    }
    representable("freshness.tight_window_secs", f.tight_window_secs)?;
    representable("freshness.loose_window_secs", f.loose_window_secs)?;
    representable("freshness.clock_skew_secs", f.clock_skew_secs)?;

    non_negative("price.tolerance_pct", config.price.tolerance_pct)?;
    non_negative(
        "hallucination.citation_tolerance_pct",
        config.hallucination.citation_tolerance_pct,
    )?;

    for (index, phrase) in config.hallucination.phrases.iter().enumerate() {
        if phrase.pattern.trim().is_empty() {
            return invalid(format!("hallucination.phrases[{index}] has an empty pattern"));
        }
        if phrase.regex {
            regex::Regex::new(&phrase.pattern).map_err(|e| GroundcheckError::ConfigError {
                reason: format!("hallucination.phrases[{index}] is not a valid regex: {e}"),
            })?;
        }
    }

    for (symbol, range) in &config.ranges {
        if !range.min.is_finite() || !range.max.is_finite() {
            return invalid(format!("ranges.{symbol} bounds must be finite"));
        }
        if range.min > range.max {
            return invalid(format!(
                "ranges.{symbol} is inverted: min {} > max {}",
                range.min, range.max
            ));
        }
    }

    let t = &config.thresholds;
    unit_interval("thresholds.max_hallucination_rate", t.max_hallucination_rate)?;
    unit_interval("thresholds.min_freshness_rate", t.min_freshness_rate)?;
    unit_interval("thresholds.min_price_accuracy", t.min_price_accuracy)?;
    unit_interval("thresholds.max_failure_rate", t.max_failure_rate)?;
    non_negative("thresholds.min_tool_calls_per_request", t.min_tool_calls_per_request)?;

    if config.monitor.window == 0 {
        return invalid("monitor.window must be at least 1".to_string());
    }

    Ok(())
}

fn invalid(reason: String) -> GroundcheckResult<()> {
    Err(GroundcheckError::ConfigError { reason })
}

/// Windows become `TimeDelta`s when the orchestrator is built.
fn representable(field: &str, secs: i64) -> GroundcheckResult<()> {
    match TimeDelta::try_seconds(secs) {
        Some(_) => Ok(()),
        None => invalid(format!("{field} is out of range, got {secs}")),
    }
}

fn non_negative(field: &str, value: f64) -> GroundcheckResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(format!("{field} must be a non-negative number, got {value}"))
    }
}

fn unit_interval(field: &str, value: f64) -> GroundcheckResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        invalid(format!("{field} must be within [0, 1], got {value}"))
    }
}
