//! Engine configuration schema.
//!
//! `EngineConfig` is the full configuration surface: tolerances, freshness
//! windows, the stale-language phrase list, plausible price ranges, alert
//! thresholds. Every section has defaults so a partial document is valid.
//! Loading and validation live in `groundcheck-config`.
//!
//! Example in TOML:
//! ```toml
//! [freshness]
//! tight_window_secs = 300
//!
//! [[hallucination.phrases]]
//! pattern = "as of my last update"
//!
//! [ranges.BTC-USD]
//! min = 10000.0
//! max = 1000000.0
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{finding::Severity, monitor::AlertThresholds};

/// The complete engine configuration snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub freshness: FreshnessConfig,
    pub price: PriceConfig,
    pub hallucination: HallucinationConfig,
    /// Plausible price range per symbol, keyed by symbol (e.g. `"BTC-USD"`).
    pub ranges: BTreeMap<String, PriceRange>,
    pub thresholds: AlertThresholds,
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// Maximum age of price-like data.
    pub tight_window_secs: i64,
    /// Maximum age of news and editorial data.
    pub loose_window_secs: i64,
    /// How far in the future a timestamp may lie before it is rejected.
    pub clock_skew_secs: i64,
    /// Flag web searches whose query lacks an `after:<today>` marker.
    pub require_search_date_scope: bool,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            tight_window_secs: 5 * 60,
            loose_window_secs: 12 * 60 * 60,
            clock_skew_secs: 30,
            require_search_date_scope: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Allowed deviation from the reference price, in percent.
    pub tolerance_pct: f64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self { tolerance_pct: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HallucinationConfig {
    /// How close (in percent) a tool value must be to count as the source of a claim.
    pub citation_tolerance_pct: f64,
    /// Phrases that betray a fallback on training-time knowledge, checked in order.
    pub phrases: Vec<PhrasePattern>,
}

impl Default for HallucinationConfig {
    fn default() -> Self {
        let critical = [
            "as of my last update",
            "as of my knowledge cutoff",
            "based on my training data",
            "my training data",
            "last known price",
            "last known value",
            "i don't have real-time",
            "i do not have real-time",
            "i cannot access real-time",
        ];
        // Weaker evidence than a cutoff phrase: counted, but not blocking.
        let hedges = ["historically", "typically trades", "usually around"];

        let phrases = critical
            .iter()
            .map(|p| PhrasePattern::literal(*p, Severity::Critical))
            .chain(hedges.iter().map(|p| PhrasePattern::literal(*p, Severity::Warning)))
            .collect();

        Self {
            citation_tolerance_pct: 0.5,
            phrases,
        }
    }
}

/// One entry in the stale-language phrase list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhrasePattern {
    /// Literal phrase (matched case-insensitively) or regular expression.
    pub pattern: String,
    #[serde(default = "default_phrase_severity")]
    pub severity: Severity,
    /// Treat `pattern` as a regular expression instead of a literal.
    #[serde(default)]
    pub regex: bool,
}

impl PhrasePattern {
    pub fn literal(pattern: impl Into<String>, severity: Severity) -> Self {
        Self {
            pattern: pattern.into(),
            severity,
            regex: false,
        }
    }
}

fn default_phrase_severity() -> Severity {
    Severity::Critical
}

/// Inclusive plausible range for a symbol's price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Number of most recent reports the rolling rates are computed over.
    pub window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { window: 100 }
    }
}
