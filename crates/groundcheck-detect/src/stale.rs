//! Stale-language scan.
//!
//! Detects phrasing that betrays a fallback on training-time knowledge
//! ("as of my last update", "last known price"). The phrase list is
//! configuration data: each entry is a literal or a regular expression with
//! its own severity. Matching is case-insensitive for both kinds.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use groundcheck_contracts::{
    config::PhrasePattern,
    error::{GroundcheckError, GroundcheckResult},
    finding::{Category, Severity, ValidationFinding},
    trace::CallTrace,
};
use groundcheck_core::{claims::PriceClaim, traits::Scanner};

struct CompiledPhrase {
    pattern: String,
    severity: Severity,
    regex: Regex,
}

/// Flags answers that contain any configured stale-knowledge phrase.
pub struct StaleLanguageScan {
    phrases: Vec<CompiledPhrase>,
}

impl StaleLanguageScan {
    /// Compile `phrases`, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a pattern marked `regex` does not compile.
    pub fn new(phrases: &[PhrasePattern]) -> GroundcheckResult<Self> {
        let phrases = phrases
            .iter()
            .map(|phrase| {
                let source = if phrase.regex {
                    phrase.pattern.clone()
                } else {
                    regex::escape(&phrase.pattern)
                };
                let regex = RegexBuilder::new(&source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| GroundcheckError::ConfigError {
                        reason: format!("invalid phrase pattern '{}': {e}", phrase.pattern),
                    })?;
                Ok(CompiledPhrase {
                    pattern: phrase.pattern.clone(),
                    severity: phrase.severity,
                    regex,
                })
            })
            .collect::<GroundcheckResult<Vec<_>>>()?;

        Ok(Self { phrases })
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Scanner for StaleLanguageScan {
    fn name(&self) -> &str {
        "stale_language"
    }

    fn scan(&self, answer: &str, _claims: &[PriceClaim], _trace: &CallTrace) -> Vec<ValidationFinding> {
        self.phrases
            .iter()
            .filter_map(|phrase| {
                let matched = phrase.regex.find(answer)?;
                debug!(pattern = %phrase.pattern, at = matched.start(), "stale phrase matched");
                Some(ValidationFinding::fail(
                    Category::Hallucination,
                    "stale_language",
                    matched.as_str(),
                    format!(
                        "answer uses stale-knowledge phrasing \"{}\" instead of live tool data",
                        matched.as_str()
                    ),
                    phrase.severity,
                ))
            })
            .collect()
    }
}
