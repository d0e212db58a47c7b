//! Data freshness checks.
//!
//! A datum is fresh when `reference_now - timestamp` is at most the allowed
//! age. The boundary is inclusive. Timestamps further in the future than the
//! clock-skew allowance are not fresh either: a quote from the future is as
//! untrustworthy as a stale one.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use groundcheck_contracts::{
    config::FreshnessConfig,
    error::{GroundcheckError, GroundcheckResult},
    tool::FreshnessClass,
};

/// Default tolerance for timestamps slightly ahead of `reference_now`.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 30;

/// Naive layouts accepted after RFC 3339. Naive values are read as UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%B %d, %Y %H:%M:%S",
];

/// Parse a tool-reported time value into an absolute UTC instant.
pub fn parse_timestamp(value: &str) -> GroundcheckResult<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GroundcheckError::MalformedTimestamp {
            value: value.to_string(),
            reason: "empty value".to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(GroundcheckError::MalformedTimestamp {
        value: value.to_string(),
        reason: "not RFC 3339, ISO 8601, or 'Month DD, YYYY HH:MM:SS'".to_string(),
    })
}

/// True if `timestamp` is within `max_age` of `reference_now`.
pub fn is_fresh_at(
    timestamp: DateTime<Utc>,
    reference_now: DateTime<Utc>,
    max_age: Duration,
    clock_skew: Duration,
) -> bool {
    let elapsed = reference_now - timestamp;
    if elapsed < -clock_skew {
        return false;
    }
    elapsed <= max_age
}

/// Parse `timestamp` and check it against `max_age` with the default clock skew.
///
/// Returns `Ok(false)` for stale or future data and `Err(MalformedTimestamp)`
/// only when the value cannot be parsed at all.
pub fn is_fresh(timestamp: &str, reference_now: DateTime<Utc>, max_age: Duration) -> GroundcheckResult<bool> {
    let parsed = parse_timestamp(timestamp)?;
    Ok(is_fresh_at(
        parsed,
        reference_now,
        max_age,
        Duration::seconds(DEFAULT_CLOCK_SKEW_SECS),
    ))
}

/// True if `query` carries the lower-bound marker `after:<expected_date>`.
///
/// Purely textual: it does not (and cannot) confirm the search backend
/// honoured the marker.
pub fn has_date_scope(query: &str, expected_date: NaiveDate) -> bool {
    let marker = format!("after:{}", expected_date.format("%Y-%m-%d"));
    query_tokens(query).any(|token| token == marker)
}

/// True if `query` carries any `before:<date>` upper-bound marker.
pub fn has_upper_bound(query: &str) -> bool {
    query_tokens(query).any(|token| token.len() > "before:".len() && token.starts_with("before:"))
}

fn query_tokens(query: &str) -> impl Iterator<Item = &str> {
    query
        .split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '(' | ')' | ','))
        .filter(|t| !t.is_empty())
}

/// The result of checking one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessAssessment {
    pub fresh: bool,
    /// `reference_now - timestamp`; negative for future timestamps.
    pub age: Duration,
    pub max_age: Duration,
}

/// Freshness checks with the configured tight/loose windows.
#[derive(Debug, Clone, PartialEq)]
pub struct FreshnessValidator {
    tight: Duration,
    loose: Duration,
    clock_skew: Duration,
}

impl FreshnessValidator {
    pub fn new(tight: Duration, loose: Duration, clock_skew: Duration) -> Self {
        Self {
            tight,
            loose,
            clock_skew,
        }
    }

    /// Windows beyond what `Duration` can hold saturate.
    pub fn from_config(config: &FreshnessConfig) -> Self {
        Self::new(
            saturating_seconds(config.tight_window_secs),
            saturating_seconds(config.loose_window_secs),
            saturating_seconds(config.clock_skew_secs),
        )
    }

    /// The maximum age allowed for data of `class`.
    pub fn window(&self, class: FreshnessClass) -> Duration {
        match class {
            FreshnessClass::Tight => self.tight,
            FreshnessClass::Loose => self.loose,
        }
    }

    /// Parse `timestamp` and judge it against the window for `class`.
    pub fn assess(
        &self,
        timestamp: &str,
        class: FreshnessClass,
        reference_now: DateTime<Utc>,
    ) -> GroundcheckResult<FreshnessAssessment> {
        let parsed = parse_timestamp(timestamp)?;
        let max_age = self.window(class);
        Ok(FreshnessAssessment {
            fresh: is_fresh_at(parsed, reference_now, max_age, self.clock_skew),
            age: reference_now - parsed,
            max_age,
        })
    }
}

fn saturating_seconds(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(if secs < 0 { Duration::MIN } else { Duration::MAX })
}

impl Default for FreshnessValidator {
    fn default() -> Self {
        Self::from_config(&FreshnessConfig::default())
    }
}

/// Render a duration as `"12m 5s"`, `"3h 2m"`, or `"-40s"` for future values.
pub fn human_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.abs();
    if secs >= 3600 {
        format!("{sign}{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{sign}{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{sign}{secs}s")
    }
}
