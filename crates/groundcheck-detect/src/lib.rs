//! # groundcheck-detect
//!
//! Hallucination scans for tool-grounded trading answers.
//!
//! Each scan implements `groundcheck_core::traits::Scanner` and reports
//! failures only:
//!
//! - `StaleLanguageScan`: training-time phrasing from a configurable list
//! - `UncitedClaimScan`: prices that match no tool output
//! - `ImplausibleBoundScan`: prices outside a symbol's plausible range
//!
//! `HallucinationDetector` bundles the three behind a single `Scanner`.

pub mod bounds;
pub mod citation;
pub mod detector;
pub mod stale;

pub use bounds::ImplausibleBoundScan;
pub use citation::UncitedClaimScan;
pub use detector::HallucinationDetector;
pub use stale::StaleLanguageScan;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};

    use groundcheck_contracts::{
        config::{EngineConfig, PhrasePattern, PriceRange},
        error::GroundcheckError,
        finding::{Category, Severity},
        tool::ToolResponse,
        trace::{CallTrace, Parameters, RecordId, ResponseId, ToolCallRecord},
    };
    use groundcheck_core::traits::Scanner;

    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config
            .ranges
            .insert("BTC-USD".to_string(), PriceRange { min: 10_000.0, max: 1_000_000.0 });
        config
    }

    fn quote_trace(price: f64) -> CallTrace {
        let issued_at = Utc.with_ymd_and_hms(2024, 12, 18, 14, 33, 0).unwrap();
        let response = ToolResponse::FetchPrice {
            symbol: "BTC-USD".to_string(),
            price,
            timestamp: "2024-12-18T14:33:15Z".to_string(),
        };
        CallTrace {
            response_id: ResponseId::new(),
            records: vec![ToolCallRecord {
                id: RecordId(0),
                sequence: 0,
                tool_name: response.tool(),
                parameters: Parameters::new(),
                response,
                issued_at,
                completed_at: Some(issued_at),
            }],
        }
    }

    // ── Detector ─────────────────────────────────────────────────────────────

    #[test]
    fn scans_run_in_fixed_order() {
        let detector = HallucinationDetector::from_config(&config()).unwrap();
        assert_eq!(detector.scan_names(), vec!["stale_language", "uncited_claim", "implausible_bound"]);
    }

    #[test]
    fn grounded_answer_is_clean() {
        let detector = HallucinationDetector::from_config(&config()).unwrap();
        let findings = detector.scan_answer("BTC is trading at $119,750 right now.", &quote_trace(119_743.21));
        assert!(findings.is_empty(), "unexpected findings: {findings:?}");
    }

    #[test]
    fn scans_are_independent() {
        let detector = HallucinationDetector::from_config(&config()).unwrap();
        let findings = detector.scan_answer(
            "As of my last update, BTC-USD was $1,500.",
            &quote_trace(119_743.21),
        );

        let checks: Vec<&str> = findings.iter().map(|f| f.check.as_str()).collect();
        assert_eq!(checks, vec!["stale_language", "uncited_claim", "implausible_bound"]);
        assert!(findings.iter().all(|f| f.category == Category::Hallucination && !f.passed));
        assert!(findings.iter().all(|f| f.severity == Severity::Critical));
    }

    #[test]
    fn invalid_phrase_regex_rejects_config() {
        let mut config = config();
        config.hallucination.phrases.push(PhrasePattern {
            pattern: "[".to_string(),
            severity: Severity::Warning,
            regex: true,
        });
        assert!(matches!(
            HallucinationDetector::from_config(&config),
            Err(GroundcheckError::ConfigError { .. })
        ));
    }

    #[test]
    fn custom_scan_list_is_respected() {
        let detector = HallucinationDetector::with_scans(vec![Box::new(ImplausibleBoundScan::new(BTreeMap::new()))]);
        assert_eq!(detector.scan_names(), vec!["implausible_bound"]);
        assert!(detector
            .scan("As of my last update", &[], &CallTrace::empty(ResponseId::new()))
            .is_empty());
    }
}
