//! The validation orchestrator: one verdict per agent answer.
//!
//! The orchestrator runs every check in a fixed order:
//!
//!   Freshness → Price accuracy → Hallucination scans → Tool usage → Report
//!
//! Findings are appended in that order, and within each stage in trace or
//! claim order, so identical inputs always produce identical reports. Bad
//! data never aborts validation; it becomes a finding.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use groundcheck_contracts::{
    config::EngineConfig,
    error::GroundcheckResult,
    finding::{Category, Severity, ValidationFinding, ValidationReport},
    tool::{FreshnessClass, ToolName},
    trace::{CallTrace, ToolCallRecord},
};

use crate::{
    claims::{ClaimExtractor, PriceClaim},
    freshness::{self, FreshnessValidator},
    price::PriceAccuracyChecker,
    traits::{ReportSink, Scanner},
};

/// Composes the freshness validator, the price checker and a hallucination
/// scanner into a single `validate` call.
///
/// An orchestrator holds no per-request state. Build one per configuration
/// snapshot and share it across requests.
pub struct Orchestrator {
    freshness: FreshnessValidator,
    price: PriceAccuracyChecker,
    detector: Box<dyn Scanner>,
    /// Configured range symbols, always recognised as bare tickers.
    known_symbols: BTreeSet<String>,
    require_search_date_scope: bool,
}

impl Orchestrator {
    /// Create an orchestrator from a configuration snapshot and a detector.
    pub fn new(config: &EngineConfig, detector: Box<dyn Scanner>) -> Self {
        Self {
            freshness: FreshnessValidator::from_config(&config.freshness),
            price: PriceAccuracyChecker::from_config(&config.price),
            detector,
            known_symbols: config.ranges.keys().cloned().collect(),
            require_search_date_scope: config.freshness.require_search_date_scope,
        }
    }

    /// Validate one answer against the trace of tool calls that produced it.
    ///
    /// # Pipeline
    ///
    /// 1. Empty trace, or empty or whitespace-only answer → a single critical
    ///    `no_data` finding
    /// 2. Freshness, one finding per timestamped record
    /// 3. Price accuracy for the headline claim of every symbol:
    ///    - reference present → `price_accuracy`, critical on failure
    ///    - no reference → `price_unverifiable` warning
    /// 4. Hallucination scanner findings
    /// 5. Tool usage: presence, research, search date scope, completion
    ///
    /// `reference_now` is the only clock: `validate` never reads the wall clock.
    pub fn validate(
        &self,
        trace: &CallTrace,
        answer: &str,
        reference_prices: &BTreeMap<String, f64>,
        reference_now: DateTime<Utc>,
    ) -> ValidationReport {
        let response_id = trace.response_id.0.to_string();
        debug!(
            response_id = %response_id,
            records = trace.len(),
            answer_len = answer.len(),
            "validation starting"
        );

        let missing = match (trace.is_empty(), answer.trim().is_empty()) {
            (true, true) => Some(("trace and answer", "no tool calls and no answer; nothing to validate")),
            (false, true) => Some(("answer", "answer is empty; no recommendation to validate")),
            (true, false) => Some((
                "trace",
                "no tool calls recorded; the answer cannot be grounded in live data",
            )),
            (false, false) => None,
        };
        if let Some((subject, message)) = missing {
            warn!(response_id = %response_id, subject, "no data to validate");
            let finding =
                ValidationFinding::fail(Category::ToolUsage, "no_data", subject, message, Severity::Critical);
            return ValidationReport::from_findings(
                trace.response_id,
                reference_now,
                vec![finding],
                trace.usage_summary(),
            );
        }

        let mut findings = Vec::new();

        // ── Stage 1: Freshness ───────────────────────────────────────────────
        findings.extend(self.freshness_findings(trace, reference_now));
        debug!(response_id = %response_id, findings = findings.len(), "freshness checked");

        // ── Stage 2: Price accuracy ──────────────────────────────────────────
        let claims = self.extractor(reference_prices).extract(answer);
        findings.extend(self.price_findings(&claims, reference_prices));
        debug!(response_id = %response_id, claims = claims.len(), "price claims checked");

        // ── Stage 3: Hallucination scans ─────────────────────────────────────
        let scanned = self.detector.scan(answer, &claims, trace);
        debug!(
            response_id = %response_id,
            scanner = self.detector.name(),
            findings = scanned.len(),
            "hallucination scan complete"
        );
        findings.extend(scanned);

        // ── Stage 4: Tool usage ──────────────────────────────────────────────
        findings.extend(self.tool_usage_findings(trace, reference_now));

        let report =
            ValidationReport::from_findings(trace.response_id, reference_now, findings, trace.usage_summary());

        if report.overall_passed {
            debug!(
                response_id = %response_id,
                findings = report.findings.len(),
                "validation passed"
            );
        } else {
            warn!(
                response_id = %response_id,
                critical = report.critical_count(),
                hallucinations = report.hallucination_count,
                "validation failed"
            );
        }

        report
    }

    /// `validate`, then hand the report to `sink` (usually the production monitor).
    ///
    /// # Errors
    ///
    /// Returns the sink's error if it cannot ingest the report. Validation
    /// itself never fails.
    pub fn validate_into(
        &self,
        trace: &CallTrace,
        answer: &str,
        reference_prices: &BTreeMap<String, f64>,
        reference_now: DateTime<Utc>,
        sink: &dyn ReportSink,
    ) -> GroundcheckResult<ValidationReport> {
        let report = self.validate(trace, answer, reference_prices, reference_now);
        sink.ingest(&report)?;
        Ok(report)
    }

    fn extractor(&self, reference_prices: &BTreeMap<String, f64>) -> ClaimExtractor {
        let known: BTreeSet<&str> = reference_prices
            .keys()
            .chain(self.known_symbols.iter())
            .map(String::as_str)
            .collect();
        ClaimExtractor::with_symbols(known)
    }

    fn freshness_findings(&self, trace: &CallTrace, reference_now: DateTime<Utc>) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();

        for record in trace.iter() {
            let Some(class) = record.tool_name.freshness_class() else {
                continue;
            };
            let timestamps = record.response.timestamps();
            if timestamps.is_empty() {
                continue;
            }

            let fail_severity = match class {
                FreshnessClass::Tight => Severity::Critical,
                FreshnessClass::Loose => Severity::Warning,
            };
            let subject = record_subject(record);
            let max_age = self.freshness.window(class);

            let mut oldest: Option<Duration> = None;
            let mut stale = 0usize;
            let mut future = 0usize;
            let mut furthest_ahead = Duration::zero();
            let mut malformed = None;
            for timestamp in &timestamps {
                match self.freshness.assess(timestamp, class, reference_now) {
                    Ok(assessment) => {
                        if !assessment.fresh && assessment.age < Duration::zero() {
                            future += 1;
                            furthest_ahead = furthest_ahead.max(-assessment.age);
                        } else if !assessment.fresh {
                            stale += 1;
                        }
                        oldest = Some(oldest.map_or(assessment.age, |o| o.max(assessment.age)));
                    }
                    Err(e) if malformed.is_none() => malformed = Some(e),
                    Err(_) => {}
                }
            }

            let finding = if let Some(err) = malformed {
                warn!(record = %subject, error = %err, "unparsable timestamp");
                ValidationFinding::fail(
                    Category::Freshness,
                    "freshness",
                    subject,
                    format!("cannot judge freshness: {err}"),
                    fail_severity,
                )
            } else if stale + future > 0 {
                let age = oldest.unwrap_or_else(Duration::zero);
                let total = timestamps.len();
                let mut problems = Vec::new();
                if stale > 0 {
                    problems.push(if total > 1 {
                        format!(
                            "{stale} of {total} results stale; oldest is {} old (max {})",
                            freshness::human_duration(age),
                            freshness::human_duration(max_age)
                        )
                    } else {
                        format!(
                            "data is {} old (max {})",
                            freshness::human_duration(age),
                            freshness::human_duration(max_age)
                        )
                    });
                }
                if future > 0 {
                    problems.push(if total > 1 {
                        format!(
                            "{future} of {total} results dated up to {} in the future, beyond the clock-skew allowance",
                            freshness::human_duration(furthest_ahead)
                        )
                    } else {
                        format!(
                            "timestamp lies {} in the future, beyond the clock-skew allowance",
                            freshness::human_duration(furthest_ahead)
                        )
                    });
                }
                let message = problems.join("; ");
                warn!(record = %subject, stale, future, "stale tool data");
                ValidationFinding::fail(Category::Freshness, "freshness", subject, message, fail_severity)
            } else {
                let age = oldest.unwrap_or_else(Duration::zero);
                ValidationFinding::pass(
                    Category::Freshness,
                    "freshness",
                    subject,
                    format!(
                        "data is {} old (max {})",
                        freshness::human_duration(age),
                        freshness::human_duration(max_age)
                    ),
                )
            };
            findings.push(finding);
        }

        findings
    }

    fn price_findings(
        &self,
        claims: &[PriceClaim],
        reference_prices: &BTreeMap<String, f64>,
    ) -> Vec<ValidationFinding> {
        claims
            .iter()
            .filter(|c| c.headline)
            .filter_map(|claim| {
                let symbol = claim.symbol.as_deref()?;
                let finding = match reference_prices.get(symbol) {
                    Some(&reference) => {
                        let result = self.price.check(symbol, claim.value, reference);
                        if result.passed {
                            ValidationFinding::pass(Category::PriceAccuracy, "price_accuracy", symbol, result.detail)
                        } else {
                            warn!(symbol, claimed = claim.value, reference, "claimed price rejected");
                            ValidationFinding::fail(
                                Category::PriceAccuracy,
                                "price_accuracy",
                                symbol,
                                result.detail,
                                Severity::Critical,
                            )
                        }
                    }
                    None => ValidationFinding::fail(
                        Category::PriceAccuracy,
                        "price_unverifiable",
                        symbol,
                        format!("no reference price for {symbol}; claim of {} cannot be verified", claim.text),
                        Severity::Warning,
                    ),
                };
                Some(finding)
            })
            .collect()
    }

    /// Only reached with a non-empty trace; an empty one is `no_data`.
    fn tool_usage_findings(&self, trace: &CallTrace, reference_now: DateTime<Utc>) -> Vec<ValidationFinding> {
        let mut findings = vec![ValidationFinding::pass(
            Category::ToolUsage,
            "tool_presence",
            "trace",
            format!("{} tool call(s) recorded", trace.len()),
        )];

        findings.push(if trace.has_research() {
            let count = trace.iter().filter(|r| r.tool_name.is_research()).count();
            ValidationFinding::pass(
                Category::ToolUsage,
                "research_presence",
                "trace",
                format!("{count} search/browse call(s) provide context"),
            )
        } else {
            ValidationFinding::fail(
                Category::ToolUsage,
                "research_presence",
                "trace",
                "no web_search or browse_page calls; the recommendation lacks research context",
                Severity::Critical,
            )
        });

        if self.require_search_date_scope {
            let today = reference_now.date_naive();
            for record in trace.by_tool(ToolName::WebSearch) {
                let query = record.string_param("query").unwrap_or_default();
                if freshness::has_date_scope(query, today) {
                    continue;
                }
                let bound = if freshness::has_upper_bound(query) {
                    "has a before: bound"
                } else {
                    "has no before: bound either"
                };
                findings.push(ValidationFinding::fail(
                    Category::ToolUsage,
                    "search_date_scope",
                    record_subject(record),
                    format!("query {query:?} is missing after:{} and {bound}", today.format("%Y-%m-%d")),
                    Severity::Warning,
                ));
            }
        }

        for record in trace.iter().filter(|r| r.completed_at.is_none()) {
            findings.push(ValidationFinding::fail(
                Category::ToolUsage,
                "record_completion",
                record_subject(record),
                "tool call never completed; its data may be partial",
                Severity::Warning,
            ));
        }

        findings
    }
}

fn record_subject(record: &ToolCallRecord) -> String {
    format!("{} #{}", record.tool_name, record.sequence)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use serde_json::json;

    use groundcheck_contracts::{
        error::GroundcheckError,
        tool::{SearchResult, ToolResponse},
        trace::{Parameters, RecordId, ResponseId},
    };

    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 18, 14, 35, 0).unwrap()
    }

    fn record(sequence: u64, response: ToolResponse, parameters: Parameters) -> ToolCallRecord {
        let issued_at = now() - Duration::minutes(3);
        ToolCallRecord {
            id: RecordId(sequence),
            sequence,
            tool_name: response.tool(),
            parameters,
            response,
            issued_at,
            completed_at: Some(issued_at + Duration::milliseconds(400)),
        }
    }

    fn search(sequence: u64, query: &str, timestamp: &str) -> ToolCallRecord {
        let mut params = Parameters::new();
        params.insert("query".to_string(), json!(query));
        record(
            sequence,
            ToolResponse::WebSearch {
                results: vec![SearchResult {
                    title: "Bitcoin Price Hits New High".to_string(),
                    url: "https://www.coindesk.com/price/bitcoin".to_string(),
                    snippet: "Bitcoin (BTC) trading at $119,856.45".to_string(),
                    timestamp: timestamp.to_string(),
                }],
            },
            params,
        )
    }

    fn price(sequence: u64, symbol: &str, value: f64, timestamp: &str) -> ToolCallRecord {
        let mut params = Parameters::new();
        params.insert("symbol".to_string(), json!(symbol));
        record(
            sequence,
            ToolResponse::FetchPrice {
                symbol: symbol.to_string(),
                price: value,
                timestamp: timestamp.to_string(),
            },
            params,
        )
    }

    fn trace(records: Vec<ToolCallRecord>) -> CallTrace {
        CallTrace {
            response_id: ResponseId::new(),
            records,
        }
    }

    fn fresh_trace() -> CallTrace {
        trace(vec![
            search(0, "bitcoin price after:2024-12-18 before:2024-12-19", "2024-12-18T14:32:00Z"),
            price(1, "BTC-USD", 119_743.21, "2024-12-18T14:33:15Z"),
        ])
    }

    fn btc_reference() -> BTreeMap<String, f64> {
        BTreeMap::from([("BTC-USD".to_string(), 119_743.21)])
    }

    /// A scanner that returns pre-configured findings and counts its calls.
    struct MockScanner {
        findings: Vec<ValidationFinding>,
        calls: Arc<Mutex<u32>>,
    }

    impl MockScanner {
        fn clean() -> Self {
            Self {
                findings: vec![],
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn flagging(finding: ValidationFinding) -> Self {
            Self {
                findings: vec![finding],
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl Scanner for MockScanner {
        fn name(&self) -> &str {
            "mock"
        }

        fn scan(&self, _answer: &str, _claims: &[PriceClaim], _trace: &CallTrace) -> Vec<ValidationFinding> {
            *self.calls.lock().unwrap() += 1;
            self.findings.clone()
        }
    }

    /// A sink that keeps every report, or fails on demand.
    struct MockSink {
        reports: Mutex<Vec<ValidationReport>>,
        fail: bool,
    }

    impl ReportSink for MockSink {
        fn ingest(&self, report: &ValidationReport) -> GroundcheckResult<()> {
            if self.fail {
                return Err(GroundcheckError::MonitorWriteFailed {
                    reason: "lock poisoned".to_string(),
                });
            }
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn orchestrator(scanner: MockScanner) -> Orchestrator {
        Orchestrator::new(&EngineConfig::default(), Box::new(scanner))
    }

    fn checks(report: &ValidationReport) -> Vec<(&str, bool)> {
        report.findings.iter().map(|f| (f.check.as_str(), f.passed)).collect()
    }

    // ── Happy path ───────────────────────────────────────────────────────────

    #[test]
    fn fresh_accurate_answer_passes() {
        let report = orchestrator(MockScanner::clean()).validate(
            &fresh_trace(),
            "BTC-USD is trading at $119,750. Buy with target $125,000.",
            &btc_reference(),
            now(),
        );

        assert!(report.overall_passed, "unexpected failures: {:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(
            checks(&report),
            vec![
                ("freshness", true),
                ("freshness", true),
                ("price_accuracy", true),
                ("tool_presence", true),
                ("research_presence", true),
            ]
        );
        assert_eq!(report.fresh_data_ratio, 1.0);
        assert_eq!(report.price_accurate_ratio, 1.0);
        assert_eq!(report.tool_calls_total, 2);
        assert_eq!(report.evaluated_at, now());
        assert!(report.findings.iter().all(|f| f.severity == Severity::Info));
    }

    // ── Freshness ────────────────────────────────────────────────────────────

    #[test]
    fn stale_price_is_critical() {
        let trace = trace(vec![
            search(0, "bitcoin after:2024-12-18", "2024-12-18T14:32:00Z"),
            price(1, "BTC-USD", 119_743.21, "2024-12-18T14:25:00Z"),
        ]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let stale = report
            .in_category(Category::Freshness)
            .find(|f| !f.passed)
            .expect("stale price must be flagged");
        assert_eq!(stale.severity, Severity::Critical);
        assert_eq!(stale.subject, "fetch_price #1");
        assert!(stale.message.contains("10m 0s"), "message should state the age: {}", stale.message);
        assert!(!report.overall_passed);
        assert_eq!(report.fresh_data_ratio, 0.5);
    }

    #[test]
    fn stale_news_is_only_a_warning() {
        let trace = trace(vec![
            search(0, "bitcoin after:2024-12-18", "2024-12-16T09:00:00Z"),
            price(1, "BTC-USD", 119_743.21, "2024-12-18T14:33:15Z"),
        ]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let stale: Vec<_> = report.in_category(Category::Freshness).filter(|f| !f.passed).collect();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].severity, Severity::Warning);
        assert!(report.overall_passed, "a stale news result must not block");
    }

    #[test]
    fn search_is_fresh_only_if_every_result_is() {
        let mut mixed = search(0, "bitcoin after:2024-12-18", "2024-12-18T14:32:00Z");
        if let ToolResponse::WebSearch { results } = &mut mixed.response {
            let mut old = results[0].clone();
            old.timestamp = "2024-12-01T00:00:00Z".to_string();
            results.push(old);
        }
        let report = orchestrator(MockScanner::clean()).validate(
            &trace(vec![mixed]),
            "Bitcoin looks strong.",
            &BTreeMap::new(),
            now(),
        );

        let finding = report.in_category(Category::Freshness).next().unwrap();
        assert!(!finding.passed);
        assert!(finding.message.contains("1 of 2 results stale"), "{}", finding.message);
    }

    #[test]
    fn future_dated_search_result_is_named_in_the_message() {
        let mut mixed = search(0, "bitcoin after:2024-12-18", "2024-12-18T14:32:00Z");
        if let ToolResponse::WebSearch { results } = &mut mixed.response {
            let mut ahead = results[0].clone();
            ahead.timestamp = "2024-12-18T15:35:00Z".to_string();
            results.push(ahead);
        }
        let report = orchestrator(MockScanner::clean()).validate(
            &trace(vec![mixed]),
            "Bitcoin looks strong.",
            &BTreeMap::new(),
            now(),
        );

        let finding = report.in_category(Category::Freshness).next().unwrap();
        assert!(!finding.passed);
        assert!(
            finding.message.contains("1 of 2 results dated up to 1h 0m in the future"),
            "{}",
            finding.message
        );
        assert!(!finding.message.contains("stale"), "nothing is old: {}", finding.message);
    }

    #[test]
    fn future_dated_quote_beyond_skew_fails() {
        let trace = trace(vec![
            search(0, "bitcoin after:2024-12-18", "2024-12-18T14:32:00Z"),
            price(1, "BTC-USD", 119_743.21, "2024-12-18T14:40:00Z"),
        ]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let finding = report.in_category(Category::Freshness).nth(1).unwrap();
        assert!(!finding.passed);
        assert_eq!(finding.severity, Severity::Critical);
        assert!(finding.message.contains("5m 0s in the future"), "{}", finding.message);
    }

    #[test]
    fn malformed_timestamp_fails_freshness() {
        let trace = trace(vec![
            search(0, "bitcoin after:2024-12-18", "2024-12-18T14:32:00Z"),
            price(1, "BTC-USD", 119_743.21, "sometime yesterday"),
        ]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let finding = report.in_category(Category::Freshness).nth(1).unwrap();
        assert!(!finding.passed);
        assert_eq!(finding.severity, Severity::Critical);
        assert!(finding.message.contains("malformed timestamp"), "{}", finding.message);
    }

    #[test]
    fn code_execution_has_no_freshness_finding() {
        let trace = trace(vec![record(
            0,
            ToolResponse::CodeExecution {
                output: "RSI(14) = 62.3".to_string(),
            },
            Parameters::new(),
        )]);
        let report = orchestrator(MockScanner::clean()).validate(&trace, "RSI is neutral.", &BTreeMap::new(), now());
        assert_eq!(report.in_category(Category::Freshness).count(), 0);
        assert_eq!(report.fresh_data_ratio, 1.0);
    }

    // ── Price accuracy ───────────────────────────────────────────────────────

    #[test]
    fn wrong_headline_price_is_critical() {
        let report = orchestrator(MockScanner::clean()).validate(
            &fresh_trace(),
            "BTC-USD is trading at $60,000.",
            &btc_reference(),
            now(),
        );

        let finding = report.in_category(Category::PriceAccuracy).next().unwrap();
        assert_eq!(finding.check, "price_accuracy");
        assert!(!finding.passed);
        assert_eq!(finding.severity, Severity::Critical);
        assert!(!report.overall_passed);
        assert_eq!(report.price_accurate_ratio, 0.0);
    }

    #[test]
    fn derived_levels_are_not_accuracy_checked() {
        let report = orchestrator(MockScanner::clean()).validate(
            &fresh_trace(),
            "BTC-USD at $119,750, target $140,000, stop $110,000",
            &btc_reference(),
            now(),
        );
        assert_eq!(report.in_category(Category::PriceAccuracy).count(), 1);
        assert!(report.overall_passed);
    }

    #[test]
    fn symbol_without_reference_is_unverifiable_warning() {
        let report = orchestrator(MockScanner::clean()).validate(
            &fresh_trace(),
            "BTC-USD at $119,750 and ETH-USD at $3,987",
            &btc_reference(),
            now(),
        );

        let unverifiable: Vec<_> = report.findings.iter().filter(|f| f.check == "price_unverifiable").collect();
        assert_eq!(unverifiable.len(), 1);
        assert_eq!(unverifiable[0].subject, "ETH-USD");
        assert_eq!(unverifiable[0].severity, Severity::Warning);
        assert!(report.overall_passed);
        assert_eq!(report.price_accurate_ratio, 0.5);
    }

    #[test]
    fn configured_range_symbols_are_recognised() {
        let mut config = EngineConfig::default();
        config.ranges.insert(
            "NVDA".to_string(),
            groundcheck_contracts::config::PriceRange { min: 1.0, max: 10_000.0 },
        );
        let orchestrator = Orchestrator::new(&config, Box::new(MockScanner::clean()));

        let report = orchestrator.validate(&fresh_trace(), "NVDA closed at $140.15", &BTreeMap::new(), now());
        let finding = report.in_category(Category::PriceAccuracy).next().unwrap();
        assert_eq!(finding.subject, "NVDA");
        assert_eq!(finding.check, "price_unverifiable");
    }

    // ── Hallucination scans ──────────────────────────────────────────────────

    #[test]
    fn scanner_findings_are_appended_and_counted() {
        let scanner = MockScanner::flagging(ValidationFinding::fail(
            Category::Hallucination,
            "stale_language",
            "as of my last update",
            "answer relies on training-time knowledge",
            Severity::Critical,
        ));
        let calls = scanner.calls.clone();
        let report = orchestrator(scanner).validate(
            &fresh_trace(),
            "As of my last update, BTC-USD was $119,750.",
            &btc_reference(),
            now(),
        );

        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(report.hallucination_count, 1);
        assert!(!report.overall_passed);
    }

    #[test]
    fn scanner_is_not_called_for_empty_answer() {
        let scanner = MockScanner::clean();
        let calls = scanner.calls.clone();
        orchestrator(scanner).validate(&fresh_trace(), "   \n", &btc_reference(), now());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    // ── Tool usage ───────────────────────────────────────────────────────────

    #[test]
    fn empty_trace_and_empty_answer_yield_single_critical_finding() {
        let report = orchestrator(MockScanner::clean()).validate(
            &CallTrace::empty(ResponseId::new()),
            "",
            &BTreeMap::new(),
            now(),
        );

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].check, "no_data");
        assert_eq!(report.findings[0].severity, Severity::Critical);
        assert!(!report.overall_passed);
    }

    #[test]
    fn empty_trace_with_answer_is_no_data() {
        let scanner = MockScanner::clean();
        let calls = scanner.calls.clone();
        let report = orchestrator(scanner).validate(
            &CallTrace::empty(ResponseId::new()),
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        assert_eq!(report.findings.len(), 1, "findings: {:?}", report.findings);
        let finding = &report.findings[0];
        assert_eq!(finding.check, "no_data");
        assert_eq!(finding.category, Category::ToolUsage);
        assert_eq!(finding.subject, "trace");
        assert!(finding.is_blocking());
        assert!(!report.overall_passed);
        assert_eq!(report.tool_calls_total, 0);
        assert_eq!(*calls.lock().unwrap(), 0, "nothing to scan without a trace");
    }

    #[test]
    fn price_only_trace_lacks_research() {
        let trace = trace(vec![price(0, "BTC-USD", 119_743.21, "2024-12-18T14:33:15Z")]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let research = report.findings.iter().find(|f| f.check == "research_presence").unwrap();
        assert!(research.is_blocking());
        assert!(!report.overall_passed);
    }

    #[test]
    fn unscoped_search_query_is_warned() {
        let trace = trace(vec![
            search(0, "bitcoin price today", "2024-12-18T14:32:00Z"),
            price(1, "BTC-USD", 119_743.21, "2024-12-18T14:33:15Z"),
        ]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let scope = report.findings.iter().find(|f| f.check == "search_date_scope").unwrap();
        assert_eq!(scope.severity, Severity::Warning);
        assert!(scope.message.contains("after:2024-12-18"), "{}", scope.message);
        assert!(scope.message.contains("no before:"), "{}", scope.message);
        assert!(report.overall_passed);
    }

    #[test]
    fn date_scope_check_can_be_disabled() {
        let mut config = EngineConfig::default();
        config.freshness.require_search_date_scope = false;
        let trace = trace(vec![search(0, "bitcoin price today", "2024-12-18T14:32:00Z")]);
        let report = Orchestrator::new(&config, Box::new(MockScanner::clean())).validate(
            &trace,
            "Bitcoin looks strong.",
            &BTreeMap::new(),
            now(),
        );
        assert!(report.findings.iter().all(|f| f.check != "search_date_scope"));
    }

    #[test]
    fn in_flight_record_is_warned() {
        let mut pending = price(1, "BTC-USD", 119_743.21, "2024-12-18T14:33:15Z");
        pending.completed_at = None;
        let trace = trace(vec![search(0, "bitcoin after:2024-12-18", "2024-12-18T14:32:00Z"), pending]);
        let report = orchestrator(MockScanner::clean()).validate(
            &trace,
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
        );

        let completion = report.findings.iter().find(|f| f.check == "record_completion").unwrap();
        assert_eq!(completion.subject, "fetch_price #1");
        assert_eq!(completion.severity, Severity::Warning);
    }

    // ── Determinism and sinks ────────────────────────────────────────────────

    #[test]
    fn validate_is_deterministic() {
        let orchestrator = orchestrator(MockScanner::clean());
        let trace = fresh_trace();
        let answer = "BTC-USD is $119,750 and ETH-USD is $3,987. Historically strong.";

        let first = orchestrator.validate(&trace, answer, &btc_reference(), now());
        let second = orchestrator.validate(&trace, answer, &btc_reference(), now());
        assert_eq!(first, second);
    }

    #[test]
    fn validate_into_hands_report_to_sink() {
        let sink = MockSink {
            reports: Mutex::new(vec![]),
            fail: false,
        };
        let report = orchestrator(MockScanner::clean())
            .validate_into(&fresh_trace(), "BTC-USD is $119,750", &btc_reference(), now(), &sink)
            .unwrap();

        let stored = sink.reports.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], report);
    }

    #[test]
    fn validate_into_propagates_sink_failure() {
        let sink = MockSink {
            reports: Mutex::new(vec![]),
            fail: true,
        };
        let result = orchestrator(MockScanner::clean()).validate_into(
            &fresh_trace(),
            "BTC-USD is $119,750",
            &btc_reference(),
            now(),
            &sink,
        );
        assert!(matches!(result, Err(GroundcheckError::MonitorWriteFailed { .. })));
    }
}
