//! The bundled hallucination detector.

use tracing::debug;

use groundcheck_contracts::{
    config::EngineConfig,
    error::GroundcheckResult,
    finding::ValidationFinding,
    trace::CallTrace,
};
use groundcheck_core::{
    claims::{ClaimExtractor, PriceClaim},
    traits::Scanner,
};

use crate::{bounds::ImplausibleBoundScan, citation::UncitedClaimScan, stale::StaleLanguageScan};

/// Runs the stale-language, uncited-claim and implausible-bound scans in
/// that order and concatenates their findings.
///
/// The detector is itself a `Scanner`, so the orchestrator sees one scan.
/// Scans are independent: one scan's findings never suppress another's.
pub struct HallucinationDetector {
    scans: Vec<Box<dyn Scanner>>,
    extractor: ClaimExtractor,
}

impl HallucinationDetector {
    /// Build the standard three scans from a configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a regex phrase pattern does not compile.
    pub fn from_config(config: &EngineConfig) -> GroundcheckResult<Self> {
        let stale = StaleLanguageScan::new(&config.hallucination.phrases)?;
        let scans: Vec<Box<dyn Scanner>> = vec![
            Box::new(stale),
            Box::new(UncitedClaimScan::new(config.hallucination.citation_tolerance_pct)),
            Box::new(ImplausibleBoundScan::new(config.ranges.clone())),
        ];
        Ok(Self {
            scans,
            extractor: ClaimExtractor::with_symbols(config.ranges.keys().cloned()),
        })
    }

    /// Build a detector from arbitrary scans, run in the given order.
    pub fn with_scans(scans: Vec<Box<dyn Scanner>>) -> Self {
        Self {
            scans,
            extractor: ClaimExtractor::default(),
        }
    }

    /// Scan an answer standalone, extracting claims with the configured symbols.
    pub fn scan_answer(&self, answer: &str, trace: &CallTrace) -> Vec<ValidationFinding> {
        let claims = self.extractor.extract(answer);
        self.scan(answer, &claims, trace)
    }

    /// Names of the scans, in run order.
    pub fn scan_names(&self) -> Vec<&str> {
        self.scans.iter().map(|s| s.name()).collect()
    }
}

impl Scanner for HallucinationDetector {
    fn name(&self) -> &str {
        "hallucination_detector"
    }

    fn scan(&self, answer: &str, claims: &[PriceClaim], trace: &CallTrace) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        for scan in &self.scans {
            let found = scan.scan(answer, claims, trace);
            debug!(scan = scan.name(), findings = found.len(), "scan complete");
            findings.extend(found);
        }
        findings
    }
}
