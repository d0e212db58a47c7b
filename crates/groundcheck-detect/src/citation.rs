//! Uncited-numeric-claim scan.
//!
//! Every price the answer asserts should trace back to a value some tool
//! actually returned: a structured number (a quote, an extracted field) or a
//! number quoted in tool text (a search snippet, page content, program
//! output). A claim with no such source was produced from memory.

use tracing::debug;

use groundcheck_contracts::{
    finding::{Category, Severity, ValidationFinding},
    trace::CallTrace,
};
use groundcheck_core::{
    claims::{numbers_in, PriceClaim},
    traits::Scanner,
};

/// Flags price claims that no tool output supports.
///
/// Uncited headline prices are critical; other uncited figures (targets,
/// stops, unattached amounts) are warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct UncitedClaimScan {
    tolerance_pct: f64,
}

impl UncitedClaimScan {
    pub fn new(tolerance_pct: f64) -> Self {
        Self { tolerance_pct }
    }

    fn sources(trace: &CallTrace) -> Vec<f64> {
        trace
            .iter()
            .flat_map(|record| {
                let mut values = record.response.numeric_values();
                for text in record.response.text_fields() {
                    values.extend(numbers_in(text));
                }
                values
            })
            .filter(|v| v.is_finite())
            .collect()
    }

    fn is_cited(&self, claim: f64, sources: &[f64]) -> bool {
        sources.iter().any(|&source| {
            if source == 0.0 {
                claim == 0.0
            } else {
                (claim - source).abs() / source.abs() * 100.0 <= self.tolerance_pct
            }
        })
    }
}

impl Scanner for UncitedClaimScan {
    fn name(&self) -> &str {
        "uncited_claim"
    }

    fn scan(&self, _answer: &str, claims: &[PriceClaim], trace: &CallTrace) -> Vec<ValidationFinding> {
        if claims.is_empty() {
            return Vec::new();
        }
        let sources = Self::sources(trace);
        debug!(claims = claims.len(), sources = sources.len(), "checking claim citations");

        claims
            .iter()
            .filter(|claim| !self.is_cited(claim.value, &sources))
            .map(|claim| {
                let (severity, role) = match (&claim.quantity, claim.headline) {
                    (_, true) => (Severity::Critical, "headline price"),
                    (Some(quantity), false) => (Severity::Warning, quantity.as_str()),
                    (None, false) => (Severity::Warning, "figure"),
                };
                let subject = match &claim.symbol {
                    Some(symbol) => format!("{symbol} {}", claim.text),
                    None => claim.text.clone(),
                };
                ValidationFinding::fail(
                    Category::Hallucination,
                    "uncited_claim",
                    subject,
                    format!(
                        "{role} {} matches no value returned by the {} tool call(s) (tolerance {}%)",
                        claim.text,
                        trace.len(),
                        self.tolerance_pct
                    ),
                    severity,
                )
            })
            .collect()
    }
}
