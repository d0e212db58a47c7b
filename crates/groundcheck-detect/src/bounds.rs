//! Implausible-bound scan: sanity ranges per symbol, independent of citation.
//!
//! Only price figures are checked. A volume or market cap is not a price and
//! has no range.

use std::collections::BTreeMap;

use tracing::debug;

use groundcheck_contracts::{
    config::PriceRange,
    finding::{Category, Severity, ValidationFinding},
    trace::CallTrace,
};
use groundcheck_core::{claims::PriceClaim, traits::Scanner};

/// Flags claims whose value lies outside the configured range for their symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImplausibleBoundScan {
    ranges: BTreeMap<String, PriceRange>,
}

impl ImplausibleBoundScan {
    pub fn new(ranges: BTreeMap<String, PriceRange>) -> Self {
        Self { ranges }
    }
}

impl Scanner for ImplausibleBoundScan {
    fn name(&self) -> &str {
        "implausible_bound"
    }

    fn scan(&self, _answer: &str, claims: &[PriceClaim], _trace: &CallTrace) -> Vec<ValidationFinding> {
        claims
            .iter()
            .filter(|claim| claim.is_price())
            .filter_map(|claim| {
                let symbol = claim.symbol.as_deref()?;
                let range = self.ranges.get(symbol)?;
                if range.contains(claim.value) {
                    return None;
                }
                debug!(symbol, value = claim.value, "claim outside plausible range");
                Some(ValidationFinding::fail(
                    Category::Hallucination,
                    "implausible_bound",
                    format!("{symbol} {}", claim.text),
                    format!(
                        "{} for {symbol} is outside the plausible range [{}, {}]",
                        claim.text, range.min, range.max
                    ),
                    Severity::Critical,
                ))
            })
            .collect()
    }
}
