//! Price accuracy checks.
//!
//! Deviation is measured relative to the reference price, so the tolerance
//! band is symmetric around the trusted source rather than the claim. The
//! checker never fetches prices; callers supply the reference.

use serde::{Deserialize, Serialize};

use groundcheck_contracts::config::PriceConfig;

/// The outcome of comparing one claimed price with its reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCheck {
    pub passed: bool,
    pub detail: String,
    /// Relative deviation in percent; `None` when the inputs were unusable.
    pub deviation_pct: Option<f64>,
}

/// Compare `claimed_price` for `symbol` against `reference_price`.
///
/// An unusable reference (zero, negative, NaN, infinite) or a non-finite
/// claim fails the check with a data-quality message. It is not an error.
pub fn check(symbol: &str, claimed_price: f64, reference_price: f64, tolerance_pct: f64) -> PriceCheck {
    if !reference_price.is_finite() || reference_price <= 0.0 {
        return PriceCheck {
            passed: false,
            detail: format!(
                "reference price for {symbol} is unusable ({reference_price}); claim of {claimed_price} cannot be verified"
            ),
            deviation_pct: None,
        };
    }
    if !claimed_price.is_finite() {
        return PriceCheck {
            passed: false,
            detail: format!("claimed price for {symbol} is not a finite number ({claimed_price})"),
            deviation_pct: None,
        };
    }

    let deviation_pct = (claimed_price - reference_price).abs() / reference_price * 100.0;
    let passed = deviation_pct <= tolerance_pct;
    let detail = if passed {
        format!(
            "{symbol} within tolerance: {deviation_pct:.3}% (claimed ${claimed_price:.2}, reference ${reference_price:.2}, limit {tolerance_pct}%)"
        )
    } else {
        format!(
            "{symbol} deviates {deviation_pct:.2}% from reference (claimed ${claimed_price:.2}, reference ${reference_price:.2}, limit {tolerance_pct}%)"
        )
    };

    PriceCheck {
        passed,
        detail,
        deviation_pct: Some(deviation_pct),
    }
}

/// `check` with a configured tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAccuracyChecker {
    tolerance_pct: f64,
}

impl PriceAccuracyChecker {
    pub fn new(tolerance_pct: f64) -> Self {
        Self { tolerance_pct }
    }

    pub fn from_config(config: &PriceConfig) -> Self {
        Self::new(config.tolerance_pct)
    }

    pub fn tolerance_pct(&self) -> f64 {
        self.tolerance_pct
    }

    pub fn check(&self, symbol: &str, claimed_price: f64, reference_price: f64) -> PriceCheck {
        check(symbol, claimed_price, reference_price, self.tolerance_pct)
    }
}

impl Default for PriceAccuracyChecker {
    fn default() -> Self {
        Self::from_config(&PriceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_tolerance_passes() {
        let result = check("BTC-USD", 119_750.0, 119_743.21, 1.0);
        assert!(result.passed, "{}", result.detail);
        let deviation = result.deviation_pct.unwrap();
        assert!(deviation < 0.01, "deviation should be ~0.006%, got {deviation}");
    }

    #[test]
    fn outside_tolerance_fails() {
        let result = check("BTC-USD", 60_000.0, 119_743.21, 1.0);
        assert!(!result.passed);
        let deviation = result.deviation_pct.unwrap();
        assert!((deviation - 49.89).abs() < 0.01, "unexpected deviation {deviation}");
        assert!(result.detail.contains("deviates"), "{}", result.detail);
    }

    #[test]
    fn exactly_at_tolerance_passes() {
        // 1% of 200 is 2; both values are exact in binary floating point.
        assert!(check("AAPL", 202.0, 200.0, 1.0).passed);
        assert!(check("AAPL", 198.0, 200.0, 1.0).passed);
        assert!(!check("AAPL", 202.5, 200.0, 1.0).passed);
    }

    #[test]
    fn deviation_is_relative_to_reference() {
        // |110 - 100| / 100 = 10%; relative to the claim it would be ~9.09%.
        let result = check("X", 110.0, 100.0, 9.5);
        assert!(!result.passed);
        assert!((result.deviation_pct.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn unusable_reference_fails_without_error() {
        for reference in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = check("ETH-USD", 3_987.23, reference, 1.0);
            assert!(!result.passed, "reference {reference} must fail");
            assert!(result.deviation_pct.is_none());
            assert!(result.detail.contains("unusable"), "{}", result.detail);
        }
    }

    #[test]
    fn checker_applies_configured_tolerance() {
        let strict = PriceAccuracyChecker::new(0.001);
        assert!(!strict.check("BTC-USD", 119_750.0, 119_743.21).passed);
        assert!(PriceAccuracyChecker::default().check("BTC-USD", 119_750.0, 119_743.21).passed);
    }
}
