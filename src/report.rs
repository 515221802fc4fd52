//! Presentation of a predicted valuation.
//!
//! The estimator reports raw regression output; whether a negative value is
//! shown as-is or floored at zero is decided here, by the caller's policy.

use std::fmt;

use crate::error::Result;
use crate::estimator::{FittedModel, QueryVector};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NegativePolicy {
    /// Show the regression output unchanged.
    #[default]
    Surface,
    /// Floor the displayed value at zero; the raw value is kept.
    ClampToZero,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValuationReport {
    pub raw: f64,
    pub displayed: f64,
    /// Set when the query left the training range or the raw value is negative.
    pub out_of_distribution: bool,
}

impl ValuationReport {
    pub fn new(raw: f64, within_training_range: bool, policy: NegativePolicy) -> Self {
        let displayed = match policy {
            NegativePolicy::ClampToZero if raw < 0.0 => 0.0,
            _ => raw,
        };

        Self {
            raw,
            displayed,
            out_of_distribution: !within_training_range || raw < 0.0,
        }
    }

    /// Predicts with `model` and wraps the result; invalid queries propagate.
    pub fn estimate(
        model: &FittedModel,
        query: &QueryVector,
        policy: NegativePolicy,
    ) -> Result<Self> {
        let raw = model.predict(query)?;
        let report = Self::new(raw, model.within_training_range(query), policy);

        if report.out_of_distribution {
            log::warn!(
                "valuation {:.2} is outside what the comparables support",
                raw
            );
        }

        Ok(report)
    }

    pub fn is_clamped(&self) -> bool {
        self.displayed != self.raw
    }
}

impl fmt::Display for ValuationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_crores(self.displayed))
    }
}

/// Formats an amount in ₹ crores with two decimals.
pub fn format_crores(amount: f64) -> String {
    format!("₹ {amount:.2} Crores")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ValuationEstimator;

    #[test]
    fn test_format_crores() {
        assert_eq!(format_crores(20.0), "₹ 20.00 Crores");
        assert_eq!(format_crores(47.488373), "₹ 47.49 Crores");
        assert_eq!(format_crores(-4.0233), "₹ -4.02 Crores");
    }

    #[test]
    fn test_surface_keeps_negative() {
        let report = ValuationReport::new(-4.02, false, NegativePolicy::Surface);

        assert_eq!(report.displayed, -4.02);
        assert!(report.out_of_distribution);
        assert!(!report.is_clamped());
    }

    #[test]
    fn test_clamp_floors_at_zero() {
        let report = ValuationReport::new(-4.02, false, NegativePolicy::ClampToZero);

        assert_eq!(report.raw, -4.02);
        assert_eq!(report.displayed, 0.0);
        assert!(report.is_clamped());
        assert_eq!(report.to_string(), "₹ 0.00 Crores");
    }

    #[test]
    fn test_clamp_leaves_positive_untouched() {
        let report = ValuationReport::new(47.5, true, NegativePolicy::ClampToZero);

        assert_eq!(report.displayed, 47.5);
        assert!(!report.out_of_distribution);
    }

    #[test]
    fn test_estimate_from_model() {
        let model = ValuationEstimator::new().fit().unwrap();

        let query = QueryVector::default();
        let report = ValuationReport::estimate(&model, &query, NegativePolicy::Surface).unwrap();
        assert_eq!(report.to_string(), "₹ 20.00 Crores");
        assert!(!report.out_of_distribution);

        let zero = QueryVector::new(0.0, 0.0, 0.0, 0.0, 0.0);
        let report = ValuationReport::estimate(&model, &zero, NegativePolicy::Surface).unwrap();
        assert_eq!(report.to_string(), "₹ -4.02 Crores");
        assert!(report.out_of_distribution);
    }

    #[test]
    fn test_estimate_propagates_invalid_input() {
        let model = ValuationEstimator::new().fit().unwrap();
        let query = QueryVector::new(-1.0, 0.0, 0.0, 0.0, 0.0);

        assert!(ValuationReport::estimate(&model, &query, NegativePolicy::ClampToZero).is_err());
    }
}
