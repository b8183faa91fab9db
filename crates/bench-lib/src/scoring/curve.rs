//! Piecewise-linear scoring
//!
//! Four breakpoints split the raw value axis into bands that map onto
//! quarters of the 0-100 score range:
//!
//! | raw value                    | score      |
//! |------------------------------|------------|
//! | `[0, poor)`                  | `[0, 25)`  |
//! | `[poor, marginal)`           | `[25, 50)` |
//! | `[marginal, good)`           | `[50, 75)` |
//! | `[good, excellent)`          | `[75, 100)`|
//! | `excellent` and above        | `100`      |

use serde::{Deserialize, Serialize};

/// Four strictly increasing breakpoints for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    pub poor: f64,
    pub marginal: f64,
    pub good: f64,
    pub excellent: f64,
}

impl CalibrationCurve {
    pub const fn new(poor: f64, marginal: f64, good: f64, excellent: f64) -> Self {
        Self {
            poor,
            marginal,
            good,
            excellent,
        }
    }

    /// Breakpoints are positive and strictly increasing
    pub fn is_valid(&self) -> bool {
        0.0 < self.poor
            && self.poor < self.marginal
            && self.marginal < self.good
            && self.good < self.excellent
    }
}

/// Map `value` onto [0, 100] along `curve`.
///
/// Negative and NaN inputs score 0.
pub fn score(value: f64, curve: &CalibrationCurve) -> f64 {
    if value.is_nan() {
        return 0.0;
    }

    let raw = if value >= curve.excellent {
        100.0
    } else if value >= curve.good {
        75.0 + 25.0 * (value - curve.good) / (curve.excellent - curve.good)
    } else if value >= curve.marginal {
        50.0 + 25.0 * (value - curve.marginal) / (curve.good - curve.marginal)
    } else if value >= curve.poor {
        25.0 + 25.0 * (value - curve.poor) / (curve.marginal - curve.poor)
    } else {
        25.0 * value / curve.poor
    };

    raw.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KECCAK: CalibrationCurve = CalibrationCurve::new(50_000.0, 100_000.0, 200_000.0, 500_000.0);

    #[test]
    fn test_breakpoints_are_exact() {
        assert_eq!(score(50_000.0, &KECCAK), 25.0);
        assert_eq!(score(100_000.0, &KECCAK), 50.0);
        assert_eq!(score(200_000.0, &KECCAK), 75.0);
        assert_eq!(score(500_000.0, &KECCAK), 100.0);
    }

    #[test]
    fn test_interpolation() {
        assert_eq!(score(0.0, &KECCAK), 0.0);
        assert_eq!(score(25_000.0, &KECCAK), 12.5);
        assert_eq!(score(75_000.0, &KECCAK), 37.5);
        assert_eq!(score(150_000.0, &KECCAK), 62.5);
        assert_eq!(score(350_000.0, &KECCAK), 87.5);
        assert_eq!(score(5_000_000.0, &KECCAK), 100.0);
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        assert_eq!(score(-1.0, &KECCAK), 0.0);
        assert_eq!(score(f64::MIN, &KECCAK), 0.0);
        assert_eq!(score(f64::NAN, &KECCAK), 0.0);
        assert_eq!(score(f64::INFINITY, &KECCAK), 100.0);
    }

    #[test]
    fn test_curve_validity() {
        assert!(KECCAK.is_valid());
        assert!(!CalibrationCurve::new(10.0, 10.0, 20.0, 30.0).is_valid());
        assert!(!CalibrationCurve::new(0.0, 10.0, 20.0, 30.0).is_valid());
    }

    fn valid_curve() -> impl Strategy<Value = CalibrationCurve> {
        (1.0f64..1_000.0, 1.0f64..1_000.0, 1.0f64..1_000.0, 1.0f64..1_000.0).prop_map(
            |(a, b, c, d)| CalibrationCurve::new(a, a + b, a + b + c, a + b + c + d),
        )
    }

    proptest! {
        #[test]
        fn prop_breakpoints_exact(curve in valid_curve()) {
            prop_assert!((score(curve.poor, &curve) - 25.0).abs() < 1e-9);
            prop_assert!((score(curve.marginal, &curve) - 50.0).abs() < 1e-9);
            prop_assert!((score(curve.good, &curve) - 75.0).abs() < 1e-9);
            prop_assert_eq!(score(curve.excellent, &curve), 100.0);
        }

        #[test]
        fn prop_monotonic(curve in valid_curve(), a in -1e4f64..1e4, b in -1e4f64..1e4) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(score(lo, &curve) <= score(hi, &curve) + 1e-9);
        }

        #[test]
        fn prop_bounded(curve in valid_curve(), value in proptest::num::f64::ANY) {
            let s = score(value, &curve);
            prop_assert!((0.0..=100.0).contains(&s));
        }

        #[test]
        fn prop_negative_is_zero(curve in valid_curve(), value in -1e12f64..-1e-12) {
            prop_assert_eq!(score(value, &curve), 0.0);
        }
    }
}
