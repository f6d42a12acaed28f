//! Numeric conventions that keep degenerate statistics finite.

/// Arguments below this underflow to exactly zero.
const EXP_UNDERFLOW_ARG: f64 = -700.0;

/// Arguments above this saturate so the result stays well inside `f64`.
const EXP_OVERFLOW_ARG: f64 = 300.0;

/// Denominators smaller than this in magnitude divide to zero.
pub const ZDIV_EPSILON: f64 = 1e-12;

/// Exponential that never returns NaN or infinity.
///
/// NaN and very negative arguments give 0, large arguments saturate at
/// `exp(300)`.
pub fn safe_exp(x: f64) -> f64 {
    if x.is_nan() || x < EXP_UNDERFLOW_ARG {
        return 0.0;
    }
    x.min(EXP_OVERFLOW_ARG).exp()
}

/// Zero-safe division: `n / d`, or 0 when `d` is (nearly) zero.
pub fn zdiv(n: f64, d: f64) -> f64 {
    if d.abs() < ZDIV_EPSILON {
        0.0
    } else {
        n / d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_exp_matches_exp_in_range() {
        assert!((safe_exp(1.0) - std::f64::consts::E).abs() < 1e-12);
        assert_eq!(safe_exp(0.0), 1.0);
    }

    #[test]
    fn safe_exp_is_always_finite() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e6, -1e6, 709.9] {
            let y = safe_exp(x);
            assert!(y.is_finite(), "safe_exp({}) = {}", x, y);
            assert!(y >= 0.0);
        }
        assert_eq!(safe_exp(f64::NEG_INFINITY), 0.0);
        assert_eq!(safe_exp(f64::NAN), 0.0);
    }

    #[test]
    fn zdiv_guards_zero_denominator() {
        assert_eq!(zdiv(3.0, 0.0), 0.0);
        assert_eq!(zdiv(3.0, 1e-15), 0.0);
        assert_eq!(zdiv(3.0, 2.0), 1.5);
        assert_eq!(zdiv(-3.0, -2.0), 1.5);
    }
}
