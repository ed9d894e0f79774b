/// Strategy used to compute `1 / sqrt(x)` when normalizing vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsqrtStrategy {
    /// Invert the result of the standard square root.
    #[default]
    Exact,
    /// Bit-level initial guess refined by one Newton-Raphson step.
    Fast,
}

impl RsqrtStrategy {
    /// Approximates `1 / sqrt(x)`. Only defined for positive, finite `x`:
    /// the caller must rule out zero, negative and non-finite values.
    #[inline(always)]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            RsqrtStrategy::Exact => exact_rsqrt(x),
            RsqrtStrategy::Fast => {
                // the bit trick works on the f32 encoding, outside of that range use the exact one
                if (x as f32).is_normal() {
                    fast_rsqrt(x)
                } else {
                    exact_rsqrt(x)
                }
            }
        }
    }
}

#[inline(always)]
pub fn exact_rsqrt(x: f64) -> f64 {
    1.0 / x.sqrt()
}

/// Reciprocal square root via the `0x5f3759df` magic constant.
/// Relative error is below 0.2% for positive normal inputs.
#[inline(always)]
pub fn fast_rsqrt(x: f64) -> f64 {
    let i = (x as f32).to_bits() as i32;
    let i = 0x5f3759df - (i >> 1);
    let y = f32::from_bits(i as u32) as f64;
    y * (1.5 - 0.5 * x * y * y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn relative_error(approx: f64, x: f64) -> f64 {
        let expected = 1.0 / x.sqrt();
        ((approx - expected) / expected).abs()
    }

    #[test]
    fn test_exact_rsqrt_matches_sqrt() {
        for x in [1e-6, 0.25, 1.0, 2.0, 169.0, 1e8] {
            assert!(relative_error(RsqrtStrategy::Exact.apply(x), x) < 1e-12);
        }
    }

    #[test]
    fn test_fast_rsqrt_known_values() {
        assert!((fast_rsqrt(4.0) - 0.5).abs() < 0.5 * 0.002);
        assert!((fast_rsqrt(1.0) - 1.0).abs() < 0.002);
        assert!((fast_rsqrt(100.0) - 0.1).abs() < 0.1 * 0.002);
    }

    #[test]
    fn test_fast_rsqrt_relative_error_on_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0x5f3759df);
        for _ in 0..10_000 {
            let exponent: f64 = rng.gen_range(-20.0..20.0);
            let x = rng.gen_range(1.0..10.0) * 10f64.powf(exponent);
            let err = relative_error(RsqrtStrategy::Fast.apply(x), x);
            assert!(err <= 0.005, "x = {x}, relative error = {err}");
        }
    }

    #[test]
    fn test_fast_strategy_falls_back_outside_f32_range() {
        let x = 1e300;
        assert!(relative_error(RsqrtStrategy::Fast.apply(x), x) < 1e-12);
        let x = 1e-300;
        assert!(relative_error(RsqrtStrategy::Fast.apply(x), x) < 1e-12);
    }
}
