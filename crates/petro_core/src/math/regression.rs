//! Ordinary least squares on a single regressor.

use crate::types::RegressionError;
use num_traits::Float;

/// Result of fitting `y = slope * x + intercept` by ordinary least squares.
///
/// Generic over `T: Float` like the rest of the numeric code.
///
/// # Example
///
/// ```
/// use petro_core::math::regression::LinearFit;
///
/// let xs = [56.66, 57.32, 58.55, 59.12, 60.08];
/// let ys: Vec<f64> = xs.iter().map(|x| 6.5 * x + 150.0).collect();
///
/// let fit = LinearFit::fit(&xs, &ys).unwrap();
/// assert!((fit.slope - 6.5).abs() < 1e-9);
/// assert!((fit.r_squared - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit<T: Float> {
    /// Change in response per unit change in the regressor
    pub slope: T,
    /// Response at regressor zero
    pub intercept: T,
    /// Coefficient of determination, in [0, 1]
    pub r_squared: T,
    /// Number of observations used
    pub samples: usize,
}

impl<T: Float> LinearFit<T> {
    /// Minimum number of observations for a fit.
    pub const MIN_SAMPLES: usize = 2;

    /// Fit `ys` on `xs`.
    ///
    /// Uses centred sums (two-pass) so large price levels do not cancel.
    ///
    /// # Errors
    ///
    /// * `RegressionError::LengthMismatch` - slices differ in length
    /// * `RegressionError::InsufficientData` - fewer than 2 observations
    /// * `RegressionError::NonFinite` - NaN or infinite input
    /// * `RegressionError::Degenerate` - zero variance in `xs` or `ys`
    pub fn fit(xs: &[T], ys: &[T]) -> Result<Self, RegressionError> {
        if xs.len() != ys.len() {
            return Err(RegressionError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        let n = xs.len();
        if n < Self::MIN_SAMPLES {
            return Err(RegressionError::InsufficientData {
                got: n,
                need: Self::MIN_SAMPLES,
            });
        }
        if let Some(i) = xs
            .iter()
            .zip(ys)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(RegressionError::NonFinite(i));
        }

        let count = T::from(n).ok_or_else(|| {
            RegressionError::Degenerate(format!("sample count {} not representable", n))
        })?;
        let mean_x = xs.iter().fold(T::zero(), |acc, &x| acc + x) / count;
        let mean_y = ys.iter().fold(T::zero(), |acc, &y| acc + y) / count;

        let mut sxx = T::zero();
        let mut syy = T::zero();
        let mut sxy = T::zero();
        for (&x, &y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx = sxx + dx * dx;
            syy = syy + dy * dy;
            sxy = sxy + dx * dy;
        }

        if sxx <= T::zero() {
            return Err(RegressionError::Degenerate(
                "zero variance in regressor".to_string(),
            ));
        }
        if syy <= T::zero() {
            return Err(RegressionError::Degenerate(
                "zero variance in response".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res = xs.iter().zip(ys).fold(T::zero(), |acc, (&x, &y)| {
            let r = y - (slope * x + intercept);
            acc + r * r
        });
        let r_squared = (T::one() - ss_res / syy).max(T::zero()).min(T::one());

        Ok(Self {
            slope,
            intercept,
            r_squared,
            samples: n,
        })
    }

    /// Fitted response at `x`.
    #[inline]
    pub fn predict(&self, x: T) -> T {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_exact_line() {
        let xs = [1.0_f64, 2.0, 3.0, 4.0];
        let ys = [3.0_f64, 5.0, 7.0, 9.0];

        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(fit.samples, 4);
        assert_relative_eq!(fit.predict(10.0), 21.0, epsilon = 1e-10);
    }

    #[test]
    fn test_matches_closed_form() {
        // Weekly WTI vs benzene from the sheet (late 2025 / early 2026)
        let xs = [58.55, 60.08, 57.44, 56.66, 56.74, 57.32, 59.12, 59.44];
        let ys = [657.0, 673.3, 655.7, 655.7, 669.2, 666.0, 670.7, 705.3];

        let n = xs.len() as f64;
        let sx: f64 = xs.iter().sum();
        let sy: f64 = ys.iter().sum();
        let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
        let sxx: f64 = xs.iter().map(|x| x * x).sum();
        let expected_slope = (n * sxy - sx * sy) / (n * sxx - sx * sx);
        let expected_intercept = (sy - expected_slope * sx) / n;

        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_relative_eq!(fit.slope, expected_slope, max_relative = 1e-9);
        assert_relative_eq!(fit.intercept, expected_intercept, max_relative = 1e-9);

        // R² equals the squared Pearson correlation for simple OLS
        let mx = sx / n;
        let my = sy / n;
        let cov: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum();
        let vx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
        let vy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
        assert_relative_eq!(fit.r_squared, cov * cov / (vx * vy), max_relative = 1e-9);
    }

    #[test]
    fn test_negative_slope() {
        let xs = [50.0_f64, 55.0, 60.0, 65.0];
        let ys = [1010.0_f64, 985.0, 960.0, 935.0];
        let fit = LinearFit::fit(&xs, &ys).unwrap();
        assert_abs_diff_eq!(fit.slope, -5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_length_mismatch() {
        let err = LinearFit::fit(&[1.0_f64, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, RegressionError::LengthMismatch { xs: 2, ys: 1 });
    }

    #[test]
    fn test_insufficient_data() {
        let err = LinearFit::fit(&[1.0_f64], &[1.0]).unwrap_err();
        assert_eq!(err, RegressionError::InsufficientData { got: 1, need: 2 });
    }

    #[test]
    fn test_non_finite() {
        let err = LinearFit::fit(&[1.0_f64, f64::NAN, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, RegressionError::NonFinite(1));
    }

    #[test]
    fn test_degenerate_regressor() {
        let err = LinearFit::fit(&[59.44_f64, 59.44, 59.44], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, RegressionError::Degenerate(_)));
    }

    #[test]
    fn test_degenerate_response() {
        let err = LinearFit::fit(&[1.0_f64, 2.0, 3.0], &[1170.0, 1170.0, 1170.0]).unwrap_err();
        assert!(matches!(err, RegressionError::Degenerate(_)));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn test_r_squared_in_unit_interval(
                ys in prop::collection::vec(-1000.0_f64..1000.0, 6..20)
            ) {
                let xs: Vec<f64> = (0..ys.len()).map(|i| 50.0 + i as f64).collect();
                if let Ok(fit) = LinearFit::fit(&xs, &ys) {
                    prop_assert!(fit.r_squared >= 0.0 && fit.r_squared <= 1.0);
                }
            }

            #[test]
            fn test_recovers_noiseless_slope(
                slope in -20.0_f64..20.0,
                intercept in -500.0_f64..1500.0
            ) {
                prop_assume!(slope.abs() > 1e-3);
                let xs: Vec<f64> = (0..8).map(|i| 55.0 + 0.7 * i as f64).collect();
                let ys: Vec<f64> = xs.iter().map(|x| slope * x + intercept).collect();
                let fit = LinearFit::fit(&xs, &ys).unwrap();
                prop_assert!((fit.slope - slope).abs() < 1e-8);
            }
        }
    }
}
