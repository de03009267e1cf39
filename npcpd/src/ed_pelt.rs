//! Nonparametric segment cost from the empirical CDF
//!
//! This code is derived from
//! "A computationally efficient nonparametric approach for changepoint
//! detection"; Kaylea Haynes, Paul Fearnhead, Idris A. Eckley; Statistics and
//! Computing 27 (2017), arXiv:1602.01254
//! Which can be found [here](https://arxiv.org/pdf/1602.01254.pdf).
//!
//! The empirical CDF of every segment is sampled at `ceil(4 ln n)` quantiles of
//! the whole sequence, spaced more densely in the tails. Prefix counts make
//! every segment cost `O(ln n)`.

use crate::error::check_nan;
use crate::traits::CostModel;
use crate::Error;
use ndarray::Array2;

/// Factor of `ln n` charged per change point by default.
pub const DEFAULT_PENALTY_FACTOR: f64 = 3.0;

/// Segment cost comparing the empirical CDF of a segment with a step
/// function, see the [module documentation](self).
#[derive(Clone, Debug, PartialEq)]
pub struct EmpiricalCdfCost {
    n: usize,
    /// Number of quantile levels the CDF is sampled at.
    k: usize,
    /// Row `i`, column `tau` holds `2 #{x < t_i} + #{x == t_i}` over the first
    /// `tau` values. Doubling keeps the half counted ties integral.
    partial_sums: Array2<u32>,
    /// `-2 ln(2n - 1) / k`
    scale: f64,
    penalty_factor: f64,
}

impl EmpiricalCdfCost {
    /// Precompute the prefix counts for `values`.
    ///
    /// # Errors
    /// [`Error::NotANumber`] if `values` contains a NaN and
    /// [`Error::SequenceTooLong`] if the doubled counts would not fit in a
    /// `u32`.
    pub fn new(values: &[f64]) -> Result<Self, Error> {
        check_nan(values)?;
        let n = values.len();
        if u32::try_from(2 * n).is_err() {
            return Err(Error::SequenceTooLong { len: n });
        }

        let k = quantile_level_count(n);
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let mut partial_sums = Array2::zeros((k, n + 1));
        for (i, mut row) in partial_sums.outer_iter_mut().enumerate() {
            let threshold = sorted[threshold_index(i, k, n)];
            let mut count = 0_u32;
            for (tau, &x) in values.iter().enumerate() {
                if x < threshold {
                    count += 2;
                } else if x == threshold {
                    count += 1;
                }
                row[tau + 1] = count;
            }
        }

        let scale = if k == 0 {
            0.0
        } else {
            -2.0 * (2.0 * n as f64 - 1.0).ln() / k as f64
        };

        Ok(Self {
            n,
            k,
            partial_sums,
            scale,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
        })
    }

    /// Charge `factor * ln n` per change point instead of `3 ln n`.
    #[must_use]
    pub fn with_penalty_factor(self, penalty_factor: f64) -> Self {
        Self {
            penalty_factor,
            ..self
        }
    }

    /// Number of quantile levels the empirical CDF is sampled at.
    #[must_use]
    pub fn quantile_levels(&self) -> usize {
        self.k
    }
}

impl CostModel for EmpiricalCdfCost {
    fn len(&self) -> usize {
        self.n
    }

    fn penalty(&self) -> f64 {
        self.penalty_factor * (self.n as f64).ln()
    }

    fn cost(&self, _tau0: usize, tau1: usize, tau2: usize) -> f64 {
        debug_assert!(tau1 <= tau2 && tau2 <= self.n);
        let width = tau2 - tau1;
        let sum: f64 = self
            .partial_sums
            .outer_iter()
            .map(|row| {
                let count = row[tau2] - row[tau1];
                // A fit of exactly 0 or 1 contributes nothing
                if count == 0 || count as usize == 2 * width {
                    return 0.0;
                }
                let fit = f64::from(count) * 0.5 / width as f64;
                width as f64
                    * (fit * fit.ln() + (1.0 - fit) * (1.0 - fit).ln())
            })
            .sum();
        self.scale * sum
    }
}

/// `min(n, ceil(4 ln n))`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantile_level_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let k = (4.0 * (n as f64).ln()).ceil() as usize;
    k.min(n)
}

/// Position in the sorted sequence of the `i`-th of `k` thresholds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn threshold_index(i: usize, k: usize, n: usize) -> usize {
    let z = -1.0 + (2 * i + 1) as f64 / k as f64;
    let p = 1.0 / (1.0 + (2.0 * n as f64 - 1.0).powf(-z));
    ((n - 1) as f64 * p).trunc() as usize
}
