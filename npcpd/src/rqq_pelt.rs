//! Nonparametric segment cost from quantile profiles
//!
//! For a candidate change point the quantile profiles of the segments on
//! either side of it are read off a [`RangeQuantileTree`] and compared as two
//! piecewise linear curves. Sufficiently different profiles make the change
//! point pay for itself.

use crate::error::check_finite;
use crate::rqq::RangeQuantileTree;
use crate::traits::CostModel;
use crate::Error;

/// Overlap score above which neighbouring segments count as different.
pub const DEFAULT_SENSITIVITY: f64 = 0.45;

/// Number of quantile levels in a profile.
pub const DEFAULT_QUANTILE_COUNT: usize = 12;

/// Segment cost scoring how little the quantile profiles of two adjacent
/// segments overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantileProfileCost {
    tree: RangeQuantileTree,
    sensitivity: f64,
    /// `i / (quantile_count - 1)`
    probabilities: Vec<f64>,
    /// Weight of an overlap between intervals `d` apart, decaying every five.
    factors: Vec<f64>,
}

impl QuantileProfileCost {
    /// Build the cost with the default sensitivity and quantile count.
    ///
    /// # Errors
    /// See [`QuantileProfileCost::with_params`].
    pub fn new(values: &[f64]) -> Result<Self, Error> {
        Self::with_params(values, DEFAULT_SENSITIVITY, DEFAULT_QUANTILE_COUNT)
    }

    /// Build the cost with explicit parameters.
    ///
    /// # Parameters
    /// * `sensitivity` - Overlap score in `[0, 1]` a change point has to exceed
    /// to be worth introducing. It doubles as the penalty per change point.
    /// * `quantile_count` - Number of quantile levels compared per segment.
    ///
    /// # Errors
    /// [`Error::InvalidSensitivity`], [`Error::InvalidQuantileCount`],
    /// [`Error::NotANumber`] or [`Error::NotFinite`] if `values` holds a NaN
    /// or an infinity, or any error from [`RangeQuantileTree::new`].
    pub fn with_params(
        values: &[f64],
        sensitivity: f64,
        quantile_count: usize,
    ) -> Result<Self, Error> {
        validate_params(sensitivity, quantile_count)?;
        check_finite(values)?;
        let tree = RangeQuantileTree::new(values)?;
        let last = (quantile_count - 1) as f64;
        let probabilities =
            (0..quantile_count).map(|i| i as f64 / last).collect();
        let factors = (0..quantile_count)
            .map(|d| (1.0 - (d / 5) as f64 * 0.1).max(0.0))
            .collect();
        Ok(Self {
            tree,
            sensitivity,
            probabilities,
            factors,
        })
    }

    /// Sensitivity threshold, also the penalty per change point.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Number of quantile levels compared per segment.
    #[must_use]
    pub fn quantile_count(&self) -> usize {
        self.probabilities.len()
    }

    fn profile(&self, low: usize, high: usize) -> Vec<f64> {
        self.probabilities
            .iter()
            .map(|&p| self.tree.quantile_unchecked(low, high, p))
            .collect()
    }

    /// How different two quantile profiles are: 0 for identical
    /// distributions, 1 for disjoint ones.
    ///
    /// Consecutive quantiles delimit intervals. Every pair of intervals that
    /// overlap contributes the covered share of each interval, weighted by
    /// how far apart the pair is in the profiles.
    fn distance(&self, qa: &[f64], qb: &[f64]) -> f64 {
        let intervals = (qa.len() - 1) as f64;
        let mut sum_a = 0.0;
        let mut sum_b = 0.0;
        for (i, a) in qa.windows(2).enumerate() {
            for (j, b) in qb.windows(2).enumerate() {
                let low = a[0].max(b[0]);
                let high = a[1].min(b[1]);
                if low > high {
                    continue;
                }
                let factor = self.factors[i.abs_diff(j)];
                let overlap = high - low;
                sum_a += factor * covered(overlap, a[1] - a[0]);
                sum_b += factor * covered(overlap, b[1] - b[0]);
            }
        }
        1.0 - sum_a * sum_b / (intervals * intervals)
    }
}

/// Share of an interval of `width` covered by `overlap`. A point interval is
/// covered whenever it overlaps at all.
fn covered(overlap: f64, width: f64) -> f64 {
    if width > 0.0 {
        overlap / width
    } else {
        1.0
    }
}

pub(crate) fn validate_params(
    sensitivity: f64,
    quantile_count: usize,
) -> Result<(), Error> {
    if !sensitivity.is_finite() || sensitivity < 0.0 {
        return Err(Error::InvalidSensitivity { sensitivity });
    }
    if quantile_count < 2 {
        return Err(Error::InvalidQuantileCount {
            count: quantile_count,
        });
    }
    Ok(())
}

impl CostModel for QuantileProfileCost {
    fn len(&self) -> usize {
        self.tree.len()
    }

    fn penalty(&self) -> f64 {
        self.sensitivity
    }

    /// Negative overlap score of `(tau0, tau1]` and `(tau1, tau2]` when it
    /// reaches the sensitivity, zero otherwise.
    fn cost(&self, tau0: usize, tau1: usize, tau2: usize) -> f64 {
        if tau0 == tau1 || tau1 == tau2 {
            return 0.0;
        }
        let before = self.profile(tau0, tau1 - 1);
        let after = self.profile(tau1, tau2 - 1);
        let distance = self.distance(&before, &after);
        if distance < self.sensitivity {
            0.0
        } else {
            -distance
        }
    }
}
