//! Pruned Exact Linear Time segmentation
//!
//! This code is derived from
//! "Optimal detection of changepoints with a linear computational cost";
//! Rebecca Killick, Paul Fearnhead, Idris A. Eckley; arXiv:1101.1438
//! Which can be found [here](https://arxiv.org/pdf/1101.1438.pdf).

use crate::traits::CostModel;
use crate::Error;
use tracing::trace;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Optimal partitioning of a sequence under a pluggable [`CostModel`].
///
/// Candidate change points that can no longer be part of an optimal
/// segmentation are pruned as the dynamic program advances, which makes the
/// expected running time close to linear in the number of cost evaluations.
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pelt {
    /// Minimum number of samples in every segment.
    min_distance: usize,
}

impl Pelt {
    /// Create a new segmentation engine.
    ///
    /// # Errors
    /// [`Error::InvalidMinDistance`] if `min_distance` is zero.
    ///
    /// # Example
    /// ```rust
    /// use npcpd::{EmpiricalCdfCost, Pelt};
    ///
    /// let data = [0.0, 0.0, 0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0];
    /// let model = EmpiricalCdfCost::new(&data).unwrap();
    /// let pelt = Pelt::new(1).unwrap();
    /// assert_eq!(pelt.segment(&model), vec![4]);
    /// ```
    pub fn new(min_distance: usize) -> Result<Self, Error> {
        if min_distance == 0 {
            return Err(Error::InvalidMinDistance);
        }
        Ok(Self { min_distance })
    }

    /// Minimum number of samples in every segment.
    #[must_use]
    pub fn min_distance(&self) -> usize {
        self.min_distance
    }

    /// Find the change points minimizing the total segment cost plus one
    /// penalty per change point.
    ///
    /// Returns ascending 0-based indices of the last sample of every segment
    /// but the final one. Sequences with at most two samples, or too short to
    /// hold two segments of `min_distance`, have no change points.
    #[must_use]
    pub fn segment<C: CostModel + ?Sized>(&self, model: &C) -> Vec<usize> {
        let n = model.len();
        let min_distance = self.min_distance;
        if n <= 2 || min_distance > n / 2 {
            return Vec::new();
        }

        let penalty = model.penalty();
        let mut best_cost = vec![0.0; n + 1];
        let mut prev_changepoint = vec![0_usize; n + 1];
        best_cost[0] = -penalty;
        for tau in min_distance..2 * min_distance {
            best_cost[tau] = model.cost(0, 0, tau);
        }

        let mut candidates: Vec<usize> = vec![0, min_distance];
        let mut trial_costs: Vec<f64> = Vec::with_capacity(n);
        for tau in 2 * min_distance..=n {
            trial_costs.clear();
            trial_costs.extend(candidates.iter().map(|&c| {
                best_cost[c]
                    + model.cost(prev_changepoint[c], c, tau)
                    + penalty
            }));

            // First minimum wins ties
            let (best_ix, best) = trial_costs.iter().enumerate().skip(1).fold(
                (0, trial_costs[0]),
                |(best_ix, best), (ix, &cost)| {
                    if cost < best {
                        (ix, cost)
                    } else {
                        (best_ix, best)
                    }
                },
            );
            best_cost[tau] = best;
            prev_changepoint[tau] = candidates[best_ix];

            let threshold = best + penalty;
            let mut trials = trial_costs.iter();
            candidates.retain(|_| {
                trials.next().is_some_and(|&cost| cost < threshold)
            });
            candidates.push(tau + 1 - min_distance);
            debug_assert!(candidates.len() <= tau + 1);
            trace!(tau, candidates = candidates.len(), "pruned candidates");
        }

        let mut changepoints = Vec::new();
        let mut tau = prev_changepoint[n];
        while tau != 0 {
            changepoints.push(tau - 1);
            tau = prev_changepoint[tau];
        }
        changepoints.reverse();
        changepoints
    }
}
