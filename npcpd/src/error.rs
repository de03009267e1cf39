//! Errors reported by the detectors and the order statistics utilities.

use derive_more::{Display, Error};

/// Everything that can go wrong at the public boundary of this crate.
///
/// Internal invariant violations (e.g. a tree query on a range outside the
/// sequence) are programming errors and panic instead.
#[derive(Clone, Debug, PartialEq, Display, Error)]
pub enum Error {
    /// The minimum segment length must be at least one.
    #[display(fmt = "min_distance must be at least 1")]
    InvalidMinDistance,
    /// A requested order statistic lies outside of the selected range.
    #[display(fmt = "rank {} is outside of [{}, {}]", k, left, right)]
    RankOutOfRange {
        /// Requested rank
        k: usize,
        /// First admissible rank
        left: usize,
        /// Last admissible rank
        right: usize,
    },
    /// A quantile probability outside of `[0, 1]` (or NaN).
    #[display(fmt = "probability {} is outside of [0, 1]", probability)]
    InvalidProbability {
        /// The offending probability
        probability: f64,
    },
    /// Quantile profiles need at least two quantile levels.
    #[display(fmt = "quantile count must be at least 2, got {}", count)]
    InvalidQuantileCount {
        /// The offending count
        count: usize,
    },
    /// The sensitivity threshold must be finite and non-negative.
    #[display(
        fmt = "sensitivity must be finite and non-negative, got {}",
        sensitivity
    )]
    InvalidSensitivity {
        /// The offending sensitivity
        sensitivity: f64,
    },
    /// The input sequence contains a NaN.
    #[display(fmt = "value at index {} is NaN", index)]
    NotANumber {
        /// Position of the first NaN
        index: usize,
    },
    /// Quantile profiles cannot compare infinite values.
    #[display(fmt = "value at index {} is infinite", index)]
    NotFinite {
        /// Position of the first infinite value
        index: usize,
    },
    /// The input sequence is too long to be indexed by the range tree.
    #[display(fmt = "sequence of length {} is too long", len)]
    SequenceTooLong {
        /// Length of the rejected sequence
        len: usize,
    },
    /// The algorithm name could not be parsed.
    #[display(fmt = "unknown algorithm `{}`", name)]
    UnknownAlgorithm {
        /// The name that was given
        name: String,
    },
}

/// Reject `values` if it contains a NaN, reporting the first one.
pub(crate) fn check_nan(values: &[f64]) -> Result<(), Error> {
    values
        .iter()
        .position(|x| x.is_nan())
        .map_or(Ok(()), |index| Err(Error::NotANumber { index }))
}

/// Reject `values` if it contains a NaN or an infinity, reporting the first
/// one.
pub(crate) fn check_finite(values: &[f64]) -> Result<(), Error> {
    match values.iter().position(|x| !x.is_finite()) {
        None => Ok(()),
        Some(index) if values[index].is_nan() => {
            Err(Error::NotANumber { index })
        }
        Some(index) => Err(Error::NotFinite { index }),
    }
}
