//! Named detectors on top of [`Pelt`]

use crate::ed_pelt::EmpiricalCdfCost;
use crate::error::check_nan;
use crate::pelt::Pelt;
use crate::rqq_pelt::{
    validate_params, QuantileProfileCost, DEFAULT_QUANTILE_COUNT,
    DEFAULT_SENSITIVITY,
};
use crate::Error;
use derive_more::Display;
use rayon::prelude::*;
use std::str::FromStr;
use tracing::debug;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Minimum segment length used when none is given.
pub const DEFAULT_MIN_DISTANCE: usize = 20;

/// Which cost model the segmentation runs with.
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum Algorithm {
    /// [`EmpiricalCdfCost`]
    #[default]
    #[display(fmt = "EdPelt")]
    EdPelt,
    /// [`QuantileProfileCost`]
    #[display(fmt = "RqqPelt")]
    RqqPelt,
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edpelt" | "ed-pelt" => Ok(Self::EdPelt),
            "rqqpelt" | "rqq-pelt" => Ok(Self::RqqPelt),
            _ => Err(Error::UnknownAlgorithm { name: s.to_owned() }),
        }
    }
}

/// Settings of a [`Detector`].
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Cost model.
    pub algorithm: Algorithm,
    /// Minimum number of samples in every segment.
    pub min_distance: usize,
    /// Sensitivity of [`Algorithm::RqqPelt`].
    pub sensitivity: f64,
    /// Number of quantile levels of [`Algorithm::RqqPelt`].
    pub quantile_count: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            min_distance: DEFAULT_MIN_DISTANCE,
            sensitivity: DEFAULT_SENSITIVITY,
            quantile_count: DEFAULT_QUANTILE_COUNT,
        }
    }
}

impl DetectorConfig {
    /// Use `algorithm` as the cost model.
    #[must_use]
    pub fn with_algorithm(self, algorithm: Algorithm) -> Self {
        Self { algorithm, ..self }
    }

    /// Require at least `min_distance` samples per segment.
    #[must_use]
    pub fn with_min_distance(self, min_distance: usize) -> Self {
        Self {
            min_distance,
            ..self
        }
    }

    /// Change the sensitivity of [`Algorithm::RqqPelt`].
    #[must_use]
    pub fn with_sensitivity(self, sensitivity: f64) -> Self {
        Self {
            sensitivity,
            ..self
        }
    }

    /// Change the number of quantile levels of [`Algorithm::RqqPelt`].
    #[must_use]
    pub fn with_quantile_count(self, quantile_count: usize) -> Self {
        Self {
            quantile_count,
            ..self
        }
    }
}

/// Change point detector with a validated configuration.
///
/// # Example
/// ```rust
/// use npcpd::{Algorithm, Detector, DetectorConfig};
///
/// let data: Vec<f64> = [0.0, 1.0, 2.0]
///     .iter()
///     .flat_map(|&level| std::iter::repeat(level).take(6))
///     .collect();
///
/// let detector = Detector::new(
///     DetectorConfig::default()
///         .with_algorithm(Algorithm::RqqPelt)
///         .with_min_distance(1),
/// )
/// .unwrap();
/// assert_eq!(detector.detect(&data).unwrap(), vec![5, 11]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Detector {
    config: DetectorConfig,
    pelt: Pelt,
}

impl Detector {
    /// Validate `config` and create a detector.
    ///
    /// # Errors
    /// [`Error::InvalidMinDistance`], or for [`Algorithm::RqqPelt`],
    /// [`Error::InvalidSensitivity`] and [`Error::InvalidQuantileCount`].
    pub fn new(config: DetectorConfig) -> Result<Self, Error> {
        let pelt = Pelt::new(config.min_distance)?;
        if config.algorithm == Algorithm::RqqPelt {
            validate_params(config.sensitivity, config.quantile_count)?;
        }
        Ok(Self { config, pelt })
    }

    /// The configuration this detector runs with.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Ascending 0-based indices of the last sample of every segment but the
    /// final one.
    ///
    /// # Errors
    /// [`Error::NotANumber`] if `values` contains a NaN, or any error from
    /// building the cost model. [`Algorithm::RqqPelt`] also rejects
    /// infinities with [`Error::NotFinite`].
    pub fn detect(&self, values: &[f64]) -> Result<Vec<usize>, Error> {
        check_nan(values)?;
        let n = values.len();
        let min_distance = self.config.min_distance;
        if n <= 2 || min_distance > n / 2 {
            debug!(n, min_distance, "sequence too short for a change point");
            return Ok(Vec::new());
        }

        let changepoints = match self.config.algorithm {
            Algorithm::EdPelt => {
                self.pelt.segment(&EmpiricalCdfCost::new(values)?)
            }
            Algorithm::RqqPelt => {
                let model = QuantileProfileCost::with_params(
                    values,
                    self.config.sensitivity,
                    self.config.quantile_count,
                )?;
                self.pelt.segment(&model)
            }
        };
        debug!(
            algorithm = %self.config.algorithm,
            n,
            min_distance,
            changepoints = changepoints.len(),
            "detection finished"
        );
        Ok(changepoints)
    }

    /// Run [`detect`](Detector::detect) on independent sequences in
    /// parallel. Results are in the order of `sequences`.
    #[must_use]
    pub fn detect_many<S>(
        &self,
        sequences: &[S],
    ) -> Vec<Result<Vec<usize>, Error>>
    where
        S: AsRef<[f64]> + Sync,
    {
        sequences
            .par_iter()
            .map(|values| self.detect(values.as_ref()))
            .collect()
    }
}

/// Detect change points in `values` with the default settings of
/// `algorithm`.
///
/// # Errors
/// See [`Detector::new`] and [`Detector::detect`].
///
/// # Example
/// ```rust
/// use npcpd::{detect, Algorithm};
///
/// let data = [0.0, 0.0, 0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0];
/// assert_eq!(detect(&data, 1, Algorithm::EdPelt).unwrap(), vec![4]);
/// assert!(detect(&data, 0, Algorithm::EdPelt).is_err());
/// ```
pub fn detect(
    values: &[f64],
    min_distance: usize,
    algorithm: Algorithm,
) -> Result<Vec<usize>, Error> {
    let config = DetectorConfig::default()
        .with_algorithm(algorithm)
        .with_min_distance(min_distance);
    Detector::new(config)?.detect(values)
}
