//! This library provides nonparametric offline Change Point Detection (CPD)
//! built on the Pruned Exact Linear Time (PELT) search, with
//!  * an empirical CDF segment cost as `EmpiricalCdfCost` (`EdPelt`)
//!  * a quantile profile segment cost as `QuantileProfileCost` (`RqqPelt`)
//!
//! `Detector` wraps both behind one configuration, and `RangeQuantileTree`
//! answers order statistic queries over arbitrary ranges of a sequence.
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

#[cfg(test)]
pub mod generators;

mod error;
pub use error::Error;

mod select;
pub use select::*;

mod rqq;
pub use rqq::*;

mod traits;
pub use self::traits::*;

mod pelt;
pub use pelt::*;

mod ed_pelt;
pub use ed_pelt::*;

mod rqq_pelt;
pub use rqq_pelt::*;

mod detector;
pub use detector::*;

pub mod utils;
