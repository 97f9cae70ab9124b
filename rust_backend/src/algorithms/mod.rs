//! Numeric helpers shared by the signal and scoring stages.
//!
//! # Components
//!
//! - [`statistics`]: Mean, extrema and population standard deviation

pub mod statistics;

pub use statistics::{mean, MetricStats};
