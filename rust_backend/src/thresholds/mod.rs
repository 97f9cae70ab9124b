//! Event detection thresholds and their closed-loop adaptation.
//!
//! # Components
//!
//! - [`set`]: Threshold values, hysteresis, time-to-trigger and valid ranges
//! - [`rules`]: Heuristics mapping network conditions to threshold changes
//! - [`controller`]: Damped, rate-limited application of those changes

pub mod controller;
pub mod rules;
pub mod set;

pub use controller::{AdjustmentRecord, ControllerConfig, ThresholdController};
pub use rules::{propose, AdjustmentRule, ProposedAdjustment, ThresholdParameter};
pub use set::{
    time_to_trigger, A4Thresholds, A5Thresholds, D2Thresholds, MeasurementOffsets, ThresholdSet,
    ValidRange,
};
