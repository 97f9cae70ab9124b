//! Physics-based signal quality estimation.
//!
//! # Components
//!
//! - [`propagation`]: Free-space and atmospheric loss models
//! - [`calculator`]: Link budget, RSRP/RSRQ/RS-SINR and per-satellite profiles

pub mod calculator;
pub mod propagation;

pub use calculator::{
    clamp_rs_sinr, clamp_rsrp, clamp_rsrq, ConstellationParams, LinkBudget, MeasurementSettings,
    SignalQualityCalculator, UserTerminal, INVALID_RSRP_DBM, RSRP_RANGE_DBM, RSRQ_RANGE_DB,
    RS_SINR_RANGE_DB,
};
