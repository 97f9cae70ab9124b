//! Handover decision making.
//!
//! # Components
//!
//! - [`engine`]: Serving assessment, weighted factors and gated decision rules
//! - [`history`]: Bounded decision history and its statistics

pub mod engine;
pub mod history;

pub use engine::{
    assess_serving, serving_grade, DecisionConfig, DecisionEngine, DecisionWeights,
    EMERGENCY_RSRP_DBM,
};
pub use history::{DecisionHistory, DecisionStatistics};
