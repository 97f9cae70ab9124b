//! Measurement event detection.
//!
//! # Components
//!
//! - [`trigger`]: Generic time-to-trigger state machine
//! - [`predicates`]: A4, A5 and D2 entering/leaving conditions
//! - [`detector`]: Runs the three machines over a satellite's signal profile
//! - [`suitability`]: Per-satellite handover suitability assessment

pub mod detector;
pub mod predicates;
pub mod suitability;
pub mod trigger;

pub use detector::{MeasurementEventDetector, ServingPoint, ServingReference};
pub use predicates::{A4Condition, A5Condition, D2Condition};
pub use suitability::{assess, HandoverSuitability, SuitabilityBreakdown, SuitabilityFactor};
pub use trigger::{Leaving, TriggerCondition, TriggerInterval, TriggerMachine};
