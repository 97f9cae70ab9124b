//! Handover decision core for LEO non-terrestrial networks.
//!
//! Each processing cycle turns per-satellite visibility samples into signal
//! estimates, detects A4/A5/D2 measurement events, ranks handover
//! candidates, makes one handover decision and adapts the event thresholds
//! used by the next cycle.
//!
//! ```no_run
//! use ntn_handover::{HandoverConfig, HandoverPipeline};
//!
//! let config = HandoverConfig::from_default_location()
//!     .expect("valid configuration")
//!     .unwrap_or_default();
//! let mut pipeline = HandoverPipeline::new(&config).expect("valid configuration");
//! for cycle in ntn_handover::io::read_cycles("cycle.json").expect("readable input") {
//!     let report = pipeline.run_cycle(&cycle).expect("usable cycle");
//!     println!("{:?}", report.decision.decision_type);
//! }
//! ```

pub mod algorithms;
pub mod config;
pub mod decision;
pub mod error;
pub mod events;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod signal;
pub mod thresholds;

pub use config::HandoverConfig;
pub use error::{HandoverError, HandoverResult, SampleError};
pub use pipeline::{CycleOutcome, CycleReport, HandoverPipeline};
