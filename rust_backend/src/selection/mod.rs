//! Candidate scoring and the active handover candidate pool.
//!
//! # Components
//!
//! - [`scoring`]: Signal, event, stability and geometric subscores
//! - [`pool`]: Sticky top-N pool maintained across cycles

pub mod pool;
pub mod scoring;

pub use pool::{CandidateManager, CandidatePoolConfig};
pub use scoring::{
    geometric_score, score_candidate, signal_quality_score, stability_score, CandidateWeights,
};
