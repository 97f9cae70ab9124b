//! JSON input for the handover pipeline.
//!
//! # Example
//!
//! ```no_run
//! use ntn_handover::io::read_cycles;
//!
//! let cycles = read_cycles("cycle.json").expect("Failed to load");
//! println!("Loaded {} cycles", cycles.len());
//! ```

pub mod input;

pub use input::{parse_cycles, read_cycles};
