//! Data model shared by every stage of the handover cycle.

pub mod candidate;
pub mod conditions;
pub mod constellation;
pub mod decision;
pub mod event;
pub mod position;
pub mod signal;

pub use candidate::*;
pub use conditions::*;
pub use constellation::*;
pub use decision::*;
pub use event::*;
pub use position::*;
pub use signal::*;
