//! Data Models
//!
//! Configuration and snapshot data structures used by the application layer.

pub mod settings;
pub mod snapshot;

pub use settings::*;
pub use snapshot::*;
