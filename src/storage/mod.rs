//! Storage Layer
//!
//! Handles persistence: the JSON config file and JSON record snapshots.

pub mod config;
pub mod snapshot;

pub use config::*;
pub use snapshot::*;
