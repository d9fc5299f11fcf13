//! Campaign Dashboard - Application Library
//!
//! Wires the hierarchy engine to its data sources. It includes:
//! - Per-leader data loading with caching and cancellation
//! - The dashboard rebuild pipeline
//! - Storage layer (JSON config, record snapshots)
//! - Data models and utilities

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::settings::{DashboardConfig, SettingsUpdate};
pub use models::snapshot::{DashboardSnapshot, LiveActionSet};
pub use services::{
    CampaignDataSource, DashboardRequest, DashboardService, DashboardView, LeaderData,
    LeaderDataLoader, LoadOutcome,
};
pub use storage::{load_snapshot, ConfigService, SnapshotDataSource};
pub use utils::error::{AppError, AppResult};
