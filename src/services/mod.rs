//! Services
//!
//! Data loading and dashboard orchestration on top of the hierarchy engine.

pub mod dashboard;
pub mod data_source;
pub mod loader;

pub use dashboard::{DashboardRequest, DashboardService, DashboardView};
pub use data_source::CampaignDataSource;
pub use loader::{LeaderData, LeaderDataLoader, LoadOutcome};
