//! Data Source Seam
//!
//! Per-leader reads from the campaign backend. Everything else the dashboard
//! needs (edges, rosters, entries, aliases) arrives in bulk; only live action
//! sets and personal goals are fetched leader by leader.

use async_trait::async_trait;
use campaign_core::{ActionDefinition, GoalRecord};

use crate::utils::error::AppResult;

#[async_trait]
pub trait CampaignDataSource: Send + Sync {
    /// Actions `leader_id` currently has live, scoped to `chapter` when given.
    async fn fetch_live_actions(
        &self,
        leader_id: &str,
        chapter: Option<&str>,
    ) -> AppResult<Vec<ActionDefinition>>;

    /// Personal goal overrides for `leader_id`.
    async fn fetch_personal_goals(&self, leader_id: &str) -> AppResult<Vec<GoalRecord>>;
}
