//! Snapshot Storage
//!
//! Loads a `DashboardSnapshot` from disk and serves per-leader reads from it
//! through `CampaignDataSource`.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use campaign_core::{ActionDefinition, GoalRecord};
use tracing::debug;

use crate::models::snapshot::DashboardSnapshot;
use crate::services::data_source::CampaignDataSource;
use crate::utils::error::{AppError, AppResult};

/// Read a snapshot document
pub fn load_snapshot(path: &Path) -> AppResult<DashboardSnapshot> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::not_found(format!("{}: {}", path.display(), e)))?;
    let snapshot: DashboardSnapshot = serde_json::from_str(&content)?;
    debug!(
        path = %path.display(),
        edges = snapshot.edges.len(),
        rosters = snapshot.rosters.len(),
        entries = snapshot.entries.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

/// `CampaignDataSource` backed by an in-memory snapshot.
#[derive(Debug)]
pub struct SnapshotDataSource {
    snapshot: Arc<DashboardSnapshot>,
    /// Simulated per-fetch latency
    latency: Option<Duration>,
    fetches: AtomicUsize,
}

impl SnapshotDataSource {
    pub fn new(snapshot: Arc<DashboardSnapshot>) -> Self {
        Self {
            snapshot,
            latency: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        Ok(Self::new(Arc::new(load_snapshot(path)?)))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Number of per-leader fetch calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn begin_fetch(&self, leader_id: &str) -> AppResult<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.snapshot.failing_leaders.iter().any(|id| id == leader_id) {
            return Err(AppError::data_source(format!(
                "backend unavailable for leader {}",
                leader_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CampaignDataSource for SnapshotDataSource {
    async fn fetch_live_actions(
        &self,
        leader_id: &str,
        chapter: Option<&str>,
    ) -> AppResult<Vec<ActionDefinition>> {
        self.begin_fetch(leader_id).await?;
        Ok(self.snapshot.actions_for(leader_id, chapter))
    }

    async fn fetch_personal_goals(&self, leader_id: &str) -> AppResult<Vec<GoalRecord>> {
        self.begin_fetch(leader_id).await?;
        Ok(self.snapshot.goals_for(leader_id))
    }
}
