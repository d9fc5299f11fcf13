//! Per-Leader Data Loader
//!
//! Fetches live actions and personal goals for every leader in a forest in
//! parallel. Each leader is isolated: a failed fetch leaves that leader with
//! no data and is logged, while every other leader loads normally.
//!
//! Successful results are cached per `(leader, chapter)` until `reload()`.
//! Failures are never cached, so the next rebuild retries them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use campaign_core::{ActionDefinition, GoalRecord};
use futures_util::future::join_all;
use mini_moka::sync::{Cache, ConcurrentCacheExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::settings::DashboardConfig;
use crate::services::data_source::CampaignDataSource;
use crate::utils::error::{AppError, AppResult};

type CacheKey = (String, Option<String>);

/// Everything fetched for one leader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderData {
    pub actions: Vec<ActionDefinition>,
    pub goals: Vec<GoalRecord>,
}

/// Result of loading a set of leaders.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Data for every leader whose fetches succeeded
    pub data: HashMap<String, LeaderData>,
    /// Leaders whose fetches failed, in request order
    pub failed: Vec<String>,
}

pub struct LeaderDataLoader {
    source: Arc<dyn CampaignDataSource>,
    cache: Cache<CacheKey, LeaderData>,
}

impl LeaderDataLoader {
    pub fn new(source: Arc<dyn CampaignDataSource>, capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { source, cache }
    }

    pub fn from_config(source: Arc<dyn CampaignDataSource>, config: &DashboardConfig) -> Self {
        Self::new(
            source,
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        )
    }

    /// Load one leader, serving from cache when possible.
    pub async fn load_leader(&self, leader_id: &str, chapter: Option<&str>) -> AppResult<LeaderData> {
        let key: CacheKey = (leader_id.to_string(), chapter.map(str::to_string));
        if let Some(cached) = self.cache.get(&key) {
            debug!(leader_id, "Leader data cache hit");
            return Ok(cached);
        }

        let (actions, goals) = tokio::try_join!(
            self.source.fetch_live_actions(leader_id, chapter),
            self.source.fetch_personal_goals(leader_id),
        )?;
        let data = LeaderData { actions, goals };
        self.cache.insert(key, data.clone());
        Ok(data)
    }

    /// Load every leader in parallel and wait for all of them.
    ///
    /// Returns `AppError::Cancelled` as soon as `cancel` fires; in-flight
    /// fetches are dropped and nothing further is cached.
    pub async fn load_all(
        &self,
        leader_ids: &[String],
        chapter: Option<&str>,
        cancel: &CancellationToken,
    ) -> AppResult<LoadOutcome> {
        let futures: Vec<_> = leader_ids
            .iter()
            .map(|id| async move { (id.clone(), self.load_leader(id, chapter).await) })
            .collect();

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            results = join_all(futures) => results,
        };

        let mut outcome = LoadOutcome::default();
        for (id, result) in results {
            match result {
                Ok(data) => {
                    outcome.data.insert(id, data);
                }
                Err(e) => {
                    warn!("Failed to load data for leader '{}': {}", id, e);
                    outcome.failed.push(id);
                }
            }
        }

        if !outcome.failed.is_empty() {
            warn!(
                "Leader data: {}/{} leaders failed: {:?}",
                outcome.failed.len(),
                leader_ids.len(),
                outcome.failed,
            );
        }
        Ok(outcome)
    }

    /// Drop every cached result so the next load refetches.
    pub fn reload(&self) {
        self.cache.invalidate_all();
        self.cache.sync();
    }

    /// Number of cached `(leader, chapter)` results
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.sync();
        self.cache.entry_count()
    }
}
