//! Dashboard Service
//!
//! Runs the full pipeline for one organizer:
//! 1. Resolve identities and build the leader forest
//! 2. Fetch per-leader live actions and personal goals in parallel
//! 3. Annotate progress, filter, sort, and summarize
//!
//! Every rebuild gets a new generation number and cancellation token. Starting
//! a rebuild cancels the one before it, and a rebuild whose generation is no
//! longer the latest returns `AppError::Superseded` instead of a view.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use campaign_core::{ActionDefinition, DateWindow, ListEntry};
use campaign_hierarchy::{
    build_forest, calculate_checkpoint_conversion, calculate_checkpoint_count, collect_ids,
    leaders_of_leaders, summarize, DashboardSummary, EntryIndex, GoalBook, IdentityResolver,
    LeaderNode, LiveActions, ProgressAggregator, SortState, Stage,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::models::settings::DashboardConfig;
use crate::models::snapshot::DashboardSnapshot;
use crate::services::data_source::CampaignDataSource;
use crate::services::loader::LeaderDataLoader;
use crate::utils::error::{AppError, AppResult};

/// What to show.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub root_id: String,
    pub chapter: Option<String>,
    pub sort: SortState,
    pub leaders_of_leaders: bool,
    /// Display window for rate-based actions
    pub window: Option<DateWindow>,
}

impl DashboardRequest {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            chapter: None,
            sort: SortState::default(),
            leaders_of_leaders: false,
            window: None,
        }
    }

    pub fn with_chapter(mut self, chapter: Option<String>) -> Self {
        self.chapter = chapter;
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_leaders_of_leaders(mut self, enabled: bool) -> Self {
        self.leaders_of_leaders = enabled;
        self
    }

    pub fn with_window(mut self, window: Option<DateWindow>) -> Self {
        self.window = window;
        self
    }
}

/// One finished rebuild.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub generation: u64,
    pub root_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    pub sort: SortState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    pub leaders: Vec<LeaderNode>,
    pub summary: DashboardSummary,
    /// Leaders whose per-leader fetches failed; their progress is empty
    pub failed_leaders: Vec<String>,
    #[serde(skip)]
    goals: GoalBook,
    #[serde(skip)]
    index: EntryIndex,
    /// Alternate id to primary id
    #[serde(skip)]
    canonical: HashMap<String, String>,
}

impl DashboardView {
    /// Primary id for `leader_id` when it is a known alternate
    pub fn canonical_id<'a>(&'a self, leader_id: &'a str) -> &'a str {
        self.canonical.get(leader_id).map_or(leader_id, String::as_str)
    }

    /// Resolved goal for a leader and action id, using that leader's own
    /// definition of the action
    pub fn goal_for_action(&self, leader_id: &str, action_id: &str) -> u32 {
        self.goals
            .goal_for_action(self.canonical_id(leader_id), action_id)
    }

    /// Entries of `leader_id` for `action_id` in which `field_key` is truthy
    pub fn checkpoint_count(&self, leader_id: &str, action_id: &str, field_key: &str) -> u32 {
        calculate_checkpoint_count(&self.scoped_entries(leader_id, action_id), field_key)
    }

    /// Conversion percentage between two stages for one leader and action
    pub fn checkpoint_conversion(&self, leader_id: &str, action_id: &str, from: &Stage, to: &Stage) -> f64 {
        calculate_checkpoint_conversion(&self.scoped_entries(leader_id, action_id), from, to)
    }

    /// The same leaders under a different sort, without refetching
    pub fn resorted(&self, sort: SortState) -> Self {
        Self {
            leaders: sort.apply(&self.leaders),
            sort,
            ..self.clone()
        }
    }

    fn scoped_entries(&self, leader_id: &str, action_id: &str) -> Vec<&ListEntry> {
        let leader_id = self.canonical_id(leader_id);
        match self.goals.action_for(leader_id, action_id) {
            Some(action) => self.index.scoped(leader_id, action, self.window.as_ref()),
            None => self.index.entries(leader_id, action_id).iter().collect(),
        }
    }
}

pub struct DashboardService {
    records: Arc<DashboardSnapshot>,
    loader: LeaderDataLoader,
    config: DashboardConfig,
    generation: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
}

impl DashboardService {
    /// `records` supplies the bulk lists (edges, rosters, entries, aliases,
    /// contacts, campaign goals); `source` serves per-leader fetches.
    pub fn new(
        records: Arc<DashboardSnapshot>,
        source: Arc<dyn CampaignDataSource>,
        config: DashboardConfig,
    ) -> Self {
        let loader = LeaderDataLoader::from_config(source, &config);
        Self {
            records,
            loader,
            config,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Latest generation handed out
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Drop cached per-leader data; the next rebuild refetches everything.
    pub fn reload(&self) {
        info!("Invalidating cached leader data");
        self.loader.reload();
    }

    /// Cancel the in-flight rebuild, if any.
    pub async fn cancel(&self) {
        if let Some(token) = self.current.lock().await.take() {
            token.cancel();
        }
    }

    fn superseded(&self, generation: u64) -> Option<AppError> {
        let latest = self.generation();
        (latest != generation).then_some(AppError::Superseded(latest))
    }

    /// Run the full pipeline for `request`.
    pub async fn rebuild(&self, request: &DashboardRequest) -> AppResult<DashboardView> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        let chapter = request
            .chapter
            .as_deref()
            .or(self.config.default_chapter.as_deref());
        info!(
            generation,
            root = %request.root_id,
            chapter = chapter.unwrap_or("*"),
            sort = %request.sort.key,
            "Rebuilding dashboard"
        );

        let records = Arc::clone(&self.records);
        let resolver = IdentityResolver::new(&records.aliases, &records.contacts)
            .with_known_names(records.edge_names());
        let root_id = resolver.canonical_id(&request.root_id);
        let forest = build_forest(
            &root_id,
            &records.edges,
            &records.rosters,
            &resolver,
            chapter,
            self.config.build_options(),
        );
        let leader_ids = collect_ids(&forest);

        let outcome = match self.loader.load_all(&leader_ids, chapter, &token).await {
            Ok(outcome) => outcome,
            Err(AppError::Cancelled) => {
                return Err(self.superseded(generation).unwrap_or(AppError::Cancelled));
            }
            Err(e) => return Err(e),
        };
        if let Some(err) = self.superseded(generation) {
            return Err(err);
        }

        let mut goals = GoalBook::new()
            .with_fallback_goal(self.config.fallback_goal)
            .with_campaign_goals(&records.campaign_goals, self.config.campaign_goal_mode);
        let mut live = LiveActions::new();
        let mut all_actions: Vec<ActionDefinition> = Vec::new();
        for id in &leader_ids {
            let Some(data) = outcome.data.get(id) else {
                continue;
            };
            goals.add_personal_goals(id, &data.goals);
            goals.add_leader_actions(id, &data.actions);
            for action in &data.actions {
                if !all_actions.iter().any(|a| a.action_id == action.action_id) {
                    all_actions.push(action.clone());
                }
            }
            live.insert(id.clone(), data.actions.clone());
        }

        let index = EntryIndex::new(&records.entries, &resolver);
        let annotated = ProgressAggregator::new(&index, &goals)
            .with_window(request.window)
            .with_checkpoints(true)
            .annotate(&forest, &live);
        let visible = if request.leaders_of_leaders {
            leaders_of_leaders(&annotated)
        } else {
            annotated
        };
        let leaders = request.sort.apply(&visible);
        let summary = summarize(&leaders, &all_actions);

        info!(
            generation,
            leaders = leader_ids.len(),
            failed = outcome.failed.len(),
            entries = index.len(),
            "Dashboard rebuilt"
        );

        Ok(DashboardView {
            generation,
            root_id,
            chapter: chapter.map(str::to_string),
            sort: request.sort.clone(),
            window: request.window,
            leaders,
            summary,
            failed_leaders: outcome.failed,
            goals,
            index,
            canonical: resolver.alternate_map(),
        })
    }
}
