//! Progress Aggregation
//!
//! Annotates every node with per-action `Progress` for the actions that node
//! currently has live. Live action sets are fetched per leader; a leader with
//! no entry in the live map (its fetch failed) gets empty progress while its
//! siblings are annotated normally.

use std::collections::{BTreeMap, HashMap};

use campaign_core::{ActionDefinition, DateWindow};

use crate::conversion::checkpoint_counts;
use crate::entries::EntryIndex;
use crate::goals::GoalBook;
use crate::models::{LeaderNode, Progress};

/// Live action definitions per leader id.
pub type LiveActions = HashMap<String, Vec<ActionDefinition>>;

pub struct ProgressAggregator<'a> {
    index: &'a EntryIndex,
    goals: &'a GoalBook,
    window: Option<DateWindow>,
    include_checkpoints: bool,
}

impl<'a> ProgressAggregator<'a> {
    pub fn new(index: &'a EntryIndex, goals: &'a GoalBook) -> Self {
        Self {
            index,
            goals,
            window: None,
            include_checkpoints: false,
        }
    }

    /// Display window applied to rate-based actions
    pub fn with_window(mut self, window: Option<DateWindow>) -> Self {
        self.window = window;
        self
    }

    /// Also fill `Progress::checkpoints` for pipeline actions
    pub fn with_checkpoints(mut self, include: bool) -> Self {
        self.include_checkpoints = include;
        self
    }

    /// Progress for one leader and action.
    pub fn progress_for(&self, leader_id: &str, action: &ActionDefinition) -> Progress {
        let entries = self.index.scoped(leader_id, action, self.window.as_ref());
        let named_count = entries.len() as u32;
        let count = entries.iter().filter(|e| action.is_complete(e)).count() as u32;
        let goal = self.goals.resolve(leader_id, action);

        let progress = Progress::new(count, named_count, goal);
        if self.include_checkpoints {
            progress.with_checkpoints(checkpoint_counts(action, &entries))
        } else {
            progress
        }
    }

    /// Return a new forest with `action_progress` filled in on every node.
    pub fn annotate(&self, forest: &[LeaderNode], live: &LiveActions) -> Vec<LeaderNode> {
        forest.iter().map(|node| self.annotate_node(node, live)).collect()
    }

    fn annotate_node(&self, node: &LeaderNode, live: &LiveActions) -> LeaderNode {
        let action_progress: BTreeMap<String, Progress> = if node.is_synthetic() {
            BTreeMap::new()
        } else {
            live.get(&node.id)
                .map(|actions| {
                    actions
                        .iter()
                        .map(|action| (action.action_id.clone(), self.progress_for(&node.id, action)))
                        .collect()
                })
                .unwrap_or_default()
        };

        LeaderNode {
            id: node.id.clone(),
            name: node.name.clone(),
            sub_leaders: self.annotate(&node.sub_leaders, live),
            is_automatic: node.is_automatic,
            member_status: node.member_status.clone(),
            action_progress,
            metadata: node.metadata.clone(),
        }
    }
}
