//! Dashboard Rollups
//!
//! Campaign-wide totals across every real leader in an annotated forest.
//! Synthetic nodes never contribute.

use std::collections::BTreeMap;

use campaign_core::ActionDefinition;
use serde::{Deserialize, Serialize};

use crate::conversion::CheckpointBreakdown;
use crate::models::{flatten, LeaderNode};

/// Totals for one action across the leaders that have it live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    pub action_id: String,
    pub action_name: String,
    /// Leaders carrying progress for this action
    pub leader_count: usize,
    pub count: u64,
    pub named_count: u64,
    /// Sum of resolved goals
    pub goal: u64,
    pub leaders_met: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<CheckpointBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub leader_count: usize,
    pub total_count: u64,
    pub actions: Vec<ActionSummary>,
}

/// Summarize `forest` for the given action definitions.
///
/// Actions nobody has live are omitted. Output is ordered by action name,
/// then id.
pub fn summarize(forest: &[LeaderNode], actions: &[ActionDefinition]) -> DashboardSummary {
    let nodes = flatten(forest);

    let mut definitions: BTreeMap<&str, &ActionDefinition> = BTreeMap::new();
    for action in actions {
        definitions.entry(action.action_id.as_str()).or_insert(action);
    }

    let mut summaries: Vec<ActionSummary> = definitions
        .values()
        .filter_map(|action| summarize_action(action, &nodes))
        .collect();
    summaries.sort_by(|a, b| {
        a.action_name
            .cmp(&b.action_name)
            .then_with(|| a.action_id.cmp(&b.action_id))
    });

    DashboardSummary {
        leader_count: nodes.len(),
        total_count: nodes.iter().map(|n| n.total_count()).sum(),
        actions: summaries,
    }
}

fn summarize_action(action: &ActionDefinition, nodes: &[&LeaderNode]) -> Option<ActionSummary> {
    let carrying: Vec<&LeaderNode> = nodes
        .iter()
        .copied()
        .filter(|n| n.action_progress.contains_key(&action.action_id))
        .collect();
    if carrying.is_empty() {
        return None;
    }

    let mut summary = ActionSummary {
        action_id: action.action_id.clone(),
        action_name: action.name.clone(),
        leader_count: carrying.len(),
        count: 0,
        named_count: 0,
        goal: 0,
        leaders_met: 0,
        breakdown: CheckpointBreakdown::aggregate(action, carrying.iter().copied()),
    };
    for progress in carrying.iter().filter_map(|n| n.action_progress.get(&action.action_id)) {
        summary.count += u64::from(progress.count);
        summary.named_count += u64::from(progress.named_count);
        summary.goal += u64::from(progress.goal);
        if progress.has_met_goal {
            summary.leaders_met += 1;
        }
    }
    Some(summary)
}
