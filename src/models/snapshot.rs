//! Snapshot Models
//!
//! A point-in-time export of everything the dashboard reads from the campaign
//! backend, stored as one JSON document.

use std::collections::BTreeMap;

use campaign_core::{
    ActionDefinition, AliasMapping, CampaignGoal, Contact, GoalRecord, HierarchyEdge, ListEntry,
    TeamRoster,
};
use serde::{Deserialize, Serialize};

/// Actions one organizer has live, optionally scoped to a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveActionSet {
    pub organizer_vanid: String,
    /// None applies to every chapter
    #[serde(default)]
    pub chapter: Option<String>,
    pub actions: Vec<ActionDefinition>,
}

impl LiveActionSet {
    pub fn applies_to(&self, organizer_vanid: &str, chapter: Option<&str>) -> bool {
        if self.organizer_vanid != organizer_vanid {
            return false;
        }
        match (self.chapter.as_deref(), chapter) {
            (None, _) | (_, None) => true,
            (Some(own), Some(requested)) => own.eq_ignore_ascii_case(requested),
        }
    }
}

/// Every record list the dashboard consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSnapshot {
    pub edges: Vec<HierarchyEdge>,
    pub rosters: Vec<TeamRoster>,
    pub entries: Vec<ListEntry>,
    pub aliases: Vec<AliasMapping>,
    pub contacts: Vec<Contact>,
    pub campaign_goals: Vec<CampaignGoal>,
    pub live_actions: Vec<LiveActionSet>,
    /// Personal goal overrides keyed by leader id
    pub personal_goals: BTreeMap<String, Vec<GoalRecord>>,
    /// Leaders whose per-leader fetches fail, for rehearsing outages
    pub failing_leaders: Vec<String>,
}

impl DashboardSnapshot {
    /// Live actions for a leader, deduplicated by action id in snapshot order.
    pub fn actions_for(&self, leader_id: &str, chapter: Option<&str>) -> Vec<ActionDefinition> {
        let mut actions: Vec<ActionDefinition> = Vec::new();
        for set in self
            .live_actions
            .iter()
            .filter(|s| s.applies_to(leader_id, chapter))
        {
            for action in &set.actions {
                if !actions.iter().any(|a| a.action_id == action.action_id) {
                    actions.push(action.clone());
                }
            }
        }
        actions
    }

    pub fn goals_for(&self, leader_id: &str) -> Vec<GoalRecord> {
        self.personal_goals.get(leader_id).cloned().unwrap_or_default()
    }

    /// `(id, name)` pairs joined onto hierarchy edges
    pub fn edge_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().filter_map(|e| {
            e.leader_name
                .as_deref()
                .map(|name| (e.leader_vanid.as_str(), name))
        })
    }
}
