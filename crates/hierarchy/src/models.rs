//! Tree Models
//!
//! The annotated leader tree handed to the presentation layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-action progress for one leader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Entries with every declared field complete
    pub count: u32,
    /// Entries on the list regardless of field completion
    pub named_count: u32,
    /// Resolved goal
    pub goal: u32,
    /// `count >= goal`
    pub has_met_goal: bool,
    /// Truthy count per boolean field, for actions with a checkpoint pipeline
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checkpoints: BTreeMap<String, u32>,
}

impl Progress {
    pub fn new(count: u32, named_count: u32, goal: u32) -> Self {
        Self {
            count,
            named_count,
            goal,
            has_met_goal: count >= goal,
            checkpoints: BTreeMap::new(),
        }
    }

    pub fn with_checkpoints(mut self, checkpoints: BTreeMap<String, u32>) -> Self {
        self.checkpoints = checkpoints;
        self
    }
}

/// Extra information carried by synthetic nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeMetadata {
    /// Roster names under a team lead that matched no known person
    UnmatchedMembers { team_lead: String, names: Vec<String> },
}

/// One leader in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderNode {
    pub id: String,
    /// Resolved display name
    pub name: String,
    #[serde(default)]
    pub sub_leaders: Vec<LeaderNode>,
    /// Derived from (or also reachable through) team membership
    #[serde(default)]
    pub is_automatic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_status: Option<String>,
    #[serde(default)]
    pub action_progress: BTreeMap<String, Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl LeaderNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sub_leaders: Vec::new(),
            is_automatic: false,
            member_status: None,
            action_progress: BTreeMap::new(),
            metadata: None,
        }
    }

    pub fn with_sub_leaders(mut self, sub_leaders: Vec<LeaderNode>) -> Self {
        self.sub_leaders = sub_leaders;
        self
    }

    pub fn with_progress(mut self, action_id: impl Into<String>, progress: Progress) -> Self {
        self.action_progress.insert(action_id.into(), progress);
        self
    }

    /// Synthetic nodes stand in for people, not a real leader.
    pub fn is_synthetic(&self) -> bool {
        self.metadata.is_some()
    }

    pub fn direct_report_count(&self) -> usize {
        self.sub_leaders.len()
    }

    /// Sum of counts across every action
    pub fn total_count(&self) -> u64 {
        self.action_progress.values().map(|p| u64::from(p.count)).sum()
    }

    /// Height of the subtree rooted here (a leaf is 1)
    pub fn height(&self) -> usize {
        1 + self
            .sub_leaders
            .iter()
            .map(LeaderNode::height)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order visit of this node and every descendant
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a LeaderNode)) {
        f(self);
        for child in &self.sub_leaders {
            child.visit(f);
        }
    }

    /// Find a node by id in this subtree
    pub fn find(&self, id: &str) -> Option<&LeaderNode> {
        if self.id == id {
            return Some(self);
        }
        self.sub_leaders.iter().find_map(|c| c.find(id))
    }
}

/// Every real (non-synthetic) node id in the forest, pre-order.
pub fn collect_ids(forest: &[LeaderNode]) -> Vec<String> {
    let mut ids = Vec::new();
    for root in forest {
        root.visit(&mut |node| {
            if !node.is_synthetic() {
                ids.push(node.id.clone());
            }
        });
    }
    ids
}

/// Every real node in the forest, pre-order.
pub fn flatten(forest: &[LeaderNode]) -> Vec<&LeaderNode> {
    let mut nodes = Vec::new();
    for root in forest {
        root.visit(&mut |node| {
            if !node.is_synthetic() {
                nodes.push(node);
            }
        });
    }
    nodes
}

/// Find a node by id anywhere in the forest
pub fn find_node<'a>(forest: &'a [LeaderNode], id: &str) -> Option<&'a LeaderNode> {
    forest.iter().find_map(|root| root.find(id))
}

/// Deepest level in the forest; top-level nodes are depth 1.
pub fn forest_depth(forest: &[LeaderNode]) -> usize {
    forest.iter().map(LeaderNode::height).max().unwrap_or(0)
}
