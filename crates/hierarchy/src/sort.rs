//! Tree Sorting & Filtering
//!
//! Sorts each level of the forest independently and recursively: children of
//! one leader are ordered among themselves, never against another leader's
//! children. Sorting is stable and pure (a new forest is returned), so
//! re-applying the same key and direction leaves the order unchanged.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use campaign_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use crate::conversion::{node_conversion, node_stage_count, Stage};
use crate::models::LeaderNode;

/// Column a forest can be sorted by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SortKey {
    Name,
    /// Direct-report count
    LeaderCount,
    /// Met-goal first, then `count / goal`
    Status,
    /// Sum of every action count
    Total,
    /// Count for one action
    ActionCount(String),
    /// Stage count for one action (`named` or a checkpoint field)
    Checkpoint { action_id: String, stage: Stage },
    /// Conversion between two stages of one action
    Conversion {
        action_id: String,
        from: Stage,
        to: Stage,
    },
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Name => write!(f, "name"),
            SortKey::LeaderCount => write!(f, "leaders"),
            SortKey::Status => write!(f, "status"),
            SortKey::Total => write!(f, "total"),
            SortKey::ActionCount(action_id) => write!(f, "{}", action_id),
            SortKey::Checkpoint { action_id, stage } => write!(f, "count::{}::{}", action_id, stage),
            SortKey::Conversion {
                action_id,
                from,
                to,
            } => write!(f, "conversion::{}::{}::{}", action_id, from, to),
        }
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split("::").collect();
        match parts.as_slice() {
            [""] => Err(CoreError::parse("empty sort key")),
            ["name"] => Ok(SortKey::Name),
            ["leaders"] => Ok(SortKey::LeaderCount),
            ["status"] => Ok(SortKey::Status),
            ["total"] => Ok(SortKey::Total),
            ["count", action_id, stage] if !action_id.is_empty() => Ok(SortKey::Checkpoint {
                action_id: action_id.to_string(),
                stage: stage.parse()?,
            }),
            ["conversion", action_id, from, to] if !action_id.is_empty() => Ok(SortKey::Conversion {
                action_id: action_id.to_string(),
                from: from.parse()?,
                to: to.parse()?,
            }),
            [action_id] => Ok(SortKey::ActionCount(action_id.to_string())),
            _ => Err(CoreError::parse(format!("malformed sort key: {}", s))),
        }
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for SortKey {
    type Error = CoreError;

    fn try_from(s: String) -> CoreResult<Self> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(CoreError::parse(format!("unknown sort direction: {}", other))),
        }
    }
}

/// Current sort selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortKey::Total)
    }
}

impl SortState {
    /// A freshly selected key always starts descending.
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// Selecting the current key flips direction; a new key resets to descending.
    pub fn toggle(&self, key: SortKey) -> Self {
        if key == self.key {
            Self {
                key,
                direction: self.direction.toggled(),
            }
        } else {
            Self::new(key)
        }
    }

    pub fn apply(&self, forest: &[LeaderNode]) -> Vec<LeaderNode> {
        sort_forest(forest, &self.key, self.direction)
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Met-goal flag and `count / goal` ratio across a node's actions.
fn status_of(node: &LeaderNode) -> (bool, f64) {
    if node.action_progress.is_empty() {
        return (false, 0.0);
    }
    let met = node.action_progress.values().all(|p| p.has_met_goal);
    let (count, goal) = node
        .action_progress
        .values()
        .fold((0u64, 0u64), |(c, g), p| (c + u64::from(p.count), g + u64::from(p.goal)));
    let ratio = if goal == 0 { 0.0 } else { count as f64 / goal as f64 };
    (met, ratio)
}

fn name_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Compare two sibling nodes under `key` and `direction`.
pub fn compare_nodes(a: &LeaderNode, b: &LeaderNode, key: &SortKey, direction: SortDirection) -> Ordering {
    match key {
        SortKey::Name => direction.apply(name_order(&a.name, &b.name)),
        SortKey::LeaderCount => {
            direction.apply(a.direct_report_count().cmp(&b.direct_report_count()))
        }
        SortKey::Status => {
            let (a_met, a_ratio) = status_of(a);
            let (b_met, b_ratio) = status_of(b);
            direction
                .apply(a_met.cmp(&b_met).then_with(|| a_ratio.total_cmp(&b_ratio)))
                .then_with(|| b.total_count().cmp(&a.total_count()))
        }
        SortKey::Total => direction.apply(a.total_count().cmp(&b.total_count())),
        SortKey::ActionCount(action_id) => {
            let count = |n: &LeaderNode| n.action_progress.get(action_id).map_or(0, |p| p.count);
            direction.apply(count(a).cmp(&count(b)))
        }
        SortKey::Checkpoint { action_id, stage } => direction.apply(
            node_stage_count(a, action_id, stage).cmp(&node_stage_count(b, action_id, stage)),
        ),
        SortKey::Conversion {
            action_id,
            from,
            to,
        } => direction.apply(
            node_conversion(a, action_id, from, to).total_cmp(&node_conversion(b, action_id, from, to)),
        ),
    }
}

/// Sort every level of the forest by `key`, preserving parent/child structure.
pub fn sort_forest(forest: &[LeaderNode], key: &SortKey, direction: SortDirection) -> Vec<LeaderNode> {
    let mut sorted: Vec<LeaderNode> = forest
        .iter()
        .map(|node| LeaderNode {
            sub_leaders: sort_forest(&node.sub_leaders, key, direction),
            ..node.clone()
        })
        .collect();
    sorted.sort_by(|a, b| compare_nodes(a, b, key, direction));
    sorted
}

/// Keep only top-level leaders with at least one sub-leader, with their full
/// subtrees.
pub fn leaders_of_leaders(forest: &[LeaderNode]) -> Vec<LeaderNode> {
    forest
        .iter()
        .filter(|node| node.sub_leaders.iter().any(|c| !c.is_synthetic()))
        .cloned()
        .collect()
}
