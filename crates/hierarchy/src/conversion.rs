//! Checkpoint Conversion
//!
//! For actions whose field list holds two or more boolean checkpoints, counts
//! how many entries reached each checkpoint and the stage-to-stage conversion
//! percentage. `named` (every entry on the list) is the synthetic stage 0.
//!
//! Aggregate conversions are sum-then-divide over the nodes being rolled up,
//! never an average of per-node rates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use campaign_core::{ActionDefinition, CoreError, CoreResult, ListEntry};
use serde::{Deserialize, Serialize};

use crate::models::LeaderNode;

/// Wire token for the synthetic first stage.
pub const NAMED_STAGE: &str = "named";

/// One stage of an action pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Stage {
    /// Every entry on the list
    Named,
    /// Entries where this boolean field is truthy
    Field(String),
}

impl Stage {
    pub fn field(key: impl Into<String>) -> Self {
        Stage::Field(key.into())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Named => write!(f, "{}", NAMED_STAGE),
            Stage::Field(key) => write!(f, "{}", key),
        }
    }
}

impl FromStr for Stage {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "" => Err(CoreError::parse("empty stage key")),
            NAMED_STAGE => Ok(Stage::Named),
            key => Ok(Stage::Field(key.to_string())),
        }
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> String {
        stage.to_string()
    }
}

impl TryFrom<String> for Stage {
    type Error = CoreError;

    fn try_from(s: String) -> CoreResult<Self> {
        s.parse()
    }
}

/// Presentational band for a conversion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBand {
    Good,
    Warning,
    Poor,
}

impl RateBand {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 50.0 {
            RateBand::Good
        } else if rate >= 25.0 {
            RateBand::Warning
        } else {
            RateBand::Poor
        }
    }
}

// ============================================================================
// Counting
// ============================================================================

/// Number of entries where `field_key` is truthy.
pub fn calculate_checkpoint_count(entries: &[&ListEntry], field_key: &str) -> u32 {
    entries.iter().filter(|e| e.field_is_truthy(field_key)).count() as u32
}

/// Number of entries that reached `stage`.
pub fn stage_count(entries: &[&ListEntry], stage: &Stage) -> u32 {
    match stage {
        Stage::Named => entries.len() as u32,
        Stage::Field(key) => calculate_checkpoint_count(entries, key),
    }
}

/// `to / from * 100`, defined as exactly 0 when `from` is 0.
pub fn conversion_rate(from: u32, to: u32) -> f64 {
    if from == 0 {
        0.0
    } else {
        f64::from(to) * 100.0 / f64::from(from)
    }
}

/// Conversion percentage between two stages over one set of entries.
pub fn calculate_checkpoint_conversion(entries: &[&ListEntry], from: &Stage, to: &Stage) -> f64 {
    conversion_rate(stage_count(entries, from), stage_count(entries, to))
}

/// `named` followed by every boolean field, in pipeline order.
pub fn pipeline_stages(action: &ActionDefinition) -> Vec<Stage> {
    std::iter::once(Stage::Named)
        .chain(action.boolean_fields().map(|f| Stage::field(f.key.clone())))
        .collect()
}

/// Truthy count per boolean field, or empty for actions without a pipeline.
pub fn checkpoint_counts(action: &ActionDefinition, entries: &[&ListEntry]) -> BTreeMap<String, u32> {
    if !action.has_checkpoint_pipeline() {
        return BTreeMap::new();
    }
    action
        .boolean_fields()
        .map(|f| (f.key.clone(), calculate_checkpoint_count(entries, &f.key)))
        .collect()
}

/// Count for `stage` read from a node's annotated progress.
pub fn node_stage_count(node: &LeaderNode, action_id: &str, stage: &Stage) -> u32 {
    let Some(progress) = node.action_progress.get(action_id) else {
        return 0;
    };
    match stage {
        Stage::Named => progress.named_count,
        Stage::Field(key) => progress.checkpoints.get(key).copied().unwrap_or(0),
    }
}

/// Conversion between two stages read from a node's annotated progress.
pub fn node_conversion(node: &LeaderNode, action_id: &str, from: &Stage, to: &Stage) -> f64 {
    conversion_rate(
        node_stage_count(node, action_id, from),
        node_stage_count(node, action_id, to),
    )
}

// ============================================================================
// Breakdown
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: Stage,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConversion {
    pub from: Stage,
    pub to: Stage,
    pub rate: f64,
    pub band: RateBand,
}

/// Every stage count and adjacent-stage conversion for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointBreakdown {
    pub action_id: String,
    pub stages: Vec<StageCount>,
    pub conversions: Vec<StageConversion>,
}

impl CheckpointBreakdown {
    /// Build from counts aligned with `pipeline_stages(action)`.
    fn from_counts(action: &ActionDefinition, counts: &[u32]) -> Self {
        let stages: Vec<StageCount> = pipeline_stages(action)
            .into_iter()
            .zip(counts.iter().copied())
            .map(|(stage, count)| {
                let label = match &stage {
                    Stage::Named => "Named".to_string(),
                    Stage::Field(key) => action
                        .fields
                        .iter()
                        .find(|f| &f.key == key)
                        .map(|f| f.label.clone())
                        .unwrap_or_else(|| key.clone()),
                };
                StageCount { stage, label, count }
            })
            .collect();

        let conversions = stages
            .windows(2)
            .map(|pair| {
                let rate = conversion_rate(pair[0].count, pair[1].count);
                StageConversion {
                    from: pair[0].stage.clone(),
                    to: pair[1].stage.clone(),
                    rate,
                    band: RateBand::from_rate(rate),
                }
            })
            .collect();

        Self {
            action_id: action.action_id.clone(),
            stages,
            conversions,
        }
    }

    /// Breakdown over one set of entries. None when the action has no pipeline.
    pub fn for_entries(action: &ActionDefinition, entries: &[&ListEntry]) -> Option<Self> {
        if !action.has_checkpoint_pipeline() {
            return None;
        }
        let counts: Vec<u32> = pipeline_stages(action)
            .iter()
            .map(|stage| stage_count(entries, stage))
            .collect();
        Some(Self::from_counts(action, &counts))
    }

    /// Sum-then-divide breakdown across annotated nodes.
    pub fn aggregate<'a>(
        action: &ActionDefinition,
        nodes: impl IntoIterator<Item = &'a LeaderNode>,
    ) -> Option<Self> {
        if !action.has_checkpoint_pipeline() {
            return None;
        }
        let stages = pipeline_stages(action);
        let mut totals = vec![0u32; stages.len()];
        for node in nodes {
            for (total, stage) in totals.iter_mut().zip(&stages) {
                *total = total.saturating_add(node_stage_count(node, &action.action_id, stage));
            }
        }
        Some(Self::from_counts(action, &totals))
    }

    /// Rate between two listed stages, 0 if either is absent
    pub fn rate(&self, from: &Stage, to: &Stage) -> f64 {
        let count = |stage: &Stage| {
            self.stages
                .iter()
                .find(|s| &s.stage == stage)
                .map(|s| s.count)
        };
        match (count(from), count(to)) {
            (Some(f), Some(t)) => conversion_rate(f, t),
            _ => 0.0,
        }
    }
}
