//! Input Records
//!
//! Already-validated records fetched from the campaign backend. The engine
//! consumes these shapes verbatim; nothing in the workspace mutates them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Hierarchy Records
// ============================================================================

/// Explicit "reports-to" edge: `leader_vanid` reports up toward
/// `parent_leader_vanid`, or directly to `organizer_vanid` when no parent is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEdge {
    /// Organizer who created the edge
    pub organizer_vanid: String,
    /// Leader being placed in the hierarchy
    pub leader_vanid: String,
    /// Leader this one reports to (None = top-level entry for the organizer)
    #[serde(default)]
    pub parent_leader_vanid: Option<String>,
    /// Display name joined in by the backend, when available
    #[serde(default)]
    pub leader_name: Option<String>,
}

impl HierarchyEdge {
    /// Create a top-level edge for an organizer
    pub fn new(organizer_vanid: impl Into<String>, leader_vanid: impl Into<String>) -> Self {
        Self {
            organizer_vanid: organizer_vanid.into(),
            leader_vanid: leader_vanid.into(),
            parent_leader_vanid: None,
            leader_name: None,
        }
    }

    /// Set the parent leader
    pub fn with_parent(mut self, parent_leader_vanid: impl Into<String>) -> Self {
        self.parent_leader_vanid = Some(parent_leader_vanid.into());
        self
    }

    /// Set the joined leader name
    pub fn with_name(mut self, leader_name: impl Into<String>) -> Self {
        self.leader_name = Some(leader_name.into());
        self
    }
}

/// A team roster. Names are free text; they are resolved to ids at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    pub team_lead: String,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub chapter: Option<String>,
}

impl TeamRoster {
    pub fn new(team_lead: impl Into<String>, team_members: Vec<String>) -> Self {
        Self {
            team_lead: team_lead.into(),
            team_members,
            chapter: None,
        }
    }

    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }

    /// Rosters without a chapter apply everywhere. Chapter names compare
    /// case-insensitively.
    pub fn in_chapter(&self, chapter: &str) -> bool {
        self.chapter
            .as_deref()
            .map_or(true, |c| c.eq_ignore_ascii_case(chapter))
    }
}

// ============================================================================
// List Entries
// ============================================================================

/// One person assigned to one action under one organizer, with per-field progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Organizer (leader) who owns the list
    pub organizer_vanid: String,
    /// Person on the list
    pub vanid: String,
    /// Action this entry tracks
    pub action_id: String,
    #[serde(default)]
    pub contact_name: String,
    /// Field key -> value; values may be booleans, "true"/"1" strings, or numbers
    #[serde(default)]
    pub progress: BTreeMap<String, Value>,
    /// Last progress update, used to window rate-based actions
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ListEntry {
    /// Create an entry with no progress recorded
    pub fn new(
        organizer_vanid: impl Into<String>,
        vanid: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        Self {
            organizer_vanid: organizer_vanid.into(),
            vanid: vanid.into(),
            action_id: action_id.into(),
            contact_name: String::new(),
            progress: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// Set a progress field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.progress.insert(key.into(), value.into());
        self
    }

    /// Set the update timestamp
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Whether the given field is truthy for this entry. Missing fields are false.
    pub fn field_is_truthy(&self, key: &str) -> bool {
        self.progress.get(key).is_some_and(is_truthy)
    }

    /// Calendar date of the last update, if any
    pub fn date(&self) -> Option<NaiveDate> {
        self.updated_at.map(|ts| ts.date_naive())
    }
}

/// Truthiness rule for progress values: `true`, `"true"`, `"1"`, or numeric 1.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true" || s == "1",
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

// ============================================================================
// Action Definitions
// ============================================================================

/// Declared type of an action field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    #[serde(alias = "checkbox")]
    Boolean,
    Text,
    Number,
    Date,
    Select,
    #[serde(other)]
    Other,
}

/// One field in an action's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionField {
    pub key: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl ActionField {
    /// Create a boolean checkpoint field
    pub fn boolean(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type: FieldType::Boolean,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.field_type == FieldType::Boolean
    }
}

/// Whether an action's goal is a lifetime target or recurs per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    OneTime,
    RateBased,
}

/// Recurrence period of a rate-based action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePeriod {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Who an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    #[default]
    Constituent,
    Leadership,
}

/// A tracked campaign activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique action identifier
    pub action_id: String,
    /// Display name (e.g., "Sign Pledge")
    pub name: String,
    /// Ordered field pipeline
    #[serde(default)]
    pub fields: Vec<ActionField>,
    /// Whether the dashboard should display a goal for this action
    #[serde(default)]
    pub has_goal: bool,
    /// Default per-leader goal
    #[serde(default)]
    pub default_individual_goal: Option<u32>,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub recurrence_period: Option<RecurrencePeriod>,
    /// Goal per period for rate-based actions
    #[serde(default)]
    pub recurrence_count: Option<u32>,
    #[serde(default)]
    pub target_audience: TargetAudience,
    /// Campaign goal type this action contributes to
    #[serde(default)]
    pub goal_type: Option<String>,
}

impl ActionDefinition {
    /// Create a one-time action with the given fields and no goal settings
    pub fn new(
        action_id: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<ActionField>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            name: name.into(),
            fields,
            has_goal: false,
            default_individual_goal: None,
            action_type: ActionType::OneTime,
            recurrence_period: None,
            recurrence_count: None,
            target_audience: TargetAudience::Constituent,
            goal_type: None,
        }
    }

    /// Mark the action goal-bearing with a default individual goal
    pub fn with_default_goal(mut self, goal: u32) -> Self {
        self.has_goal = true;
        self.default_individual_goal = Some(goal);
        self
    }

    /// Make the action rate-based: `count` per `period`
    pub fn rate_based(mut self, period: RecurrencePeriod, count: u32) -> Self {
        self.has_goal = true;
        self.action_type = ActionType::RateBased;
        self.recurrence_period = Some(period);
        self.recurrence_count = Some(count);
        self
    }

    /// Link the action to a campaign goal type
    pub fn with_goal_type(mut self, goal_type: impl Into<String>) -> Self {
        self.goal_type = Some(goal_type.into());
        self
    }

    pub fn is_rate_based(&self) -> bool {
        self.action_type == ActionType::RateBased
    }

    /// Boolean fields in pipeline order
    pub fn boolean_fields(&self) -> impl Iterator<Item = &ActionField> {
        self.fields.iter().filter(|f| f.is_boolean())
    }

    /// Whether the action has a checkpoint pipeline (two or more boolean fields)
    pub fn has_checkpoint_pipeline(&self) -> bool {
        self.boolean_fields().nth(1).is_some()
    }

    /// True when every declared field is truthy on the entry.
    pub fn is_complete(&self, entry: &ListEntry) -> bool {
        self.fields.iter().all(|f| entry.field_is_truthy(&f.key))
    }
}

// ============================================================================
// Goals
// ============================================================================

/// Personal goal override for one organizer and action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub action_id: String,
    pub goal_value: u32,
}

impl GoalRecord {
    pub fn new(action_id: impl Into<String>, goal_value: u32) -> Self {
        Self {
            action_id: action_id.into(),
            goal_value,
        }
    }
}

/// Campaign-level target for a goal type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignGoal {
    pub goal_type: String,
    pub total_target: u32,
}

// ============================================================================
// Identity Records
// ============================================================================

/// Alias table row tying alternate ids and name spellings to one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMapping {
    pub primary_vanid: String,
    #[serde(default)]
    pub alternate_vanids: Vec<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub name_variations: Vec<String>,
}

impl AliasMapping {
    pub fn new(primary_vanid: impl Into<String>) -> Self {
        Self {
            primary_vanid: primary_vanid.into(),
            alternate_vanids: Vec::new(),
            preferred_name: None,
            name_variations: Vec::new(),
        }
    }

    pub fn with_alternates(mut self, ids: &[&str]) -> Self {
        self.alternate_vanids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_preferred_name(mut self, name: impl Into<String>) -> Self {
        self.preferred_name = Some(name.into());
        self
    }

    pub fn with_variations(mut self, names: &[&str]) -> Self {
        self.name_variations = names.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// Contact directory row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub vanid: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub member_status: Option<String>,
}

impl Contact {
    pub fn new(vanid: impl Into<String>, first_name: &str, last_name: &str) -> Self {
        Self {
            vanid: vanid.into(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            member_status: None,
        }
    }

    pub fn with_member_status(mut self, status: impl Into<String>) -> Self {
        self.member_status = Some(status.into());
        self
    }

    /// "First Last", or whichever part exists. None when both are blank.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
