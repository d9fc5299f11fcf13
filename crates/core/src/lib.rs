//! Campaign Core
//!
//! Foundational records, error types, and date-window math for the campaign
//! dashboard workspace. This crate has zero dependencies on application-level
//! code (data sources, caching, async runtimes).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `records` - Input records fetched from the campaign backend (edges, rosters, entries, actions, goals, aliases)
//! - `window` - Inclusive date windows and recurrence-period math

pub mod error;
pub mod records;
pub mod window;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Records ────────────────────────────────────────────────────────────
pub use records::{
    is_truthy, ActionDefinition, ActionField, ActionType, AliasMapping, CampaignGoal, Contact,
    FieldType, GoalRecord, HierarchyEdge, ListEntry, RecurrencePeriod, TargetAudience, TeamRoster,
};

// ── Date Windows ───────────────────────────────────────────────────────
pub use window::{parse_date, DateWindow};
