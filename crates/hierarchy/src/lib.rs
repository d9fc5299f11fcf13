//! Campaign Hierarchy
//!
//! The pure engine behind the leader dashboard: builds the leader forest under
//! an organizer, annotates it with goal progress, computes checkpoint
//! conversions, and sorts or filters the result. Nothing here performs I/O;
//! callers hand in already-fetched records.
//!
//! ## Module Organization
//!
//! - `identity` - Alias canonicalization, display names, name-to-id resolution
//! - `builder` - Forest construction from explicit and team edges
//! - `entries` - Per-leader, per-action entry index with date windowing
//! - `goals` - Goal precedence resolution
//! - `progress` - Per-node progress annotation
//! - `conversion` - Checkpoint counts and stage-to-stage conversion rates
//! - `sort` - Sort keys, per-level stable sorting, leaders-of-leaders filter
//! - `rollup` - Campaign-wide totals per action
//! - `models` - `LeaderNode` and `Progress`

pub mod builder;
pub mod conversion;
pub mod entries;
pub mod goals;
pub mod identity;
pub mod models;
pub mod progress;
pub mod rollup;
pub mod sort;

// ── Tree Models ────────────────────────────────────────────────────────
pub use models::{collect_ids, find_node, flatten, forest_depth, LeaderNode, NodeMetadata, Progress};

// ── Identity ───────────────────────────────────────────────────────────
pub use identity::IdentityResolver;

// ── Hierarchy Construction ─────────────────────────────────────────────
pub use builder::{
    build_forest, BuildOptions, ChildLink, EdgeSource, ExplicitEdges, HierarchyBuilder, Provenance,
    TeamEdges, MAX_DEPTH,
};

// ── Progress & Goals ───────────────────────────────────────────────────
pub use entries::EntryIndex;
pub use goals::{GoalBook, FALLBACK_GOAL};
pub use progress::{LiveActions, ProgressAggregator};

// ── Conversion ─────────────────────────────────────────────────────────
pub use conversion::{
    calculate_checkpoint_conversion, calculate_checkpoint_count, checkpoint_counts,
    conversion_rate, node_conversion, node_stage_count, pipeline_stages, stage_count,
    CheckpointBreakdown, RateBand, Stage, StageConversion, StageCount, NAMED_STAGE,
};

// ── Sorting & Filtering ────────────────────────────────────────────────
pub use sort::{compare_nodes, leaders_of_leaders, sort_forest, SortDirection, SortKey, SortState};

// ── Rollups ────────────────────────────────────────────────────────────
pub use rollup::{summarize, ActionSummary, DashboardSummary};
