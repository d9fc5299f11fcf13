//! Settings Models
//!
//! Dashboard configuration and settings data structures.

use campaign_hierarchy::{BuildOptions, SortKey, FALLBACK_GOAL, MAX_DEPTH};
use serde::{Deserialize, Serialize};

/// Dashboard configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Tree depth limit (1..=3)
    pub max_depth: usize,
    /// Goal used when no personal, campaign, or default goal applies
    pub fallback_goal: u32,
    /// Prefer campaign goal-type targets over action defaults
    pub campaign_goal_mode: bool,
    /// Attach a node listing roster names that matched nobody
    pub include_unmatched_members: bool,
    /// Chapter used when none is given on the command line
    #[serde(default)]
    pub default_chapter: Option<String>,
    /// Maximum cached `(leader, chapter)` fetch results
    pub cache_capacity: u64,
    /// Seconds a cached fetch result stays valid
    pub cache_ttl_secs: u64,
    /// Sort key applied when none is requested
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

fn default_sort() -> String {
    "total".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            fallback_goal: FALLBACK_GOAL,
            campaign_goal_mode: false,
            include_unmatched_members: true,
            default_chapter: None,
            cache_capacity: 1000,
            cache_ttl_secs: 300,
            default_sort: default_sort(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub max_depth: Option<usize>,
    pub fallback_goal: Option<u32>,
    pub campaign_goal_mode: Option<bool>,
    pub include_unmatched_members: Option<bool>,
    pub default_chapter: Option<String>,
    pub cache_capacity: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
    pub default_sort: Option<String>,
}

impl DashboardConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(max_depth) = update.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(goal) = update.fallback_goal {
            self.fallback_goal = goal;
        }
        if let Some(enabled) = update.campaign_goal_mode {
            self.campaign_goal_mode = enabled;
        }
        if let Some(include) = update.include_unmatched_members {
            self.include_unmatched_members = include;
        }
        if let Some(chapter) = update.default_chapter {
            // an empty string clears the default
            self.default_chapter = Some(chapter).filter(|c| !c.is_empty());
        }
        if let Some(capacity) = update.cache_capacity {
            self.cache_capacity = capacity;
        }
        if let Some(ttl) = update.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        if let Some(sort) = update.default_sort {
            self.default_sort = sort;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(format!(
                "Invalid max_depth: {}. Must be between 1 and {}",
                self.max_depth, MAX_DEPTH
            ));
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be at least 1".to_string());
        }

        if self.cache_ttl_secs == 0 {
            return Err("cache_ttl_secs must be at least 1 second".to_string());
        }

        if let Err(e) = self.default_sort.parse::<SortKey>() {
            return Err(format!("Invalid default_sort: {}", e));
        }

        Ok(())
    }

    /// Build options derived from this configuration
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_depth: self.max_depth,
            include_unmatched_members: self.include_unmatched_members,
        }
    }
}
