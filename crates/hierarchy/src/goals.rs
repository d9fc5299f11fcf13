//! Goal Resolution
//!
//! Precedence, highest first:
//! 1. Personal override for `(leader, action)`
//! 2. Campaign goal-type total target, when campaign-goal mode is on and the
//!    action names a goal type with a known target
//! 3. The action's default individual goal
//! 4. `FALLBACK_GOAL`
//!
//! Rate-based actions then replace the result with `recurrence_count`: their
//! goal is "N per period", never a lifetime figure.

use std::collections::HashMap;

use campaign_core::{ActionDefinition, CampaignGoal, GoalRecord};

/// Goal used when nothing else applies.
pub const FALLBACK_GOAL: u32 = 5;

/// Owned goal inputs for one rebuild.
#[derive(Debug, Clone)]
pub struct GoalBook {
    personal: HashMap<String, HashMap<String, u32>>,
    actions: HashMap<String, ActionDefinition>,
    /// Definitions live for one leader, keyed by leader then action id
    leader_actions: HashMap<String, HashMap<String, ActionDefinition>>,
    campaign_targets: HashMap<String, u32>,
    campaign_goal_mode: bool,
    fallback_goal: u32,
}

impl Default for GoalBook {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalBook {
    pub fn new() -> Self {
        Self {
            personal: HashMap::new(),
            actions: HashMap::new(),
            leader_actions: HashMap::new(),
            campaign_targets: HashMap::new(),
            campaign_goal_mode: false,
            fallback_goal: FALLBACK_GOAL,
        }
    }

    pub fn with_fallback_goal(mut self, fallback_goal: u32) -> Self {
        self.fallback_goal = fallback_goal;
        self
    }

    /// Load campaign goal-type targets and toggle campaign-goal mode.
    pub fn with_campaign_goals(mut self, goals: &[CampaignGoal], enabled: bool) -> Self {
        self.campaign_targets = goals
            .iter()
            .map(|g| (g.goal_type.clone(), g.total_target))
            .collect();
        self.campaign_goal_mode = enabled;
        self
    }

    /// Record a leader's personal overrides. Later records for the same
    /// action replace earlier ones.
    pub fn add_personal_goals(&mut self, leader_id: &str, goals: &[GoalRecord]) {
        let overrides = self.personal.entry(leader_id.to_string()).or_default();
        for goal in goals {
            overrides.insert(goal.action_id.clone(), goal.goal_value);
        }
    }

    /// Register shared action definitions so goals can be looked up by id.
    /// The first definition of an id is kept.
    pub fn add_actions<'a>(&mut self, actions: impl IntoIterator<Item = &'a ActionDefinition>) {
        for action in actions {
            self.actions
                .entry(action.action_id.clone())
                .or_insert_with(|| action.clone());
        }
    }

    /// Register the definitions live for one leader. They take precedence over
    /// shared definitions when that leader is looked up.
    pub fn add_leader_actions<'a>(
        &mut self,
        leader_id: &str,
        actions: impl IntoIterator<Item = &'a ActionDefinition>,
    ) {
        let own = self.leader_actions.entry(leader_id.to_string()).or_default();
        for action in actions {
            own.insert(action.action_id.clone(), action.clone());
        }
    }

    /// Definition of `action_id` as `leader_id` sees it.
    pub fn action_for(&self, leader_id: &str, action_id: &str) -> Option<&ActionDefinition> {
        self.leader_actions
            .get(leader_id)
            .and_then(|own| own.get(action_id))
            .or_else(|| self.actions.get(action_id))
    }

    fn personal_override(&self, leader_id: &str, action_id: &str) -> Option<u32> {
        self.personal
            .get(leader_id)
            .and_then(|goals| goals.get(action_id))
            .copied()
    }

    /// Resolved goal for a leader and a known action definition.
    pub fn resolve(&self, leader_id: &str, action: &ActionDefinition) -> u32 {
        if action.is_rate_based() {
            if let Some(per_period) = action.recurrence_count {
                return per_period;
            }
        }

        if let Some(goal) = self.personal_override(leader_id, &action.action_id) {
            return goal;
        }
        if self.campaign_goal_mode {
            if let Some(target) = action
                .goal_type
                .as_ref()
                .and_then(|t| self.campaign_targets.get(t))
            {
                return *target;
            }
        }
        action.default_individual_goal.unwrap_or(self.fallback_goal)
    }

    /// Resolved goal by action id. Unknown actions fall back to the personal
    /// override, then the fallback goal.
    pub fn goal_for_action(&self, leader_id: &str, action_id: &str) -> u32 {
        match self.action_for(leader_id, action_id) {
            Some(action) => self.resolve(leader_id, action),
            None => self
                .personal_override(leader_id, action_id)
                .unwrap_or(self.fallback_goal),
        }
    }
}
