//! List Entry Index
//!
//! Groups list entries by `(canonical organizer, action)` once per rebuild so
//! per-node lookups during aggregation are map hits rather than scans.

use std::collections::HashMap;

use campaign_core::{ActionDefinition, DateWindow, ListEntry};

use crate::identity::IdentityResolver;

#[derive(Debug, Clone, Default)]
pub struct EntryIndex {
    by_organizer: HashMap<String, HashMap<String, Vec<ListEntry>>>,
    len: usize,
}

impl EntryIndex {
    /// Index entries under the canonical id of their organizer.
    pub fn new(entries: &[ListEntry], resolver: &IdentityResolver<'_>) -> Self {
        let mut by_organizer: HashMap<String, HashMap<String, Vec<ListEntry>>> = HashMap::new();
        for entry in entries {
            by_organizer
                .entry(resolver.canonical_id(&entry.organizer_vanid))
                .or_default()
                .entry(entry.action_id.clone())
                .or_default()
                .push(entry.clone());
        }
        Self {
            by_organizer,
            len: entries.len(),
        }
    }

    /// Total number of indexed entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every entry for a leader and action
    pub fn entries(&self, leader_id: &str, action_id: &str) -> &[ListEntry] {
        self.by_organizer
            .get(leader_id)
            .and_then(|actions| actions.get(action_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entries that count for `action` under `leader_id`.
    ///
    /// Rate-based actions are restricted to `window` when one is supplied;
    /// one-time actions always see every entry.
    pub fn scoped(
        &self,
        leader_id: &str,
        action: &ActionDefinition,
        window: Option<&DateWindow>,
    ) -> Vec<&ListEntry> {
        let entries = self.entries(leader_id, &action.action_id);
        match window {
            Some(window) if action.is_rate_based() => entries
                .iter()
                .filter(|e| window.contains_entry(e))
                .collect(),
            _ => entries.iter().collect(),
        }
    }
}
