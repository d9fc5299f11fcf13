//! Sorting Integration Tests
//!
//! Sorts annotated forests through the public sort API and checks per-level
//! ordering, direction toggling, stability, and the leaders-of-leaders filter.

use campaign_hierarchy::{
    leaders_of_leaders, sort_forest, LeaderNode, Progress, SortDirection, SortKey, SortState,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn leader(id: &str, name: &str, counts: &[(&str, u32, u32)]) -> LeaderNode {
    counts
        .iter()
        .fold(LeaderNode::new(id, name), |node, (action, count, goal)| {
            node.with_progress(*action, Progress::new(*count, *count, *goal))
        })
}

fn ids(forest: &[LeaderNode]) -> Vec<&str> {
    forest.iter().map(|n| n.id.as_str()).collect()
}

fn sample_forest() -> Vec<LeaderNode> {
    vec![
        leader("maria", "Maria", &[("pledge", 2, 5), ("calls", 9, 5)]).with_sub_leaders(vec![
            leader("sam", "sam", &[("pledge", 7, 5)]),
            leader("lee", "Lee", &[("pledge", 1, 5)]),
            leader("ana", "Ana", &[("pledge", 7, 5)]),
        ]),
        leader("dev", "Dev", &[("pledge", 5, 5), ("calls", 5, 5)]),
        leader("zoe", "Zoe", &[]).with_sub_leaders(vec![leader("kim", "Kim", &[])]),
    ]
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_total_sort_orders_each_level() {
    let sorted = sort_forest(&sample_forest(), &SortKey::Total, SortDirection::Desc);
    assert_eq!(ids(&sorted), vec!["maria", "dev", "zoe"]);
    // equal totals keep their original relative order
    assert_eq!(ids(&sorted[0].sub_leaders), vec!["sam", "ana", "lee"]);
}

#[test]
fn test_status_sort_puts_met_leaders_first() {
    let sorted = sort_forest(&sample_forest(), &SortKey::Status, SortDirection::Desc);
    // dev met every action; maria met one of two; zoe has no actions
    assert_eq!(ids(&sorted), vec!["dev", "maria", "zoe"]);
}

#[test]
fn test_action_count_sort() {
    let key: SortKey = "pledge".parse().unwrap();
    let sorted = sort_forest(&sample_forest(), &key, SortDirection::Asc);
    assert_eq!(ids(&sorted), vec!["zoe", "maria", "dev"]);
    assert_eq!(ids(&sorted[0].sub_leaders), vec!["kim"]);
    assert_eq!(ids(&sorted[1].sub_leaders), vec!["lee", "sam", "ana"]);
}

#[test]
fn test_name_sort_ignores_case() {
    let state = SortState::new(SortKey::Name).toggle(SortKey::Name);
    assert_eq!(state.direction, SortDirection::Asc);

    let sorted = state.apply(&sample_forest());
    assert_eq!(ids(&sorted), vec!["dev", "maria", "zoe"]);
    assert_eq!(ids(&sorted[1].sub_leaders), vec!["ana", "lee", "sam"]);
}

#[test]
fn test_resorting_is_idempotent() {
    for key in ["name", "leaders", "status", "total", "pledge", "count::pledge::named"] {
        let key: SortKey = key.parse().unwrap();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let once = sort_forest(&sample_forest(), &key, direction);
            let twice = sort_forest(&once, &key, direction);
            assert_eq!(once, twice, "{} {:?} not stable", key, direction);
        }
    }
}

#[test]
fn test_sort_does_not_touch_input() {
    let forest = sample_forest();
    let _ = sort_forest(&forest, &SortKey::Name, SortDirection::Asc);
    assert_eq!(forest, sample_forest());
}

// ============================================================================
// Direction & Filtering
// ============================================================================

#[test]
fn test_toggle_sequence() {
    let state = SortState::default();
    assert_eq!(state.key, SortKey::Total);
    assert_eq!(state.direction, SortDirection::Desc);

    let state = state.toggle(SortKey::Total);
    assert_eq!(state.direction, SortDirection::Asc);

    let state = state.toggle(SortKey::Status);
    assert_eq!(state.key, SortKey::Status);
    assert_eq!(state.direction, SortDirection::Desc);
}

#[test]
fn test_leaders_of_leaders_then_sort() {
    let filtered = leaders_of_leaders(&sample_forest());
    assert_eq!(ids(&filtered), vec!["maria", "zoe"]);

    let sorted = sort_forest(&filtered, &SortKey::LeaderCount, SortDirection::Desc);
    assert_eq!(ids(&sorted), vec!["maria", "zoe"]);
    assert_eq!(sorted[0].sub_leaders.len(), 3);
}

#[test]
fn test_unknown_direction_rejected() {
    assert!("sideways".parse::<SortDirection>().is_err());
    assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
}
