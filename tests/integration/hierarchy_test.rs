//! Hierarchy Integration Tests
//!
//! Builds forests from explicit edges, team rosters, and alias tables together
//! and checks the structural guarantees: bounded depth, no repeated leaders,
//! merged provenance, and stable output.

use std::collections::HashSet;

use campaign_core::{AliasMapping, Contact, HierarchyEdge, TeamRoster};
use campaign_hierarchy::{
    build_forest, collect_ids, find_node, forest_depth, BuildOptions, IdentityResolver, LeaderNode,
    MAX_DEPTH,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn top(org: &str, leader: &str) -> HierarchyEdge {
    HierarchyEdge::new(org, leader)
}

fn under(org: &str, leader: &str, parent: &str) -> HierarchyEdge {
    HierarchyEdge::new(org, leader).with_parent(parent)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Assert no node appears among its own ancestors
fn assert_acyclic(nodes: &[LeaderNode], ancestors: &mut Vec<String>) {
    for node in nodes {
        assert!(
            !ancestors.contains(&node.id),
            "{} is its own ancestor via {:?}",
            node.id,
            ancestors
        );
        ancestors.push(node.id.clone());
        assert_acyclic(&node.sub_leaders, ancestors);
        ancestors.pop();
    }
}

fn chapter_contacts() -> Vec<Contact> {
    vec![
        Contact::new("100", "Maria", "Lopez"),
        Contact::new("200", "Dev", "Patel").with_member_status("member"),
        Contact::new("300", "Sam", "Okafor"),
        Contact::new("400", "Lee", "Chen"),
        Contact::new("500", "Ana", "Silva"),
    ]
}

// ============================================================================
// Mixed Sources
// ============================================================================

#[test]
fn test_mixed_sources_build_expected_forest() {
    let contacts = chapter_contacts();
    let aliases = vec![AliasMapping::new("200")
        .with_alternates(&["200-dup"])
        .with_preferred_name("Devi Patel")];
    let edges = vec![
        top("org", "100"),
        top("org", "200-dup"),
        under("org", "300", "100"),
    ];
    let rosters = vec![
        TeamRoster::new(
            "Maria Lopez",
            names(&["Sam Okafor", "Lee Chen", "Somebody New"]),
        )
        .with_chapter("North"),
        TeamRoster::new("Devi Patel", names(&["Ana Silva"])).with_chapter("North"),
    ];
    let resolver = IdentityResolver::new(&aliases, &contacts);
    let forest = build_forest("org", &edges, &rosters, &resolver, Some("north"), BuildOptions::default());

    assert_eq!(collect_ids(&forest), vec!["100", "300", "400", "200", "500"]);

    let maria = find_node(&forest, "100").unwrap();
    assert_eq!(maria.name, "Maria Lopez");
    assert!(!maria.is_automatic);
    // explicit child first, then the team-only child, then the unmatched node
    assert_eq!(maria.sub_leaders.len(), 3);
    assert!(maria.sub_leaders[0].is_automatic);
    assert!(maria.sub_leaders[2].is_synthetic());

    let dev = find_node(&forest, "200").unwrap();
    assert_eq!(dev.name, "Devi Patel");
    assert_eq!(dev.member_status.as_deref(), Some("member"));
    assert_eq!(dev.sub_leaders[0].id, "500");
}

#[test]
fn test_leader_reachable_twice_is_placed_once() {
    let edges = vec![
        top("org", "a"),
        top("org", "c"),
        under("org", "b", "a"),
        under("org", "b", "c"),
        under("org", "d", "b"),
    ];
    let resolver = IdentityResolver::new(&[], &[]);
    let forest = build_forest("org", &edges, &[], &resolver, None, BuildOptions::default());

    let ids = collect_ids(&forest);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(find_node(&forest, "a").unwrap().sub_leaders.len(), 1);
    assert!(find_node(&forest, "c").unwrap().sub_leaders.is_empty());
    assert!(find_node(&forest, "d").is_some());
}

// ============================================================================
// Structural Guarantees
// ============================================================================

#[test]
fn test_long_cycle_terminates() {
    let edges = vec![
        top("org", "a"),
        under("org", "b", "a"),
        under("org", "c", "b"),
        under("org", "a", "c"),
        under("org", "c", "c"),
    ];
    let resolver = IdentityResolver::new(&[], &[]);
    let forest = build_forest("org", &edges, &[], &resolver, None, BuildOptions::default());

    assert_acyclic(&forest, &mut Vec::new());
    assert_eq!(collect_ids(&forest), vec!["a", "b", "c"]);
}

#[test]
fn test_team_cycle_through_rosters_terminates() {
    let contacts = vec![Contact::new("a", "Ann", "Alpha"), Contact::new("b", "Ben", "Beta")];
    let edges = vec![top("org", "a")];
    let rosters = vec![
        TeamRoster::new("Ann Alpha", names(&["Ben Beta"])),
        TeamRoster::new("Ben Beta", names(&["Ann Alpha"])),
    ];
    let resolver = IdentityResolver::new(&[], &contacts);
    let forest = build_forest("org", &edges, &rosters, &resolver, None, BuildOptions::default());

    assert_acyclic(&forest, &mut Vec::new());
    assert_eq!(collect_ids(&forest), vec!["a", "b"]);
}

#[test]
fn test_depth_never_exceeds_ceiling() {
    let mut edges = vec![top("org", "n0")];
    for i in 1..12 {
        edges.push(under("org", &format!("n{}", i), &format!("n{}", i - 1)));
    }
    let resolver = IdentityResolver::new(&[], &[]);
    let forest = build_forest("org", &edges, &[], &resolver, None, BuildOptions::default());

    assert_eq!(forest_depth(&forest), MAX_DEPTH);
    assert_eq!(collect_ids(&forest), vec!["n0", "n1", "n2"]);
}

#[test]
fn test_duplicate_edges_and_team_membership_merge() {
    let contacts = vec![Contact::new("A", "Alex", "Ames"), Contact::new("B", "Blair", "Booth")];
    let edges = vec![top("org", "A"), under("org", "B", "A"), under("org", "B", "A")];
    let rosters = vec![TeamRoster::new("Alex Ames", names(&["Blair Booth"]))];
    let resolver = IdentityResolver::new(&[], &contacts);
    let forest = build_forest("org", &edges, &rosters, &resolver, None, BuildOptions::default());

    let a = &forest[0];
    assert_eq!(a.sub_leaders.len(), 1);
    assert_eq!(a.sub_leaders[0].id, "B");
    assert!(a.sub_leaders[0].is_automatic);
}

#[test]
fn test_build_is_deterministic() {
    let contacts = chapter_contacts();
    let edges = vec![top("org", "100"), under("org", "300", "100")];
    let rosters = vec![TeamRoster::new("Maria Lopez", names(&["Lee Chen", "Ana Silva", "Nobody"]))];
    let resolver = IdentityResolver::new(&[], &contacts);

    let first = build_forest("org", &edges, &rosters, &resolver, None, BuildOptions::default());
    let second = build_forest("org", &edges, &rosters, &resolver, None, BuildOptions::default());
    assert_eq!(first, second);
}

#[test]
fn test_unknown_root_yields_empty_forest() {
    let edges = vec![top("org", "a")];
    let resolver = IdentityResolver::new(&[], &[]);
    let forest = build_forest("someone-else", &edges, &[], &resolver, None, BuildOptions::default());
    assert!(forest.is_empty());
}
