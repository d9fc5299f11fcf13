//! Hierarchy Builder
//!
//! Reconstructs the leader forest under one organizer from two independent
//! edge sources:
//! 1. Explicit "reports-to" edges (`ExplicitEdges`)
//! 2. Implicit team-lead -> team-member edges read from rosters (`TeamEdges`)
//!
//! Both sources sit behind `EdgeSource` and are merged during traversal, so the
//! provenance of each discovered link stays attached. A build-wide visited set
//! and a hard depth ceiling keep cyclic or runaway input bounded.

use std::collections::{BTreeMap, HashMap, HashSet};

use campaign_core::{HierarchyEdge, TeamRoster};
use tracing::debug;

use crate::identity::IdentityResolver;
use crate::models::{LeaderNode, NodeMetadata};

/// Hard ceiling on tree depth. The root organizer is depth 0 and never appears
/// in the output; its direct reports are depth 1.
pub const MAX_DEPTH: usize = 3;

/// Where a child link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Explicit,
    Team,
}

/// One `(parent, child)` relationship reported by an edge source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    pub id: String,
    pub supplied_name: Option<String>,
    pub provenance: Provenance,
}

/// A provider of child links for a node.
pub trait EdgeSource {
    /// Children of `parent_id` at `depth`, in source order. `root_id` is the
    /// organizer the build started from.
    fn children_of(&self, parent_id: &str, root_id: &str, depth: usize) -> Vec<ChildLink>;

    /// Free-text names under `parent_id` that could not be resolved to an id.
    fn unmatched_under(&self, _parent_id: &str) -> Vec<String> {
        Vec::new()
    }
}

// ============================================================================
// Explicit Edges
// ============================================================================

/// Explicit hierarchy edges, indexed by parent and by top-level organizer.
#[derive(Debug, Default)]
pub struct ExplicitEdges {
    by_parent: HashMap<String, Vec<ChildLink>>,
    top_level: HashMap<String, Vec<ChildLink>>,
}

impl ExplicitEdges {
    /// Index edges, canonicalizing every id through the resolver.
    pub fn new(edges: &[HierarchyEdge], resolver: &IdentityResolver<'_>) -> Self {
        let mut index = Self::default();
        for edge in edges {
            let link = ChildLink {
                id: resolver.canonical_id(&edge.leader_vanid),
                supplied_name: edge.leader_name.clone(),
                provenance: Provenance::Explicit,
            };
            match &edge.parent_leader_vanid {
                Some(parent) => index
                    .by_parent
                    .entry(resolver.canonical_id(parent))
                    .or_default()
                    .push(link),
                None => index
                    .top_level
                    .entry(resolver.canonical_id(&edge.organizer_vanid))
                    .or_default()
                    .push(link),
            }
        }
        index
    }
}

impl EdgeSource for ExplicitEdges {
    fn children_of(&self, parent_id: &str, root_id: &str, depth: usize) -> Vec<ChildLink> {
        let mut links = Vec::new();
        if depth == 0 && parent_id == root_id {
            links.extend(self.top_level.get(root_id).into_iter().flatten().cloned());
        }
        links.extend(self.by_parent.get(parent_id).into_iter().flatten().cloned());
        links
    }
}

// ============================================================================
// Team Edges
// ============================================================================

/// Implicit edges from team rosters, resolved from free-text names to ids.
#[derive(Debug, Default)]
pub struct TeamEdges {
    members_by_lead: HashMap<String, Vec<ChildLink>>,
    unmatched_by_lead: HashMap<String, Vec<String>>,
}

impl TeamEdges {
    /// Resolve rosters. When `chapter` is set, rosters tagged with a different
    /// chapter are ignored.
    pub fn new(
        rosters: &[TeamRoster],
        resolver: &IdentityResolver<'_>,
        chapter: Option<&str>,
    ) -> Self {
        let mut index = Self::default();
        for roster in rosters {
            if let Some(chapter) = chapter {
                if !roster.in_chapter(chapter) {
                    continue;
                }
            }
            let Some(lead_id) = resolver.resolve_name(&roster.team_lead) else {
                debug!(team_lead = %roster.team_lead, "Team lead did not resolve to a known id");
                continue;
            };

            for member in &roster.team_members {
                match resolver.resolve_name(member) {
                    Some(member_id) if member_id == lead_id => {}
                    Some(member_id) => index
                        .members_by_lead
                        .entry(lead_id.clone())
                        .or_default()
                        .push(ChildLink {
                            id: member_id,
                            supplied_name: Some(member.trim().to_string()),
                            provenance: Provenance::Team,
                        }),
                    None => {
                        debug!(team_lead = %lead_id, member = %member, "Team member did not resolve");
                        let names = index.unmatched_by_lead.entry(lead_id.clone()).or_default();
                        let name = member.trim().to_string();
                        if !name.is_empty() && !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
            }
        }
        index
    }

    /// Whether `id` leads at least one roster
    pub fn is_team_lead(&self, id: &str) -> bool {
        self.members_by_lead.contains_key(id) || self.unmatched_by_lead.contains_key(id)
    }
}

impl EdgeSource for TeamEdges {
    fn children_of(&self, parent_id: &str, _root_id: &str, _depth: usize) -> Vec<ChildLink> {
        self.members_by_lead
            .get(parent_id)
            .cloned()
            .unwrap_or_default()
    }

    fn unmatched_under(&self, parent_id: &str) -> Vec<String> {
        self.unmatched_by_lead
            .get(parent_id)
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Options for one build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Requested depth limit; clamped to `MAX_DEPTH`
    pub max_depth: usize,
    /// Attach a synthetic node for unresolved roster names
    pub include_unmatched_members: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            include_unmatched_members: true,
        }
    }
}

/// Links for one child, merged across sources within a single parent.
#[derive(Debug)]
struct MergedChild {
    id: String,
    explicit_name: Option<String>,
    team_name: Option<String>,
    via_team: bool,
}

impl MergedChild {
    fn from_link(link: ChildLink) -> Self {
        let mut child = Self {
            id: link.id.clone(),
            explicit_name: None,
            team_name: None,
            via_team: false,
        };
        child.absorb(link);
        child
    }

    fn absorb(&mut self, link: ChildLink) {
        match link.provenance {
            Provenance::Explicit => {
                if self.explicit_name.is_none() {
                    self.explicit_name = link.supplied_name;
                }
            }
            Provenance::Team => {
                self.via_team = true;
                if self.team_name.is_none() {
                    self.team_name = link.supplied_name;
                }
            }
        }
    }

    /// Explicit names win over roster text
    fn supplied_name(&self) -> Option<&str> {
        self.explicit_name.as_deref().or(self.team_name.as_deref())
    }
}

/// Builds the leader forest for one organizer.
pub struct HierarchyBuilder<'a> {
    resolver: &'a IdentityResolver<'a>,
    sources: Vec<&'a dyn EdgeSource>,
    options: BuildOptions,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(resolver: &'a IdentityResolver<'a>) -> Self {
        Self {
            resolver,
            sources: Vec::new(),
            options: BuildOptions::default(),
        }
    }

    /// Add an edge source. Earlier sources take naming precedence.
    pub fn with_source(mut self, source: &'a dyn EdgeSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    fn depth_limit(&self) -> usize {
        self.options.max_depth.min(MAX_DEPTH)
    }

    /// Build the forest of leaders under `root_organizer_id`.
    pub fn build(&self, root_organizer_id: &str) -> Vec<LeaderNode> {
        let root = self.resolver.canonical_id(root_organizer_id);
        let mut visited = HashSet::new();
        visited.insert(root.clone());
        self.expand(&root, &root, 0, &mut visited)
    }

    fn expand(
        &self,
        parent_id: &str,
        root_id: &str,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Vec<LeaderNode> {
        let child_depth = depth + 1;
        if child_depth > self.depth_limit() {
            return Vec::new();
        }

        let mut merged: Vec<MergedChild> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for source in &self.sources {
            for link in source.children_of(parent_id, root_id, depth) {
                if link.id == parent_id {
                    continue;
                }
                match positions.get(&link.id) {
                    Some(&pos) => merged[pos].absorb(link),
                    None => {
                        positions.insert(link.id.clone(), merged.len());
                        merged.push(MergedChild::from_link(link));
                    }
                }
            }
        }

        // Claim every new child before descending so siblings' subtrees cannot
        // take them first.
        merged.retain(|child| {
            let fresh = visited.insert(child.id.clone());
            if !fresh {
                debug!(parent = %parent_id, child = %child.id, "Skipping already placed leader");
            }
            fresh
        });

        let mut nodes: Vec<LeaderNode> = merged
            .into_iter()
            .map(|child| {
                let sub_leaders = self.expand(&child.id, root_id, child_depth, visited);
                LeaderNode {
                    name: self.resolver.display_name(&child.id, child.supplied_name()),
                    member_status: self.resolver.member_status(&child.id),
                    is_automatic: child.via_team,
                    sub_leaders,
                    action_progress: BTreeMap::new(),
                    metadata: None,
                    id: child.id,
                }
            })
            .collect();

        if child_depth == self.depth_limit() {
            let truncated: usize = nodes
                .iter()
                .map(|n| {
                    self.sources
                        .iter()
                        .map(|s| s.children_of(&n.id, root_id, child_depth).len())
                        .sum::<usize>()
                })
                .sum();
            if truncated > 0 {
                debug!(parent = %parent_id, truncated, "Depth ceiling reached; deeper links ignored");
            }
        }

        if self.options.include_unmatched_members {
            if let Some(node) = self.unmatched_node(parent_id) {
                nodes.push(node);
            }
        }

        nodes
    }

    fn unmatched_node(&self, parent_id: &str) -> Option<LeaderNode> {
        let mut names: Vec<String> = Vec::new();
        for source in &self.sources {
            for name in source.unmatched_under(parent_id) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        if names.is_empty() {
            return None;
        }
        let mut node = LeaderNode::new(
            format!("unmatched:{}", parent_id),
            format!("Unmatched team members ({})", names.len()),
        );
        node.is_automatic = true;
        node.metadata = Some(NodeMetadata::UnmatchedMembers {
            team_lead: parent_id.to_string(),
            names,
        });
        Some(node)
    }
}

/// Convenience entry point: explicit edges first, then team rosters.
pub fn build_forest(
    root_organizer_id: &str,
    edges: &[HierarchyEdge],
    rosters: &[TeamRoster],
    resolver: &IdentityResolver<'_>,
    chapter: Option<&str>,
    options: BuildOptions,
) -> Vec<LeaderNode> {
    let explicit = ExplicitEdges::new(edges, resolver);
    let team = TeamEdges::new(rosters, resolver, chapter);
    HierarchyBuilder::new(resolver)
        .with_source(&explicit)
        .with_source(&team)
        .with_options(options)
        .build(root_organizer_id)
}
