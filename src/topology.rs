//! Constrained-Prim topology generator (§4.3).
//!
//! Builds a rooted spanning tree over the input nodes, choosing each
//! non-root node's parent and backhaul band as whichever currently-legal
//! `(parent, band)` pair maximises [`weight::weight`]. Degree, hop, and
//! RSSI constraints are enforced as part of weight evaluation itself, so
//! an illegal attachment simply never becomes a candidate.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{PlannerError, PlannerResult};
use crate::model::{Band, CapabilityTable, InputModel, NodeId};
use crate::weight::{self, TreeState};

/// A node as committed into the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub parent: Option<NodeId>,
    pub backhaul_band: Option<Band>,
    pub level: u32,
    pub children: BTreeSet<NodeId>,
    pub subtree_load: f64,
}

impl TreeNode {
    pub fn degree(&self) -> usize {
        self.children.len()
    }
}

/// The committed rooted tree.
#[derive(Debug, Clone)]
pub struct Topology {
    pub root: NodeId,
    pub nodes: BTreeMap<NodeId, TreeNode>,
}

impl Topology {
    pub fn get(&self, id: &NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }
}

/// Root selection (§4.3): highest offered load, ties broken by
/// lexicographically smallest ID. `input.nodes` is a `BTreeMap` so
/// iterating it in ascending-ID order and only replacing the running
/// best on a *strictly* greater load gives the documented tie-break for
/// free.
fn select_root(input: &InputModel) -> PlannerResult<NodeId> {
    let mut best: Option<(&NodeId, f64)> = None;
    for (id, node) in &input.nodes {
        match best {
            None => best = Some((id, node.load)),
            Some((_, best_load)) if node.load > best_load => best = Some((id, node.load)),
            _ => {}
        }
    }
    best.map(|(id, _)| id.clone())
        .ok_or_else(|| PlannerError::invalid_input("nodes", "{}", "at least one node is required"))
}

struct Candidate {
    parent: NodeId,
    band: Band,
    weight: f64,
    level: u32,
}

/// Best legal attachment for `candidate` onto the current tree, or `None`
/// if no in-tree neighbor offers a legal `(parent, band)` pair right now.
fn best_attachment(
    candidate: &NodeId,
    input: &InputModel,
    caps: &BTreeMap<NodeId, CapabilityTable>,
    tree: &Topology,
    cfg: &Config,
) -> Option<Candidate> {
    let candidate_node = &input.nodes[candidate];
    let candidate_caps = &caps[candidate];

    let level_of = |id: &NodeId| tree.nodes[id].level;
    let subtree_load_of = |id: &NodeId| tree.nodes[id].subtree_load;
    let degree_of = |id: &NodeId| tree.nodes[id].degree();
    let tree_state = TreeState { level: &level_of, subtree_load: &subtree_load_of, degree: &degree_of };

    let mut best: Option<Candidate> = None;
    for edge in input.edges_of(candidate) {
        let Some(parent_id) = edge.other(candidate) else { continue };
        let Some(parent_node) = tree.nodes.get(parent_id) else { continue };
        let parent_caps = &caps[parent_id];
        for band in Band::ALL {
            let Some(w) = weight::weight(
                parent_id,
                parent_caps,
                candidate,
                candidate_caps,
                candidate_node.load,
                edge,
                band,
                &tree_state,
                cfg,
            ) else {
                continue;
            };
            let level = parent_node.level + 1;
            let better = match &best {
                None => true,
                Some(b) => w > b.weight,
            };
            if better {
                best = Some(Candidate { parent: parent_id.clone(), band, weight: w, level });
            }
        }
    }
    best
}

/// Add `child`'s load to `subtree_load` of every ancestor from `parent` up
/// to the root (§4.3 step 3).
fn propagate_load(tree: &mut Topology, parent: &NodeId, load: f64) {
    let mut cursor = Some(parent.clone());
    while let Some(id) = cursor {
        let node = tree.nodes.get_mut(&id).expect("ancestor must already be in tree");
        node.subtree_load += load;
        cursor = node.parent.clone();
    }
}

/// Build the rooted tree (§4.3). Fails with [`PlannerError::TopologyUnreachable`]
/// the moment no out-of-tree node has any legal attachment left, per the
/// spec's fail-fast semantics (no partial plan is ever returned to the caller).
pub fn build(input: &InputModel, cfg: &Config) -> PlannerResult<Topology> {
    let root = select_root(input)?;
    debug!(root = %root, "selected root by highest offered load");

    let caps: BTreeMap<NodeId, CapabilityTable> =
        input.nodes.iter().map(|(id, n)| (id.clone(), n.merged_capabilities())).collect();

    let mut tree = Topology { root: root.clone(), nodes: BTreeMap::new() };
    tree.nodes.insert(
        root.clone(),
        TreeNode {
            parent: None,
            backhaul_band: None,
            level: 0,
            children: BTreeSet::new(),
            subtree_load: input.nodes[&root].load,
        },
    );

    let mut out_of_tree: BTreeSet<NodeId> = input.nodes.keys().filter(|id| **id != root).cloned().collect();

    while !out_of_tree.is_empty() {
        // Recomputed fresh every iteration rather than incrementally relaxed:
        // this is the frontier of §4.3, but recomputing it from the current
        // tree state each time means a parent hitting MAX_DEGREE automatically
        // invalidates every candidate that used it, with no separate
        // bookkeeping needed to detect and repair stale entries.
        let mut frontier: Vec<(NodeId, Candidate)> = Vec::new();
        for v in &out_of_tree {
            if let Some(c) = best_attachment(v, input, &caps, &tree, cfg) {
                frontier.push((v.clone(), c));
            }
        }

        if frontier.is_empty() {
            let unreachable: Vec<NodeId> = out_of_tree.into_iter().collect();
            let last_tree_state =
                tree.nodes.iter().map(|(id, n)| (id.clone(), (n.parent.clone(), n.level))).collect();
            warn!(count = unreachable.len(), "topology generator stalled with out-of-tree nodes remaining");
            return Err(PlannerError::TopologyUnreachable { unreachable, last_tree_state });
        }

        // Tie-break: max weight, then lower resulting level, then lexicographic
        // node ID. `frontier` was built by iterating `out_of_tree` (a
        // `BTreeSet`, ascending), so keeping the first-seen entry on a tie
        // gives the ID tie-break for free.
        let mut best_idx = 0;
        for i in 1..frontier.len() {
            let (_, c) = &frontier[i];
            let (_, b) = &frontier[best_idx];
            let better = c.weight > b.weight || (c.weight == b.weight && c.level < b.level);
            if better {
                best_idx = i;
            }
        }
        let (node, candidate) = frontier.swap_remove(best_idx);

        tree.nodes.insert(
            node.clone(),
            TreeNode {
                parent: Some(candidate.parent.clone()),
                backhaul_band: Some(candidate.band),
                level: candidate.level,
                children: BTreeSet::new(),
                subtree_load: input.nodes[&node].load,
            },
        );
        tree.nodes.get_mut(&candidate.parent).expect("parent already in tree").children.insert(node.clone());
        propagate_load(&mut tree, &candidate.parent, input.nodes[&node].load);
        out_of_tree.remove(&node);

        debug!(
            node = %node,
            parent = %candidate.parent,
            band = %candidate.band,
            level = candidate.level,
            weight = candidate.weight,
            "committed attachment"
        );
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChannelEntry, Edge, GpsCoord, Node};
    use std::collections::BTreeMap;

    fn caps(band: Band) -> CapabilityTable {
        let mut m: CapabilityTable = BTreeMap::new();
        m.entry(band).or_default().insert(
            crate::model::Bandwidth::Mhz20,
            vec![ChannelEntry { centre: 6115, max_eirp_dbm: 21 }],
        );
        m
    }

    fn node(id: &str, load: f64, band: Band) -> Node {
        Node {
            id: NodeId::new(id),
            gps: GpsCoord { lat: 0.0, lon: 0.0 },
            load,
            channels: caps(band),
            max_eirp: caps(band),
        }
    }

    fn edge(a: &str, b: &str, band: Band, rssi_ab: i32, rssi_ba: i32) -> Edge {
        let mut rssi = BTreeMap::new();
        rssi.insert(band, [rssi_ab, rssi_ba]);
        Edge { a: NodeId::new(a), b: NodeId::new(b), rssi }
    }

    #[test]
    fn single_node_is_its_own_root() {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::new("A"), node("A", 100.0, Band::High));
        let input = InputModel { nodes, edges: vec![] };
        let tree = build(&input, &Config::default()).unwrap();
        assert_eq!(tree.root, NodeId::new("A"));
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[&NodeId::new("A")].parent.is_none());
    }

    #[test]
    fn two_node_chain_picks_higher_load_as_root() {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::new("A"), node("A", 100.0, Band::Low));
        nodes.insert(NodeId::new("B"), node("B", 50.0, Band::Low));
        let edges = vec![edge("A", "B", Band::Low, -55, -57)];
        let input = InputModel { nodes, edges };
        let tree = build(&input, &Config::default()).unwrap();
        assert_eq!(tree.root, NodeId::new("A"));
        let b = &tree.nodes[&NodeId::new("B")];
        assert_eq!(b.parent, Some(NodeId::new("A")));
        assert_eq!(b.level, 1);
        assert_eq!(b.backhaul_band, Some(Band::Low));
    }

    #[test]
    fn unreachable_edge_fails_with_topology_unreachable() {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::new("A"), node("A", 100.0, Band::High));
        nodes.insert(NodeId::new("B"), node("B", 50.0, Band::High));
        let edges = vec![edge("A", "B", Band::High, -90, -90)];
        let input = InputModel { nodes, edges };
        let err = build(&input, &Config::default()).unwrap_err();
        match err {
            PlannerError::TopologyUnreachable { unreachable, .. } => {
                assert_eq!(unreachable, vec![NodeId::new("B")]);
            }
            other => panic!("expected TopologyUnreachable, got {other:?}"),
        }
    }

    #[test]
    fn degree_cap_forces_fourth_child_onto_a_sibling() {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::new("R"), node("R", 100.0, Band::High));
        for id in ["A", "B", "C", "D"] {
            nodes.insert(NodeId::new(id), node(id, 10.0, Band::High));
        }
        let mut edges = vec![];
        for id in ["A", "B", "C", "D"] {
            edges.push(edge("R", id, Band::High, -50, -50));
        }
        // Also connect D to A so it has a fallback parent once R is full.
        edges.push(edge("A", "D", Band::High, -50, -50));
        let cfg = Config { max_degree: 3, ..Config::default() };
        let input = InputModel { nodes, edges };
        let tree = build(&input, &cfg).unwrap();
        assert_eq!(tree.nodes[&NodeId::new("R")].degree(), 3);
        let d = &tree.nodes[&NodeId::new("D")];
        assert_ne!(d.parent, Some(NodeId::new("R")));
        assert_eq!(d.level, 2);
    }

    #[test]
    fn subtree_load_propagates_to_every_ancestor() {
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::new("R"), node("R", 100.0, Band::High));
        nodes.insert(NodeId::new("A"), node("A", 10.0, Band::High));
        nodes.insert(NodeId::new("B"), node("B", 5.0, Band::High));
        let edges = vec![
            edge("R", "A", Band::High, -50, -50),
            edge("A", "B", Band::High, -50, -50),
        ];
        let input = InputModel { nodes, edges };
        let tree = build(&input, &Config::default()).unwrap();
        assert_eq!(tree.nodes[&NodeId::new("R")].subtree_load, 115.0);
        assert_eq!(tree.nodes[&NodeId::new("A")].subtree_load, 15.0);
    }
}
