//! Depth-ordered greedy channel assigner (§4.4).
//!
//! Walks the tree breadth-first from the root, assigning each node a
//! `(channel, bandwidth, maxEirp)` triple per band it must operate,
//! stepping down through narrower bandwidths when no wide candidate is
//! free of interference, and sharing the backhaul channel between a
//! parent and its child rather than selecting it twice.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{PlannerError, PlannerResult};
use crate::model::{Band, Bandwidth, CapabilityTable, InputModel, NodeId};
use crate::topology::Topology;

/// One radio's assignment on a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioAssignment {
    pub band: Band,
    pub channel: u32,
    pub bandwidth: Bandwidth,
    pub max_eirp_dbm: i32,
}

/// All radio assignments, per node.
pub type Assignment = BTreeMap<NodeId, Vec<RadioAssignment>>;

/// Two channels overlap when their `[centre ± width/2]` intervals intersect.
fn overlaps(a_centre: u32, a_bw: Bandwidth, b_centre: u32, b_bw: Bandwidth) -> bool {
    let half_sum = (a_bw.mhz() + b_bw.mhz()) as f64 / 2.0;
    ((a_centre as f64) - (b_centre as f64)).abs() < half_sum
}

/// The bands a node must operate, in the fixed order they are assigned.
fn bands_for(node: &NodeId, tree: &Topology) -> Vec<Band> {
    let t = &tree.nodes[node];
    if t.parent.is_none() {
        // Root: both bands, two downstream-serving radios.
        vec![Band::High, Band::Low]
    } else if t.children.is_empty() {
        // Leaf: only its uplink.
        vec![t.backhaul_band.expect("non-root node always has a backhaul band")]
    } else {
        // Internal non-root: uplink band plus the other for its own children.
        vec![Band::High, Band::Low]
    }
}

/// Already-assigned radio, tracked for the interference check.
struct Placed {
    node: NodeId,
    band: Band,
    centre: u32,
    bandwidth: Bandwidth,
}

/// RSSI between two arbitrary (not necessarily tree-adjacent) nodes in a
/// band, if a candidate edge between them was supplied. Pairs with no
/// measured edge are treated as having no measurable interference.
fn rssi_between(input: &InputModel, band: Band, a: &NodeId, b: &NodeId) -> Option<i32> {
    input.edges.iter().find(|e| e.connects(a, b)).and_then(|e| e.min_rssi(band))
}

fn is_conflict(input: &InputModel, node: &NodeId, other: &NodeId, band: Band, cfg: &Config) -> bool {
    match rssi_between(input, band, node, other) {
        // Far enough apart (worse than the floor) to reuse the spectrum.
        Some(r) if r < cfg.rssi_conflict_threshold => false,
        // No measured link at all: treated as no interference.
        None => false,
        // Anything else: close enough that reuse is unsafe.
        _ => true,
    }
}

fn conflicts_for_candidate(
    input: &InputModel,
    placed: &[Placed],
    node: &NodeId,
    band: Band,
    centre: u32,
    bandwidth: Bandwidth,
    cfg: &Config,
) -> Vec<NodeId> {
    placed
        .iter()
        .filter(|p| p.band == band && p.node != *node && overlaps(p.centre, p.bandwidth, centre, bandwidth))
        .filter(|p| is_conflict(input, node, &p.node, band, cfg))
        .map(|p| p.node.clone())
        .collect()
}

/// Run the accept-loop for one (node, band): descending bandwidth, then
/// the table's listed channel order, first conflict-free candidate wins.
fn select_independently(
    input: &InputModel,
    placed: &[Placed],
    node: &NodeId,
    band: Band,
    caps: &CapabilityTable,
    cfg: &Config,
) -> PlannerResult<RadioAssignment> {
    let mut attempted = Vec::new();
    let mut conflicting = Vec::new();
    if let Some(by_bw) = caps.get(&band) {
        for bandwidth in Bandwidth::WIDEST_FIRST {
            let Some(entries) = by_bw.get(&bandwidth) else { continue };
            for entry in entries {
                attempted.push((bandwidth, entry.centre));
                let conflicts = conflicts_for_candidate(input, placed, node, band, entry.centre, bandwidth, cfg);
                if conflicts.is_empty() {
                    return Ok(RadioAssignment {
                        band,
                        channel: entry.centre,
                        bandwidth,
                        max_eirp_dbm: entry.max_eirp_dbm,
                    });
                }
                conflicting.extend(conflicts);
            }
        }
    }
    conflicting.sort();
    conflicting.dedup();
    Err(PlannerError::ChannelAssignment { node: node.clone(), band, attempted, conflicting })
}

/// Inherit the parent's triple on the shared backhaul band, looked up
/// against this node's own capability table so P5 (every triple comes
/// from the node's own table) still holds.
fn inherit_from_parent(
    parent: &NodeId,
    parent_assignment: &RadioAssignment,
    node: &NodeId,
    caps: &CapabilityTable,
) -> PlannerResult<RadioAssignment> {
    let band = parent_assignment.band;
    let own_entry = caps
        .get(&band)
        .and_then(|by_bw| by_bw.get(&parent_assignment.bandwidth))
        .and_then(|entries| entries.iter().find(|e| e.centre == parent_assignment.channel));

    match own_entry {
        Some(entry) => Ok(RadioAssignment {
            band,
            channel: entry.centre,
            bandwidth: parent_assignment.bandwidth,
            max_eirp_dbm: entry.max_eirp_dbm,
        }),
        None => Err(PlannerError::ChannelAssignment {
            node: node.clone(),
            band,
            attempted: vec![(parent_assignment.bandwidth, parent_assignment.channel)],
            conflicting: vec![parent.clone()],
        }),
    }
}

/// Assign channels to every node in the tree (§4.4).
pub fn assign(input: &InputModel, tree: &Topology, cfg: &Config) -> PlannerResult<Assignment> {
    let caps: BTreeMap<NodeId, CapabilityTable> =
        input.nodes.iter().map(|(id, n)| (id.clone(), n.merged_capabilities())).collect();

    // Breadth-first order: ascending level, then ascending node ID within
    // a level. `tree.nodes` is already ID-ascending, so a stable sort on
    // level alone yields exactly that order.
    let mut order: Vec<NodeId> = tree.nodes.keys().cloned().collect();
    order.sort_by_key(|id| tree.nodes[id].level);

    let mut placed: Vec<Placed> = Vec::new();
    let mut result: Assignment = BTreeMap::new();

    for node in &order {
        let node_caps = &caps[node];
        let mut radios = Vec::new();
        for band in bands_for(node, tree) {
            let t = &tree.nodes[node];
            let is_backhaul = t.backhaul_band == Some(band);
            let assignment = if is_backhaul {
                let parent = t.parent.clone().expect("backhaul band implies a parent");
                let parent_radio = result[&parent]
                    .iter()
                    .find(|r| r.band == band)
                    .expect("parent already assigned its half of the shared backhaul band");
                inherit_from_parent(&parent, parent_radio, node, node_caps)
            } else {
                select_independently(input, &placed, node, band, node_caps, cfg)
            };
            let assignment = match assignment {
                Ok(a) => a,
                Err(e) => {
                    warn!(node = %node, %band, "channel assignment exhausted candidates");
                    return Err(e);
                }
            };
            debug!(node = %node, %band, channel = assignment.channel, bandwidth = %assignment.bandwidth, "assigned channel");
            placed.push(Placed {
                node: node.clone(),
                band: assignment.band,
                centre: assignment.channel,
                bandwidth: assignment.bandwidth,
            });
            radios.push(assignment);
        }
        result.insert(node.clone(), radios);
    }

    Ok(result)
}
