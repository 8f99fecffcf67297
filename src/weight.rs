//! Pure scoring of a (parent, child, band) attachment candidate (§4.2).
//!
//! `weight()` never mutates anything it's given; the generator calls it
//! afresh for every candidate it considers and trusts nothing cached.

use crate::config::Config;
use crate::model::{Band, Bandwidth, CapabilityTable, Edge, NodeId};

/// Noise floor used by the throughput term's Shannon-like mapping. Not
/// observable externally (spec §4.2: "the exact curve is not observable,
/// only its monotonicity") — a typical wideband thermal noise floor keeps
/// the term well-behaved across the RSSI range the spec expects (-40 to
/// -90 dBm).
const NOISE_FLOOR_DBM: f64 = -95.0;

/// State the weight function reads from the tree being grown. Kept
/// separate from `crate::topology::Topology` so this module has no
/// dependency on the generator's internal representation.
pub struct TreeState<'a> {
    pub level: &'a dyn Fn(&NodeId) -> u32,
    pub subtree_load: &'a dyn Fn(&NodeId) -> f64,
    pub degree: &'a dyn Fn(&NodeId) -> usize,
}

/// Widest bandwidth shared by `parent` and `child` in `band`, or `None` if
/// they share none.
fn widest_shared_bandwidth(
    parent_caps: &CapabilityTable,
    child_caps: &CapabilityTable,
    band: Band,
) -> Option<Bandwidth> {
    let p = parent_caps.get(&band)?;
    let c = child_caps.get(&band)?;
    Bandwidth::WIDEST_FIRST
        .into_iter()
        .find(|bw| p.get(bw).is_some_and(|v| !v.is_empty()) && c.get(bw).is_some_and(|v| !v.is_empty()))
}

/// Monotonic increasing Shannon-like capacity term from the minimum
/// directional RSSI and the widest shared bandwidth. Only the
/// monotonicity in `rssi` and `bandwidth` is part of the contract.
fn throughput_term(min_rssi: i32, bandwidth: Bandwidth) -> f64 {
    let snr_db = (min_rssi as f64) - NOISE_FLOOR_DBM;
    let snr_linear = 10f64.powf(snr_db / 10.0);
    let bandwidth_mhz = bandwidth.mhz() as f64;
    bandwidth_mhz * (1.0 + snr_linear).log2()
}

/// Evaluate `weight(parent, child, band, treeState, cfg)` (§4.2). Returns
/// `None` when the candidate must be rejected outright (RSSI below
/// threshold, no shared bandwidth, or a degree/hop violation — the
/// spec's `-inf`); otherwise returns the combined score.
#[allow(clippy::too_many_arguments)]
pub fn weight(
    parent: &NodeId,
    parent_caps: &CapabilityTable,
    child: &NodeId,
    child_caps: &CapabilityTable,
    child_load: f64,
    edge: &Edge,
    band: Band,
    tree: &TreeState<'_>,
    cfg: &Config,
) -> Option<f64> {
    if (tree.degree)(parent) >= cfg.max_degree {
        return None;
    }
    let child_level = (tree.level)(parent) + 1;
    if child_level > cfg.max_hop {
        return None;
    }

    let min_rssi = edge.min_rssi(band)?;
    if min_rssi < cfg.rssi_threshold {
        return None;
    }

    let bandwidth = widest_shared_bandwidth(parent_caps, child_caps, band)?;

    let throughput = throughput_term(min_rssi, bandwidth);
    let load_penalty = (tree.subtree_load)(parent) + child_load;
    let hop_penalty = child_level as f64;

    debug_assert!(parent != child, "self-attachment is never evaluated by the generator");

    Some(cfg.throughput_weight * throughput - cfg.load_weight * load_penalty + cfg.hop_weight * hop_penalty)
}
