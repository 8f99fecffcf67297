//! JSON wire format (§6).
//!
//! The wire shapes diverge from the in-memory model in three ways that
//! don't belong on the core types themselves: GPS is a `[lat, lon]` pair
//! rather than an object, edges are keyed by a composite `"<id1>_<id2>"`
//! string instead of carrying their endpoints inline, and the per-band RSSI
//! pair lives in two fixed fields (`rssi_6gh`, `rssi_6gl`) rather than a
//! `Band`-keyed map. This module owns that translation so `model.rs` stays
//! free to use the representation the algorithms actually want.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::channel::{Assignment, RadioAssignment};
use crate::config::Config;
use crate::error::PlannerError;
use crate::model::{Band, Bandwidth, ChannelEntry, Edge, GpsCoord, InputModel, Node, NodeId};
use crate::topology::Topology;

#[derive(Debug, Deserialize)]
pub struct WireInput {
    pub nodes: BTreeMap<String, WireNode>,
    #[serde(default)]
    pub edges: BTreeMap<String, WireEdge>,
    #[serde(default)]
    pub config: Option<Config>,
}

#[derive(Debug, Deserialize)]
pub struct WireNode {
    pub gps: [f64; 2],
    pub load: f64,
    pub channels: WireCapabilityTable,
    #[serde(rename = "maxEirp")]
    pub max_eirp: WireCapabilityTable,
}

/// `band -> bandwidth -> [value, ...]`, read straight off the wire: either
/// a list of channel centres (`channels`) or a parallel list of max EIRPs
/// (`maxEirp`), zipped back together in [`to_input_model`].
pub type WireCapabilityTable = BTreeMap<Band, BTreeMap<Bandwidth, Vec<i64>>>;

#[derive(Debug, Deserialize)]
pub struct WireEdge {
    #[serde(default)]
    pub rssi_6gh: Option<[i32; 2]>,
    #[serde(default)]
    pub rssi_6gl: Option<[i32; 2]>,
}

/// Split a composite edge key back into its two node IDs. IDs may
/// themselves contain `_`, so every underscore position is tried in turn
/// and the first split whose both halves name a known node wins — not
/// just the first or last underscore.
fn split_edge_key<'a>(key: &'a str, known: &BTreeMap<String, WireNode>) -> Option<(&'a str, &'a str)> {
    let positions = key.match_indices('_').map(|(i, _)| i);
    for i in positions {
        let (left, right) = (&key[..i], &key[i + 1..]);
        if known.contains_key(left) && known.contains_key(right) {
            return Some((left, right));
        }
    }
    None
}

/// Rebuild a single band's `CapabilityTable` from the parallel
/// centre/EIRP lists the wire carries. Only `channels` supplies `centre`
/// and only `maxEirp` supplies `max_eirp_dbm`; the other half of each
/// `ChannelEntry` built here is a placeholder that nothing reads —
/// [`Node::merged_capabilities`] is what zips the two tables into the
/// entries the planner actually uses.
fn to_half_table(wire: &WireCapabilityTable, pick_centre: bool) -> crate::model::CapabilityTable {
    let mut out = crate::model::CapabilityTable::new();
    for (band, by_bw) in wire {
        let out_by_bw = out.entry(*band).or_default();
        for (bw, values) in by_bw {
            let entries = values
                .iter()
                .map(|&v| {
                    let v = v as i32;
                    if pick_centre {
                        ChannelEntry { centre: v as u32, max_eirp_dbm: 0 }
                    } else {
                        ChannelEntry { centre: 0, max_eirp_dbm: v }
                    }
                })
                .collect();
            out_by_bw.insert(*bw, entries);
        }
    }
    out
}

/// Parse a wire input record into the validated-shape `InputModel` the
/// core operates on, plus whatever `Config` was supplied (already merged
/// with defaults by `Config`'s own `Deserialize`/`Default`).
///
/// This performs only *structural* translation (key splitting, array vs.
/// object shape); the semantic checks of §4.1 are the planner's job, not
/// this module's.
pub fn to_input_model(wire: &WireInput) -> Result<(InputModel, Config), PlannerError> {
    let mut nodes = BTreeMap::new();
    for (id, wn) in &wire.nodes {
        let gps = GpsCoord { lat: wn.gps[0], lon: wn.gps[1] };
        let channels = to_half_table(&wn.channels, true);
        let max_eirp = to_half_table(&wn.max_eirp, false);
        nodes.insert(NodeId::new(id.as_str()), Node { id: NodeId::new(id.as_str()), gps, load: wn.load, channels, max_eirp });
    }

    let mut edges = Vec::new();
    for (key, we) in &wire.edges {
        let (a, b) = split_edge_key(key, &wire.nodes).ok_or_else(|| {
            PlannerError::invalid_input("edges", key.clone(), "edge key must be `<id1>_<id2>` naming two known nodes")
        })?;
        let mut rssi = BTreeMap::new();
        if let Some(pair) = we.rssi_6gh {
            rssi.insert(Band::High, pair);
        }
        if let Some(pair) = we.rssi_6gl {
            rssi.insert(Band::Low, pair);
        }
        edges.push(Edge { a: NodeId::new(a), b: NodeId::new(b), rssi });
    }

    let config = wire.config.unwrap_or_default();
    Ok((InputModel { nodes, edges }, config))
}

/// One node's entry in the §6 output record.
#[derive(Debug, Clone, Serialize)]
pub struct WireNodePlan {
    pub parent: Option<NodeId>,
    #[serde(rename = "backhaulBand")]
    pub backhaul_band: Option<&'static str>,
    pub level: u32,
    pub channel: Vec<u32>,
    pub bandwidth: Vec<u32>,
    #[serde(rename = "maxEirp")]
    pub max_eirp: Vec<i32>,
}

pub type WireOutput = BTreeMap<NodeId, WireNodePlan>;

/// Flatten a committed tree and its channel assignment into the §6 output
/// shape: one record per node, radios split into three parallel arrays.
pub fn to_wire_output(tree: &Topology, assignment: &Assignment) -> WireOutput {
    let mut out = BTreeMap::new();
    for (id, tree_node) in &tree.nodes {
        let radios: &[RadioAssignment] = assignment.get(id).map(Vec::as_slice).unwrap_or(&[]);
        out.insert(
            id.clone(),
            WireNodePlan {
                parent: tree_node.parent.clone(),
                backhaul_band: tree_node.backhaul_band.map(Band::code),
                level: tree_node.level,
                channel: radios.iter().map(|r| r.channel).collect(),
                bandwidth: radios.iter().map(|r| r.bandwidth.mhz()).collect(),
                max_eirp: radios.iter().map(|r| r.max_eirp_dbm).collect(),
            },
        );
    }
    out
}

/// The `{"status": "error", ...}` shape of §6. `PlannerError`'s own derive
/// tags itself as `{"kind": ..., "details": {...}}`; reusing that via
/// `serde_json::to_value` keeps the field list in exactly one place
/// instead of hand-duplicating every variant's fields here.
#[derive(Debug, Clone, Serialize)]
pub struct WireError {
    pub status: &'static str,
    pub kind: &'static str,
    pub message: String,
    pub details: serde_json::Value,
}

impl WireError {
    pub fn from(err: &PlannerError) -> Self {
        let tagged = serde_json::to_value(err).unwrap_or(serde_json::Value::Null);
        let details = tagged.get("details").cloned().unwrap_or(serde_json::Value::Null);
        Self { status: "error", kind: err.kind_name(), message: err.to_string(), details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_composite_edge_key_against_known_nodes() {
        let mut nodes = BTreeMap::new();
        nodes.insert("node_a".to_string(), test_wire_node());
        nodes.insert("b".to_string(), test_wire_node());
        let (a, b) = split_edge_key("node_a_b", &nodes).unwrap();
        assert_eq!((a, b), ("node_a", "b"));
    }

    #[test]
    fn rejects_edge_key_naming_unknown_nodes() {
        let mut nodes = BTreeMap::new();
        nodes.insert("a".to_string(), test_wire_node());
        assert!(split_edge_key("a_ghost", &nodes).is_none());
    }

    #[test]
    fn parses_full_input_record() {
        let json = r#"{
            "nodes": {
                "A": {"gps": [1.0, 2.0], "load": 10.0,
                      "channels": {"6GH": {"20M": [6115]}},
                      "maxEirp": {"6GH": {"20M": [21]}}},
                "B": {"gps": [1.1, 2.1], "load": 5.0,
                      "channels": {"6GH": {"20M": [6115]}},
                      "maxEirp": {"6GH": {"20M": [21]}}}
            },
            "edges": {
                "A_B": {"rssi_6gh": [-50, -52]}
            }
        }"#;
        let wire: WireInput = serde_json::from_str(json).unwrap();
        let (input, cfg) = to_input_model(&wire).unwrap();
        assert_eq!(input.nodes.len(), 2);
        assert_eq!(input.edges.len(), 1);
        assert_eq!(cfg, Config::default());
        let merged = input.nodes[&NodeId::new("A")].merged_capabilities();
        let entry = merged[&Band::High][&Bandwidth::Mhz20][0];
        assert_eq!(entry.centre, 6115);
        assert_eq!(entry.max_eirp_dbm, 21);
    }

    fn test_wire_node() -> WireNode {
        WireNode { gps: [0.0, 0.0], load: 0.0, channels: BTreeMap::new(), max_eirp: BTreeMap::new() }
    }
}
