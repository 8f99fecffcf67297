//! In-memory data model for the mesh topology planner.
//!
//! Every type here either crosses the JSON boundary (and so derives
//! `Serialize`/`Deserialize`) or is built from one. Any collection whose
//! iteration order could affect the output plan is a `BTreeMap`/`BTreeSet`,
//! never a `HashMap`/`HashSet` — fixed here once rather than sorted at
//! every call site that walks it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Frequency band a radio operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    /// `6GH` in the wire format.
    #[serde(rename = "6GH")]
    High,
    /// `6GL` in the wire format.
    #[serde(rename = "6GL")]
    Low,
}

impl Band {
    pub const ALL: [Band; 2] = [Band::High, Band::Low];

    /// Short code used in the output record's `backhaulBand` field.
    pub fn code(self) -> &'static str {
        match self {
            Band::High => "H",
            Band::Low => "L",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::High => write!(f, "6GH"),
            Band::Low => write!(f, "6GL"),
        }
    }
}

/// Channel bandwidth, in MHz. Ordering is by descending width so
/// `Bandwidth::widest_first()` drives the channel assigner's fallback
/// sequence directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bandwidth {
    #[serde(rename = "20M")]
    Mhz20,
    #[serde(rename = "40M")]
    Mhz40,
    #[serde(rename = "80M")]
    Mhz80,
    #[serde(rename = "160M")]
    Mhz160,
}

impl Bandwidth {
    /// All bandwidths, widest first — the order the assigner steps down through.
    pub const WIDEST_FIRST: [Bandwidth; 4] =
        [Bandwidth::Mhz160, Bandwidth::Mhz80, Bandwidth::Mhz40, Bandwidth::Mhz20];

    pub fn mhz(self) -> u32 {
        match self {
            Bandwidth::Mhz20 => 20,
            Bandwidth::Mhz40 => 40,
            Bandwidth::Mhz80 => 80,
            Bandwidth::Mhz160 => 160,
        }
    }

    /// Rank used to order bandwidths from widest to narrowest; higher is wider.
    pub fn rank(self) -> u8 {
        match self {
            Bandwidth::Mhz160 => 3,
            Bandwidth::Mhz80 => 2,
            Bandwidth::Mhz40 => 1,
            Bandwidth::Mhz20 => 0,
        }
    }
}

impl PartialOrd for Bandwidth {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bandwidth {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}MHz", self.mhz())
    }
}

/// One channel centre and the max EIRP a node may radiate on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub centre: u32,
    pub max_eirp_dbm: i32,
}

/// `band -> bandwidth -> [(centre, max_eirp)]` capability table.
///
/// A `BTreeMap` of `BTreeMap`s so traversal order (descending bandwidth,
/// then table-listed channel order within a bandwidth) is reproducible
/// without re-sorting at the call site; the per-bandwidth channel vector
/// keeps the input's listed order, which is itself part of the contract
/// (§4.4: "iterate available channel centres in the table's listed order").
pub type CapabilityTable = BTreeMap<Band, BTreeMap<Bandwidth, Vec<ChannelEntry>>>;

/// Opaque node identifier. Lexicographic `Ord` drives every deterministic
/// tie-break in the spec (root selection, frontier selection, BFS ordering).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// GPS position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoord {
    pub lat: f64,
    pub lon: f64,
}

impl GpsCoord {
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A candidate mesh node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip)]
    pub id: NodeId,
    pub gps: GpsCoord,
    pub load: f64,
    pub channels: CapabilityTable,
    #[serde(rename = "maxEirp")]
    pub max_eirp: CapabilityTable,
}

impl Node {
    /// The capability table as the assigner needs it: channel centre paired
    /// with its max EIRP, per band/bandwidth. `channels` and `maxEirp` are
    /// two parallel tables on the wire (§6); this merges them once at
    /// construction so the rest of the crate works off a single table.
    pub fn merged_capabilities(&self) -> CapabilityTable {
        let mut merged: CapabilityTable = BTreeMap::new();
        for (band, by_bw) in &self.channels {
            let eirp_by_bw = self.max_eirp.get(band);
            let out_by_bw = merged.entry(*band).or_default();
            for (bw, centres) in by_bw {
                let eirps = eirp_by_bw.and_then(|m| m.get(bw));
                let entries: Vec<ChannelEntry> = centres
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        let max_eirp_dbm = eirps
                            .and_then(|v| v.get(i))
                            .map(|e| e.max_eirp_dbm)
                            .unwrap_or(entry.max_eirp_dbm);
                        ChannelEntry { centre: entry.centre, max_eirp_dbm }
                    })
                    .collect();
                out_by_bw.insert(*bw, entries);
            }
        }
        merged
    }

    pub fn has_any_channel(&self) -> bool {
        self.channels.values().any(|by_bw| by_bw.values().any(|v| !v.is_empty()))
    }
}

/// A bidirectional candidate link between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(skip)]
    pub a: NodeId,
    #[serde(skip)]
    pub b: NodeId,
    /// `rssi[band] = [rssi(a->b), rssi(b->a)]`, in dBm.
    pub rssi: BTreeMap<Band, [i32; 2]>,
}

impl Edge {
    /// RSSI from `from` towards `to` in the given band, if `from`/`to` are
    /// this edge's endpoints (in either order).
    pub fn rssi_towards(&self, band: Band, from: &NodeId, to: &NodeId) -> Option<i32> {
        let pair = self.rssi.get(&band)?;
        if *from == self.a && *to == self.b {
            Some(pair[0])
        } else if *from == self.b && *to == self.a {
            Some(pair[1])
        } else {
            None
        }
    }

    /// The worse (minimum) of the two directional RSSIs in a band.
    pub fn min_rssi(&self, band: Band) -> Option<i32> {
        self.rssi.get(&band).map(|pair| pair[0].min(pair[1]))
    }

    pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
        if *id == self.a {
            Some(&self.b)
        } else if *id == self.b {
            Some(&self.a)
        } else {
            None
        }
    }

    pub fn connects(&self, x: &NodeId, y: &NodeId) -> bool {
        (self.a == *x && self.b == *y) || (self.a == *y && self.b == *x)
    }
}

/// Validated in-memory input to a single `plan()` call.
#[derive(Debug, Clone)]
pub struct InputModel {
    pub nodes: BTreeMap<NodeId, Node>,
    pub edges: Vec<Edge>,
}

impl InputModel {
    /// Edges incident to `id`, in input order.
    pub fn edges_of<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.a == *id || e.b == *id)
    }
}
