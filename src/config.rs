//! Planner configuration (§3 of the spec).
//!
//! A plain, `Default`-backed struct passed by value — never a global. The
//! planner reads these seven options from whatever `Config` its caller
//! hands it; nothing here is process-wide state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Max children per internal node.
    pub max_degree: usize,
    /// Edges with RSSI worse than this (in the chosen band) are ineligible for backhaul.
    pub rssi_threshold: i32,
    /// Max tree depth from root (root at level 0).
    pub max_hop: u32,
    /// Coefficient on the modelled-throughput weight term.
    pub throughput_weight: f64,
    /// Coefficient on the subtree-load penalty term.
    pub load_weight: f64,
    /// Coefficient on the hop-count penalty term (negative: deeper is worse).
    pub hop_weight: f64,
    /// Interference floor for channel reuse.
    pub rssi_conflict_threshold: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_degree: 3,
            rssi_threshold: -72,
            max_hop: 5,
            throughput_weight: 1.0,
            load_weight: 0.5,
            hop_weight: -80.0,
            rssi_conflict_threshold: -85,
        }
    }
}
