//! Typed planner errors (§7).
//!
//! One `thiserror` enum, one variant per error kind. Every variant carries
//! the structured detail the spec's error table names, so a caller can
//! match on the kind and read fields directly instead of re-parsing the
//! `Display` message — mirroring the teacher's `NetworkError` in
//! `network.rs`.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::{Band, Bandwidth, NodeId};

#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "kind", content = "details")]
pub enum PlannerError {
    /// §4.1 semantic validation failed.
    #[error("invalid input: {requirement} (field `{field}` = `{value}`)")]
    #[serde(rename = "InvalidInput")]
    InvalidInput { field: String, value: String, requirement: String },

    /// The generator could not connect every node under the configured constraints.
    #[error("topology unreachable: node(s) {unreachable:?} could not be attached to the tree")]
    #[serde(rename = "TopologyUnreachable")]
    TopologyUnreachable {
        unreachable: Vec<NodeId>,
        /// `node -> (parent, level)` for every node committed before the failure.
        last_tree_state: BTreeMap<NodeId, (Option<NodeId>, u32)>,
    },

    /// The assigner exhausted every candidate for a (node, band).
    #[error("channel assignment failed for node `{node}` in band {band}: candidates {attempted:?} all conflicted with {conflicting:?}")]
    #[serde(rename = "ChannelAssignment")]
    ChannelAssignment {
        node: NodeId,
        band: Band,
        attempted: Vec<(Bandwidth, u32)>,
        conflicting: Vec<NodeId>,
    },

    /// A post-condition check found the planner's own output inconsistent.
    #[error("internal invariant violated: {description}")]
    #[serde(rename = "InternalInvariant")]
    InternalInvariant { description: String },
}

impl PlannerError {
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self::InvalidInput { field: field.into(), value: value.into(), requirement: requirement.into() }
    }

    pub fn internal(description: impl Into<String>) -> Self {
        Self::InternalInvariant { description: description.into() }
    }

    /// The tag used in the `{"status": "error", "kind": ...}` output record (§6).
    pub fn kind_name(&self) -> &'static str {
        match self {
            PlannerError::InvalidInput { .. } => "InvalidInput",
            PlannerError::TopologyUnreachable { .. } => "TopologyUnreachable",
            PlannerError::ChannelAssignment { .. } => "ChannelAssignment",
            PlannerError::InternalInvariant { .. } => "InternalInvariant",
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_displays_field_and_requirement() {
        let err = PlannerError::invalid_input("gps.lat", "NaN", "must be finite");
        let msg = err.to_string();
        assert!(msg.contains("gps.lat"));
        assert!(msg.contains("must be finite"));
    }

    #[test]
    fn kind_name_matches_serde_tag() {
        let err = PlannerError::internal("unreachable code path");
        assert_eq!(err.kind_name(), "InternalInvariant");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "InternalInvariant");
    }
}
