//! Planner driver (§4.5).
//!
//! `plan()` is the crate's one public operation: validate, build the tree,
//! assign channels, materialise the output — in that order, with no
//! retries. Every error is constructed with full context at its point of
//! detection and returned immediately.

use tracing::{error, info_span};

use crate::channel::{self, Assignment};
use crate::config::Config;
use crate::error::{PlannerError, PlannerResult};
use crate::model::InputModel;
use crate::telemetry::{self, PlanTrace};
use crate::topology::{self, Topology};

/// §4.1: semantic checks the generator relies on, re-run here even though
/// the caller is expected to have already validated the input's shape.
fn validate(input: &InputModel) -> PlannerResult<()> {
    for edge in &input.edges {
        if !input.nodes.contains_key(&edge.a) {
            return Err(PlannerError::invalid_input("edges[].a", edge.a.to_string(), "edge endpoint must name an existing node"));
        }
        if !input.nodes.contains_key(&edge.b) {
            return Err(PlannerError::invalid_input("edges[].b", edge.b.to_string(), "edge endpoint must name an existing node"));
        }
    }
    for (id, node) in &input.nodes {
        if !node.has_any_channel() {
            return Err(PlannerError::invalid_input(
                format!("nodes[{id}].channels"),
                "{}",
                "every node's capability table must contain at least one (band, bandwidth, channel) entry",
            ));
        }
        if !node.gps.is_finite() {
            return Err(PlannerError::invalid_input(
                format!("nodes[{id}].gps"),
                format!("({}, {})", node.gps.lat, node.gps.lon),
                "GPS coordinates must be finite",
            ));
        }
    }
    Ok(())
}

/// §3: the post-condition pass over the generator's and assigner's own
/// output. Defends against a future change to either silently breaking an
/// invariant; this is the one place the core checks its own work rather
/// than its input.
fn check_invariants(input: &InputModel, tree: &Topology, assignment: &Assignment, cfg: &Config) -> PlannerResult<()> {
    let roots: Vec<_> = tree.nodes.iter().filter(|(_, n)| n.parent.is_none()).collect();
    if roots.len() != 1 {
        return Err(PlannerError::internal(format!("expected exactly one root, found {}", roots.len())));
    }

    for (id, node) in &tree.nodes {
        if let Some(parent) = &node.parent {
            let expected_level = tree.nodes[parent].level + 1;
            if node.level != expected_level {
                return Err(PlannerError::internal(format!(
                    "node {id} has level {} but parent {parent} is at level {} (expected {expected_level})",
                    node.level, tree.nodes[parent].level
                )));
            }
            if node.level > cfg.max_hop {
                return Err(PlannerError::internal(format!("node {id} at level {} exceeds MAX_HOP {}", node.level, cfg.max_hop)));
            }
        }
        if node.degree() > cfg.max_degree {
            return Err(PlannerError::internal(format!("node {id} has degree {} exceeding MAX_DEGREE {}", node.degree(), cfg.max_degree)));
        }
    }

    for (id, radios) in assignment {
        let caps = input.nodes[id].merged_capabilities();
        for radio in radios {
            let found = caps
                .get(&radio.band)
                .and_then(|by_bw| by_bw.get(&radio.bandwidth))
                .is_some_and(|entries| entries.iter().any(|e| e.centre == radio.channel && e.max_eirp_dbm == radio.max_eirp_dbm));
            if !found {
                return Err(PlannerError::internal(format!(
                    "node {id} was assigned channel {} ({}, {}) not present in its own capability table",
                    radio.channel, radio.band, radio.bandwidth
                )));
            }
        }
    }

    Ok(())
}

/// Build the rooted tree, assign channels, and return both, recording
/// phase timings into `trace`. Kept separate from [`plan`] so callers that
/// only need the tree (e.g. a future incremental-replan feature) aren't
/// forced to pay for channel assignment too — not exercised today, but the
/// split costs nothing.
fn run(input: &InputModel, cfg: &Config, trace: &mut PlanTrace) -> PlannerResult<(Topology, Assignment)> {
    telemetry::phase(trace, "validate", || validate(input))?;

    let tree = telemetry::phase(trace, "build_tree", || topology::build(input, cfg))?;
    let assignment = telemetry::phase(trace, "assign_channels", || channel::assign(input, &tree, cfg))?;
    telemetry::phase(trace, "check_invariants", || check_invariants(input, &tree, &assignment, cfg))?;

    Ok((tree, assignment))
}

/// `plan(nodes, edges, config) -> Plan | Error` (§4.5).
pub fn plan(input: &InputModel, cfg: &Config) -> PlannerResult<(Topology, Assignment, PlanTrace)> {
    let span = info_span!("plan", nodes = input.nodes.len(), edges = input.edges.len());
    let _entered = span.enter();

    let mut trace = PlanTrace::new(input.nodes.len(), input.edges.len());
    match run(input, cfg, &mut trace) {
        Ok((tree, assignment)) => Ok((tree, assignment, trace)),
        Err(e) => {
            error!(kind = e.kind_name(), %e, "plan failed");
            Err(e)
        }
    }
}
