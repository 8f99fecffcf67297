//! CLI driver for the mesh topology planner (§2.1).
//!
//! Reads a JSON input record from a file path argument, or from stdin when
//! no argument is given; writes the JSON output record (or a JSON error
//! record) to stdout. This binary is the only place in the crate that
//! touches `std::fs`/stdin — `mesh_topo_planner` itself never performs I/O.

use std::io::{self, Read};
use std::process::ExitCode;

use mesh_topo_planner::wire::{to_input_model, to_wire_output, WireError, WireInput};

fn read_input() -> io::Result<String> {
    match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Everything that can go wrong before the planner even runs gets mapped
/// into the same `InvalidInput` shape the core itself raises for §4.1
/// failures, so stdout is always one of the two §6 record shapes.
fn run() -> Result<serde_json::Value, mesh_topo_planner::PlannerError> {
    let raw = read_input()
        .map_err(|e| mesh_topo_planner::PlannerError::invalid_input("stdin/file", "<unreadable>", e.to_string()))?;
    let wire: WireInput = serde_json::from_str(&raw)
        .map_err(|e| mesh_topo_planner::PlannerError::invalid_input("<root>", "<malformed JSON>", e.to_string()))?;
    let (input, cfg) = to_input_model(&wire)?;

    let (tree, assignment, trace) = mesh_topo_planner::plan(&input, &cfg)?;
    tracing::info!(phases = trace.phases.len(), "plan succeeded");
    let output = to_wire_output(&tree, &assignment);
    Ok(serde_json::to_value(output).expect("wire output types always serialise"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    match run() {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let record = WireError::from(&err);
            println!("{}", serde_json::to_string_pretty(&record).unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}
