//! WiFi mesh topology planner.
//!
//! Given candidate nodes and candidate bidirectional links, [`plan()`]
//! produces a rooted spanning tree plus a per-node channel/bandwidth/EIRP
//! assignment, or a typed [`PlannerError`]. The crate is a pure function
//! from a validated in-memory model to a result — no I/O, no global state,
//! safe to call concurrently from independent threads.

pub mod channel;
pub mod config;
pub mod error;
pub mod model;
pub mod plan;
pub mod telemetry;
pub mod topology;
pub mod weight;
pub mod wire;

pub use channel::Assignment;
pub use config::Config;
pub use error::{PlannerError, PlannerResult};
pub use model::{Band, Bandwidth, Edge, InputModel, Node, NodeId};
pub use plan::plan;
pub use telemetry::PlanTrace;
pub use topology::Topology;
pub use wire::{to_input_model, to_wire_output, WireError, WireInput, WireOutput};
