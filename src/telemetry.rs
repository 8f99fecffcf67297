//! Structured per-run tracing (§2.1 of the expanded spec).
//!
//! Two layers, same split as the teacher's `telemetry.rs`/`audit.rs`:
//! `tracing` spans and events for anyone with a subscriber installed, and
//! a `PlanTrace` a caller can inspect directly without parsing log lines.
//! Only this module reads the wall clock — the generator and assigner
//! never do.

use std::time::Instant;

use serde::Serialize;

/// Wall-clock duration of one planning phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseTiming {
    pub phase: &'static str,
    pub duration_ms: f64,
}

/// Structured summary of one `plan()` call.
#[derive(Debug, Clone, Serialize)]
pub struct PlanTrace {
    pub node_count: usize,
    pub edge_count: usize,
    pub phases: Vec<PhaseTiming>,
}

impl PlanTrace {
    pub fn new(node_count: usize, edge_count: usize) -> Self {
        Self { node_count, edge_count, phases: Vec::new() }
    }

    fn record(&mut self, phase: &'static str, duration_ms: f64) {
        self.phases.push(PhaseTiming { phase, duration_ms });
    }
}

/// Run `f` under a named `tracing` span, recording its wall-clock duration
/// into `trace`. The closure's return value passes straight through, so
/// this composes with `?` at call sites exactly like calling `f()` bare.
pub fn phase<T>(trace: &mut PlanTrace, name: &'static str, f: impl FnOnce() -> T) -> T {
    let span = tracing::info_span!("plan_phase", phase = name);
    let _entered = span.enter();
    let start = Instant::now();
    let out = f();
    trace.record(name, start.elapsed().as_secs_f64() * 1000.0);
    out
}
