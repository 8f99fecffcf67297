//! Benchmark for end-to-end planning latency.
//!
//! Measures `plan()` over chain-shaped networks of increasing node count,
//! documenting the §5 complexity claim (`O(N^2 * B)` generator,
//! `O(N * C * N)` assigner) rather than gating correctness.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mesh_topo_planner::config::Config;
use mesh_topo_planner::model::{Band, Bandwidth, ChannelEntry, Edge, GpsCoord, InputModel, Node, NodeId};
use mesh_topo_planner::plan;

fn caps_for_index(i: usize) -> BTreeMap<Band, BTreeMap<Bandwidth, Vec<ChannelEntry>>> {
    let centre = 6000 + (i as u32 % 40) * 1000;
    let mut m: BTreeMap<Band, BTreeMap<Bandwidth, Vec<ChannelEntry>>> = BTreeMap::new();
    m.entry(Band::High).or_default().insert(Bandwidth::Mhz20, vec![ChannelEntry { centre, max_eirp_dbm: 20 }]);
    m.entry(Band::Low).or_default().insert(Bandwidth::Mhz20, vec![ChannelEntry { centre: centre + 500, max_eirp_dbm: 20 }]);
    m
}

/// A star-of-chains network: `width` chains of `n / width` nodes each,
/// hanging off a single high-load root, so the tree stays within the
/// default `MAX_HOP` regardless of total node count.
fn star_of_chains(n: usize, width: usize) -> InputModel {
    let mut nodes = BTreeMap::new();
    let root_id = NodeId::new("ROOT");
    nodes.insert(
        root_id.clone(),
        Node { id: root_id.clone(), gps: GpsCoord { lat: 0.0, lon: 0.0 }, load: 1_000_000.0, channels: caps_for_index(0), max_eirp: caps_for_index(0) },
    );
    let mut edges = Vec::new();
    let per_chain = (n / width).max(1);
    let mut idx = 0usize;
    for arm in 0..width {
        let mut prev = root_id.clone();
        for step in 0..per_chain {
            idx += 1;
            let id = NodeId::new(format!("A{arm:02}N{step:03}"));
            nodes.insert(
                id.clone(),
                Node { id: id.clone(), gps: GpsCoord { lat: 0.0, lon: 0.0 }, load: 1.0, channels: caps_for_index(idx), max_eirp: caps_for_index(idx) },
            );
            let mut rssi = BTreeMap::new();
            rssi.insert(Band::High, [-50, -52]);
            rssi.insert(Band::Low, [-55, -57]);
            edges.push(Edge { a: prev.clone(), b: id.clone(), rssi });
            prev = id;
        }
    }
    InputModel { nodes, edges }
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    for &n in &[10usize, 50, 100, 200] {
        // Keep each arm within the default MAX_HOP of 5 by scaling arm count
        // with node count rather than holding it fixed.
        let width = ((n + 4) / 5).max(1);
        let input = star_of_chains(n, width);
        let cfg = Config::default();
        group.bench_with_input(BenchmarkId::new("nodes", n), &input, |b, input| {
            b.iter(|| {
                let result = plan(black_box(input), black_box(&cfg));
                black_box(result)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
