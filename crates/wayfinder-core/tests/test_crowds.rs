//! Integration tests: whole crowds driven through generated layouts.

use rand::rngs::StdRng;
use rand::SeedableRng;

use wayfinder_core::generation::{generate_crowd, CrowdSpec, GridLayout};
use wayfinder_core::prelude::*;
use wayfinder_logic::navigation::{NavState, Pedestrian};
use wayfinder_logic::strategy::{
    DestinationReaching, KnownDestinationReaching, LeastVisitedExplorer, Pursuing, RouteFollowing,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn crowd_engine(layout: &GridLayout, count: usize, congestion: bool, seed: u64) -> SimulationEngine {
    let graph = layout.open_grid().unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    let crowd = generate_crowd(
        &graph,
        &CrowdSpec {
            count,
            ..Default::default()
        },
        &mut rng,
    );
    let mut config = EngineConfig::default();
    config.wayfinding.use_congestion = congestion;
    let mut engine = SimulationEngine::new(graph, config).unwrap();
    engine.spawn_crowd(crowd, Pursuing::new);
    engine
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_pursuing_crowd_reaches_every_destination() {
    let layout = GridLayout::new(4, 4, 10.0);
    let mut engine = crowd_engine(&layout, 40, false, 7);
    let summary = engine.run(20_000);
    assert_eq!(summary.pedestrians, 40);
    assert!(summary.all_arrived(), "{:?}", summary);
    assert_eq!(summary.failures, 0);
}

#[test]
fn test_congestion_does_not_strand_anyone() {
    let layout = GridLayout::new(4, 4, 10.0);
    let mut engine = crowd_engine(&layout, 40, true, 11);
    let summary = engine.run(20_000);
    assert!(summary.all_arrived(), "{:?}", summary);
}

#[test]
fn test_mixed_strategies_share_one_engine() {
    let layout = GridLayout::new(3, 3, 10.0);
    let order = layout.serpentine_order();
    let graph = layout.serpentine().unwrap();
    let start = layout.centre((0, 0));
    let goal = layout.centre((2, 2));
    let mut engine = SimulationEngine::new(graph, EngineConfig::default()).unwrap();

    let pursuer = engine.spawn_pedestrian(
        "pursuer",
        Pedestrian::new(start, 0.25, 1.2),
        Pursuing::new(goal),
    );
    let follower = engine.spawn_pedestrian(
        "follower",
        Pedestrian::new(start, 0.25, 1.2),
        RouteFollowing::new(order.iter().map(|&c| layout.centre(c))),
    );
    let knower = engine.spawn_pedestrian(
        "knower",
        Pedestrian::new(start, 0.25, 1.2).with_cognitive_map(layout.chain_map(&order).unwrap()),
        KnownDestinationReaching::new([goal]),
    );
    let explorer = engine.spawn_pedestrian(
        "explorer",
        Pedestrian::new(start, 0.25, 1.2),
        DestinationReaching::new([goal], Box::new(LeastVisitedExplorer)),
    );

    let summary = engine.run(20_000);
    assert!(summary.all_arrived(), "{:?}", summary);
    for e in [pursuer, follower, knower, explorer] {
        assert_eq!(engine.state_of(e), Some(NavState::Arrived));
        assert!(engine.position_of(e).unwrap().approx_eq(&goal, 1e-6));
        for &cell in &order {
            assert_eq!(engine.visits_of(e, layout.room(cell)), Some(1));
        }
    }
}

#[test]
fn test_engine_config_from_json_drives_run() {
    let layout = GridLayout::new(2, 2, 10.0);
    let config = EngineConfig::from_json(
        r#"{ "wayfinding": { "reaction_rate": 5.0 }, "trace_transitions": true }"#,
    )
    .unwrap();
    let mut engine = SimulationEngine::new(layout.open_grid().unwrap(), config).unwrap();
    let e = engine.spawn_pedestrian(
        "slow",
        Pedestrian::new(layout.centre((0, 0)), 0.25, 1.0),
        Pursuing::new(layout.centre((1, 1))),
    );
    let summary = engine.run(10_000);
    assert!(summary.all_arrived());
    // Five reactions per second
    assert!((summary.sim_time - summary.ticks as f64 / 5.0).abs() < 1e-9);
    let trace = engine.trace_of(e).unwrap();
    assert_eq!(
        trace.iter().filter(|&&s| s == NavState::CrossingDoor).count(),
        2
    );
}
