//! Wayfinder Headless Scenario Harness
//!
//! Drives the wayfinding core and the engine through fixed scenarios and
//! checks the properties every navigator must keep. Runs entirely
//! in-process, no rendering.
//!
//! Usage:
//!   cargo run -p wayfinder-simtest
//!   cargo run -p wayfinder-simtest -- --verbose
//!   cargo run -p wayfinder-simtest -- --json

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use wayfinder_core::generation::{generate_crowd, CrowdSpec, GridLayout};
use wayfinder_core::prelude::*;
use wayfinder_logic::config::WayfindingConfig;
use wayfinder_logic::error::NavError;
use wayfinder_logic::geometry::Vec2;
use wayfinder_logic::graph::NavGraph;
use wayfinder_logic::memory::VolatileMemory;
use wayfinder_logic::navigation::{NavState, NavigationMachine, Pedestrian, Surroundings};
use wayfinder_logic::ranking::rank_doors;
use wayfinder_logic::strategy::{
    DestinationReaching, KnownDestinationReaching, LeastVisitedExplorer, Pursuing,
    RouteFollowing, Strategy,
};
use wayfinder_logic::weighting::{choose_door, memory_factor, DoorCandidate, WeightInputs};

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

#[derive(Serialize)]
struct Report<'a> {
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    if !json {
        println!("=== Wayfinder Scenario Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. The three reference scenarios
    results.extend(validate_scenarios(json));

    // 2. Per-tick displacement: budget cap and no overshoot
    results.extend(validate_displacement(json));

    // 3. Door ranking sweep
    results.extend(validate_ranking(json));

    // 4. Volatile memory penalty
    results.extend(validate_memory(json));

    // 5. Maze with every strategy in one engine
    results.extend(validate_maze(json));

    // 6. Crowds
    results.extend(validate_crowds(json));

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if json {
        let report = Report {
            passed,
            failed,
            results: &results,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("could not serialize report: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn section(title: &str, quiet: bool) {
    if !quiet {
        println!("--- {} ---", title);
    }
}

// ── Driving a single navigator ──────────────────────────────────────────

struct Tick {
    position: Vec2,
    step: Vec2,
    target: Option<Vec2>,
}

struct Drive {
    trace: Vec<NavState>,
    ticks: Vec<Tick>,
    final_position: Vec2,
    /// Displacement of one extra update after arrival.
    after_arrival: Vec2,
    arrived: bool,
}

fn drive(
    graph: &NavGraph,
    config: &WayfindingConfig,
    mut pedestrian: Pedestrian,
    strategy: Strategy,
    max_ticks: usize,
) -> Result<Drive, NavError> {
    let env = Surroundings::new(graph, config);
    let mut machine = NavigationMachine::new(strategy).with_trace();
    let mut ticks = Vec::new();
    while ticks.len() < max_ticks && !machine.state().is_arrived() {
        let position = pedestrian.position;
        let step = machine.update(&mut pedestrian, &env)?;
        ticks.push(Tick {
            position,
            step,
            target: machine.sub_destination(),
        });
        pedestrian.position += step;
    }
    let after_arrival = machine.update(&mut pedestrian, &env)?;
    Ok(Drive {
        trace: machine.trace().map(|t| t.to_vec()).unwrap_or_default(),
        ticks,
        final_position: pedestrian.position,
        after_arrival,
        arrived: machine.state().is_arrived(),
    })
}

fn trace_names(trace: &[NavState]) -> String {
    trace
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join("→")
}

// ── 1. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(quiet: bool) -> Vec<TestResult> {
    section("Scenarios", quiet);
    let mut results = Vec::new();
    let config = WayfindingConfig::default();
    let layout = GridLayout::new(2, 1, 10.0);

    // A: two rooms, one door
    match layout.open_grid().and_then(|g| {
        let dest = Vec2::new(15.0, 5.0);
        let walker = Pedestrian::new(Vec2::new(3.0, 5.0), 0.25, 1.2);
        drive(&g, &config, walker, Pursuing::new(dest).into(), 2000).map(|d| (d, dest))
    }) {
        Ok((d, dest)) => {
            let expected = [
                NavState::Start,
                NavState::NewRoom,
                NavState::MovingToDoor,
                NavState::CrossingDoor,
                NavState::NewRoom,
                NavState::MovingToFinal,
                NavState::Arrived,
            ];
            results.push(check(
                "scenario_a_states",
                d.trace == expected,
                trace_names(&d.trace),
            ));
            let crossings = d.trace.iter().filter(|&&s| s == NavState::CrossingDoor).count();
            results.push(check(
                "scenario_a_one_door",
                crossings == 1 && d.final_position.approx_eq(&dest, 1e-6),
                format!("{} crossing(s), {} ticks", crossings, d.ticks.len()),
            ));
        }
        Err(e) => results.push(check("scenario_a", false, e.to_string())),
    }

    // B: no doors, destination elsewhere
    match layout.rooms().and_then(|g| {
        let walker = Pedestrian::new(Vec2::new(5.0, 5.0), 0.25, 1.2);
        drive(&g, &config, walker, Pursuing::new(Vec2::new(15.0, 5.0)).into(), 10)
    }) {
        Ok(d) => {
            let expected = [NavState::Start, NavState::NewRoom, NavState::Arrived];
            let still = d.ticks.iter().all(|t| t.step == Vec2::ZERO) && d.after_arrival == Vec2::ZERO;
            results.push(check(
                "scenario_b_stops",
                d.trace == expected && still,
                trace_names(&d.trace),
            ));
        }
        Err(e) => results.push(check("scenario_b", false, e.to_string())),
    }

    // C: already at the destination
    match layout.open_grid().and_then(|g| {
        let here = Vec2::new(4.0, 6.0);
        let walker = Pedestrian::new(here, 0.25, 1.2);
        drive(&g, &config, walker, Pursuing::new(here).into(), 10)
    }) {
        Ok(d) => {
            let zero = d.ticks.iter().all(|t| t.step == Vec2::ZERO);
            results.push(check(
                "scenario_c_immediate",
                d.arrived && d.ticks.len() == 1 && zero,
                trace_names(&d.trace),
            ));
        }
        Err(e) => results.push(check("scenario_c", false, e.to_string())),
    }

    results
}

// ── 2. Displacement ─────────────────────────────────────────────────────

fn validate_displacement(quiet: bool) -> Vec<TestResult> {
    section("Displacement", quiet);
    let mut results = Vec::new();
    let layout = GridLayout::new(3, 2, 10.0);
    let graph = match layout.open_grid() {
        Ok(g) => g,
        Err(e) => return vec![check("displacement_layout", false, e.to_string())],
    };

    let mut runs = 0;
    let mut cap_violations = 0;
    let mut overshoots = 0;
    let mut short_steps = 0;
    let mut stuck = 0;
    for speed in [0.5, 1.0, 1.4, 3.0] {
        for rate in [2.0, 10.0, 25.0] {
            let config = WayfindingConfig {
                reaction_rate: rate,
                ..WayfindingConfig::default()
            };
            let budget = config.walking_budget(speed);
            let walker = Pedestrian::new(Vec2::new(2.0, 3.0), 0.25, speed);
            let dest = Vec2::new(27.5, 16.0);
            let d = match drive(&graph, &config, walker, Pursuing::new(dest).into(), 50_000) {
                Ok(d) => d,
                Err(e) => {
                    results.push(check("displacement_run", false, e.to_string()));
                    continue;
                }
            };
            runs += 1;
            if !d.arrived || d.after_arrival != Vec2::ZERO {
                stuck += 1;
            }
            for t in &d.ticks {
                if t.step.length() > budget + 1e-12 {
                    cap_violations += 1;
                }
                let Some(target) = t.target else { continue };
                let remaining = t.position.distance(&target);
                if remaining > budget {
                    if (t.step.length() - budget).abs() > 1e-9 {
                        short_steps += 1;
                    }
                } else if !(t.position + t.step).approx_eq(&target, 1e-12) {
                    overshoots += 1;
                }
            }
        }
    }

    results.push(check(
        "budget_cap",
        cap_violations == 0 && short_steps == 0,
        format!(
            "{} runs, {} over budget, {} short of budget",
            runs, cap_violations, short_steps
        ),
    ));
    results.push(check(
        "no_overshoot",
        overshoots == 0,
        format!("{} runs, {} steps missed their target", runs, overshoots),
    ));
    results.push(check(
        "arrived_is_still",
        stuck == 0,
        format!("{} runs, {} not at rest", runs, stuck),
    ));
    results
}

// ── 3. Ranking ──────────────────────────────────────────────────────────

fn validate_ranking(quiet: bool) -> Vec<TestResult> {
    section("Door ranking", quiet);
    let layout = GridLayout::new(3, 3, 10.0);
    let graph = match layout.open_grid() {
        Ok(g) => g,
        Err(e) => return vec![check("ranking_layout", false, e.to_string())],
    };
    let centre_room = layout.room((1, 1));
    let centre = layout.centre((1, 1));

    let mut permutations = 0;
    let mut monotone = 0;
    let samples = 24;
    for i in 0..samples {
        let a = i as f64 / samples as f64 * std::f64::consts::TAU;
        let target = centre + Vec2::new(a.cos(), a.sin()) * 40.0;
        let Ok(ranking) = rank_doors(&graph, centre_room, target) else {
            continue;
        };
        let mut ranks: Vec<u32> = ranking.ordered().iter().map(|d| d.rank).collect();
        ranks.sort_unstable();
        if ranks == [1, 2, 3, 4] {
            permutations += 1;
        }
        if ranking
            .ordered()
            .windows(2)
            .all(|w| w[0].path_length <= w[1].path_length && w[0].rank < w[1].rank)
        {
            monotone += 1;
        }
    }

    vec![
        check(
            "rank_permutation",
            permutations == samples,
            format!("{}/{} targets ranked 1..4", permutations, samples),
        ),
        check(
            "rank_monotonic",
            monotone == samples,
            format!("{}/{} targets ordered by path length", monotone, samples),
        ),
    ]
}

// ── 4. Memory ───────────────────────────────────────────────────────────

fn validate_memory(quiet: bool) -> Vec<TestResult> {
    section("Volatile memory", quiet);
    let mut results = Vec::new();

    let doubling = (0..16).all(|v| memory_factor(v + 1) == 2.0 * memory_factor(v));
    results.push(check(
        "memory_factor_doubles",
        doubling,
        "2^(v+1) = 2 × 2^v for v < 16",
    ));

    // Centre of a 3-room corridor: unranked doors west and east
    let layout = GridLayout::new(3, 1, 10.0);
    let graph = match layout.open_grid() {
        Ok(g) => g,
        Err(e) => {
            results.push(check("memory_layout", false, e.to_string()));
            return results;
        }
    };
    let config = WayfindingConfig::default();
    let mut memory = VolatileMemory::new();
    let here = layout.centre((1, 0));
    let west = layout.room((0, 0));

    let mut picks = Vec::new();
    for _ in 0..3 {
        let chosen = DoorCandidate::collect(&graph, layout.room((1, 0)), here, 0.25, None)
            .and_then(|candidates| {
                let inputs = WeightInputs {
                    graph: &graph,
                    memory: &memory,
                    config: &config,
                    goals: &[],
                    occupancy: None,
                    footprint: 0.0,
                };
                choose_door(&candidates, &inputs)
            });
        match chosen {
            Ok(Some(p)) => {
                let head = graph.passage(p).map(|p| p.head).ok();
                picks.push(head);
                // Walk into whichever room was picked
                if let Some(h) = head {
                    memory.visit(h);
                }
            }
            _ => picks.push(None),
        }
    }
    // Ties resolve west first; after that the two rooms alternate
    let expected = [Some(west), Some(layout.room((2, 0))), Some(west)];
    results.push(check(
        "memory_alternates",
        picks == expected,
        format!("{:?}", picks),
    ));
    results
}

// ── 5. Maze ─────────────────────────────────────────────────────────────

fn validate_maze(quiet: bool) -> Vec<TestResult> {
    section("Serpentine maze", quiet);
    let mut results = Vec::new();
    let layout = GridLayout::new(3, 3, 10.0);
    let order = layout.serpentine_order();
    let (graph, map) = match (layout.serpentine(), layout.chain_map(&order)) {
        (Ok(g), Ok(m)) => (g, m),
        (Err(e), _) | (_, Err(e)) => {
            return vec![check("maze_layout", false, e.to_string())];
        }
    };
    let config = EngineConfig {
        trace_transitions: true,
        ..EngineConfig::default()
    };
    let mut engine = match SimulationEngine::new(graph, config) {
        Ok(e) => e,
        Err(e) => return vec![check("maze_engine", false, e.to_string())],
    };

    let start = layout.centre((0, 0));
    let goal = Vec2::new(26.0, 24.0);
    let walker = || Pedestrian::new(start, 0.25, 1.3);
    let waypoints: Vec<Vec2> = order.iter().map(|&c| layout.centre(c)).chain([goal]).collect();
    let agents = [
        engine.spawn_pedestrian("pursuing", walker(), Pursuing::new(goal)),
        engine.spawn_pedestrian("route-following", walker(), RouteFollowing::new(waypoints)),
        engine.spawn_pedestrian(
            "known-destination",
            walker().with_cognitive_map(map),
            KnownDestinationReaching::new([goal]),
        ),
        engine.spawn_pedestrian(
            "destination-reaching",
            walker(),
            DestinationReaching::new([goal], Box::new(LeastVisitedExplorer)),
        ),
    ];

    let summary = engine.run(20_000);
    results.push(check(
        "maze_all_arrive",
        summary.all_arrived() && summary.failures == 0,
        format!(
            "{}/{} arrived in {} ticks ({:.1}s)",
            summary.arrived, summary.pedestrians, summary.ticks, summary.sim_time
        ),
    ));

    for e in agents {
        let name = engine.label_of(e).unwrap_or_default();
        let at_goal = engine
            .position_of(e)
            .map(|p| p.approx_eq(&goal, 1e-6))
            .unwrap_or(false);
        let crossings = engine
            .trace_of(e)
            .map(|t| t.iter().filter(|&&s| s == NavState::CrossingDoor).count())
            .unwrap_or(0);
        let walked = engine.odometer_of(e).map(|o| o.distance).unwrap_or(0.0);
        results.push(check(
            &format!("maze_{}", name),
            at_goal && crossings == 8,
            format!("{} doors, walked {:.1}", crossings, walked),
        ));
    }
    results
}

// ── 6. Crowds ───────────────────────────────────────────────────────────

fn validate_crowds(quiet: bool) -> Vec<TestResult> {
    section("Crowds", quiet);
    let mut results = Vec::new();
    let layout = GridLayout::new(5, 5, 10.0);

    for congestion in [false, true] {
        let name = if congestion {
            "crowd_congestion"
        } else {
            "crowd_plain"
        };
        let graph = match layout.open_grid() {
            Ok(g) => g,
            Err(e) => {
                results.push(check(name, false, e.to_string()));
                continue;
            }
        };
        let mut rng = StdRng::seed_from_u64(2024);
        let crowd = generate_crowd(
            &graph,
            &CrowdSpec {
                count: 100,
                ..CrowdSpec::default()
            },
            &mut rng,
        );
        let mut config = EngineConfig::default();
        config.wayfinding.use_congestion = congestion;
        let mut engine = match SimulationEngine::new(graph, config) {
            Ok(e) => e,
            Err(e) => {
                results.push(check(name, false, e.to_string()));
                continue;
            }
        };
        engine.spawn_crowd(crowd, Pursuing::new);
        let summary = engine.run(50_000);
        results.push(check(
            name,
            summary.all_arrived() && summary.failures == 0,
            format!(
                "{}/{} arrived in {} ticks, {} failures",
                summary.arrived, summary.pedestrians, summary.ticks, summary.failures
            ),
        ));
    }
    results
}
