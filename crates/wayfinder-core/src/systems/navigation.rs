//! Navigation system - one navigation reaction per walker per tick

use hecs::{Entity, World};
use wayfinder_logic::config::WayfindingConfig;
use wayfinder_logic::error::NavError;
use wayfinder_logic::graph::NavGraph;
use wayfinder_logic::navigation::Surroundings;
use wayfinder_logic::weighting::Occupancy;

use crate::components::{Navigator, Odometer, Walker};

/// What happened during one navigation pass.
#[derive(Debug, Default)]
pub struct NavigationReport {
    /// Walkers that took a non-zero step.
    pub moved: usize,
    /// Walkers whose navigator is ARRIVED after this pass.
    pub arrived: usize,
    /// Walkers whose update failed; they did not move this tick.
    pub failures: Vec<(Entity, NavError)>,
}

/// Update every navigator and apply its displacement to the walker.
///
/// The occupancy snapshot must have been taken before this pass so every
/// walker sees the same crowd. A failed update is logged and the walker is
/// skipped until the next tick.
pub fn navigation_system(
    world: &mut World,
    graph: &NavGraph,
    config: &WayfindingConfig,
    occupancy: Option<&Occupancy>,
    tick: u64,
) -> NavigationReport {
    let mut env = Surroundings::new(graph, config);
    if let Some(occupancy) = occupancy {
        env = env.with_occupancy(occupancy);
    }

    let mut report = NavigationReport::default();
    for (entity, (walker, navigator, odometer)) in
        world.query_mut::<(&mut Walker, &mut Navigator, &mut Odometer)>()
    {
        match navigator.0.update(&mut walker.0, &env) {
            Ok(step) => {
                let length = step.length();
                walker.0.position += step;
                odometer.record(length);
                if length > 0.0 {
                    report.moved += 1;
                }
            }
            Err(e) => {
                log::warn!("pedestrian {:?} skipped: {}", entity, e);
                report.failures.push((entity, e));
                continue;
            }
        }

        if navigator.0.state().is_arrived() {
            report.arrived += 1;
            odometer.arrived_at.get_or_insert(tick);
        }
    }
    report
}
