//! Simulation engine - main entry point for running pedestrians

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use wayfinder_logic::config::WayfindingConfig;
use wayfinder_logic::geometry::Vec2;
use wayfinder_logic::graph::{NavGraph, RoomId};
use wayfinder_logic::navigation::{NavState, NavigationMachine, Pedestrian};
use wayfinder_logic::strategy::Strategy;
use wayfinder_logic::weighting::Occupancy;

use crate::components::*;
use crate::error::EngineError;
use crate::generation::CrowdMember;
use crate::systems::*;

/// Engine settings, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub wayfinding: WayfindingConfig,
    /// `run` returns as soon as every pedestrian has arrived.
    pub stop_when_all_arrived: bool,
    /// Record every navigator's state transitions.
    pub trace_transitions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wayfinding: WayfindingConfig::default(),
            stop_when_all_arrived: true,
            trace_transitions: false,
        }
    }
}

impl EngineConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.wayfinding.validate()?;
        Ok(config)
    }
}

/// Outcome of [`SimulationEngine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Ticks executed by this run.
    pub ticks: u64,
    /// Simulated seconds at the end of the run.
    pub sim_time: f64,
    pub pedestrians: usize,
    pub arrived: usize,
    /// Failed navigator updates during this run.
    pub failures: usize,
}

impl RunSummary {
    pub fn all_arrived(&self) -> bool {
        self.arrived == self.pedestrians
    }
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all pedestrians
    pub world: World,
    /// Environment shared read-only by every navigator
    graph: NavGraph,
    config: EngineConfig,
    /// Room counts taken at the start of the last tick
    occupancy: Occupancy,
    tick: u64,
    /// Simulated seconds since start
    sim_time: f64,
}

impl SimulationEngine {
    /// Create an engine over `graph` with no pedestrians
    pub fn new(graph: NavGraph, config: EngineConfig) -> Result<Self, EngineError> {
        config.wayfinding.validate()?;
        Ok(Self {
            world: World::new(),
            graph,
            config,
            occupancy: Occupancy::new(),
            tick: 0,
            sim_time: 0.0,
        })
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add a pedestrian steered by `strategy`
    pub fn spawn_pedestrian(
        &mut self,
        label: impl Into<String>,
        pedestrian: Pedestrian,
        strategy: impl Into<Strategy>,
    ) -> Entity {
        let mut machine = NavigationMachine::new(strategy);
        if self.config.trace_transitions {
            machine = machine.with_trace();
        }
        let label = label.into();
        log::debug!("spawning {} at {:?}", label, pedestrian.position);
        self.world.spawn((
            Walker(pedestrian),
            Navigator(machine),
            Label(label),
            Odometer::default(),
        ))
    }

    /// Spawn generated crowd members, building each one's strategy from its
    /// destination
    pub fn spawn_crowd<F, S>(&mut self, members: Vec<CrowdMember>, mut make_strategy: F) -> Vec<Entity>
    where
        F: FnMut(Vec2) -> S,
        S: Into<Strategy>,
    {
        members
            .into_iter()
            .map(|m| {
                let strategy = make_strategy(m.destination);
                self.spawn_pedestrian(m.label, m.pedestrian, strategy)
            })
            .collect()
    }

    /// Give a pedestrian a new strategy (usually a new destination)
    pub fn set_destination(
        &mut self,
        entity: Entity,
        strategy: impl Into<Strategy>,
        clear_memory: bool,
    ) -> Result<(), EngineError> {
        let (walker, navigator, odometer) = self
            .world
            .query_one_mut::<(&mut Walker, &mut Navigator, &mut Odometer)>(entity)
            .map_err(|_| EngineError::NoSuchPedestrian(entity))?;
        navigator.0.set_strategy(strategy, clear_memory, &mut walker.0);
        odometer.arrived_at = None;
        Ok(())
    }

    /// Like [`set_destination`](Self::set_destination), clearing memory
    /// according to `wayfinding.clear_memory_on_new_destination`
    pub fn redirect(
        &mut self,
        entity: Entity,
        strategy: impl Into<Strategy>,
    ) -> Result<(), EngineError> {
        let clear_memory = self.config.wayfinding.clear_memory_on_new_destination;
        self.set_destination(entity, strategy, clear_memory)
    }

    /// Advance the simulation by one navigation tick
    pub fn update(&mut self) -> NavigationReport {
        // Snapshot first: every navigator sees the crowd as it was
        self.occupancy = occupancy_system(&self.world, &self.graph);

        let report = navigation_system(
            &mut self.world,
            &self.graph,
            &self.config.wayfinding,
            Some(&self.occupancy),
            self.tick,
        );

        self.tick += 1;
        self.sim_time += 1.0 / self.config.wayfinding.reaction_rate;
        report
    }

    /// Run up to `max_ticks` ticks
    pub fn run(&mut self, max_ticks: u64) -> RunSummary {
        let mut ticks = 0;
        let mut failures = 0;
        let mut arrived = self.arrived_count();
        let pedestrians = self.pedestrian_count();

        while ticks < max_ticks {
            if self.config.stop_when_all_arrived && arrived == pedestrians {
                break;
            }
            let report = self.update();
            ticks += 1;
            failures += report.failures.len();
            arrived = report.arrived;
        }

        log::debug!(
            "run: {} ticks, {}/{} arrived, {} failures",
            ticks,
            arrived,
            pedestrians,
            failures
        );
        RunSummary {
            ticks,
            sim_time: self.sim_time,
            pedestrians,
            arrived: self.arrived_count(),
            failures,
        }
    }

    /// Ticks since start
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since start
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn pedestrian_count(&self) -> usize {
        self.world.query::<&Walker>().iter().count()
    }

    pub fn arrived_count(&self) -> usize {
        self.world
            .query::<&Navigator>()
            .iter()
            .filter(|(_, n)| n.0.state().is_arrived())
            .count()
    }

    pub fn state_of(&self, entity: Entity) -> Option<NavState> {
        self.world
            .get::<&Navigator>(entity)
            .ok()
            .map(|n| n.0.state())
    }

    pub fn position_of(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<&Walker>(entity).ok().map(|w| w.0.position)
    }

    pub fn room_of(&self, entity: Entity) -> Option<RoomId> {
        self.world
            .get::<&Navigator>(entity)
            .ok()
            .and_then(|n| n.0.current_room())
    }

    pub fn odometer_of(&self, entity: Entity) -> Option<Odometer> {
        self.world.get::<&Odometer>(entity).ok().map(|o| *o)
    }

    pub fn visits_of(&self, entity: Entity, room: RoomId) -> Option<u32> {
        self.world
            .get::<&Walker>(entity)
            .ok()
            .map(|w| w.0.memory.visits(room))
    }

    /// Recorded transitions, when `trace_transitions` is on
    pub fn trace_of(&self, entity: Entity) -> Option<Vec<NavState>> {
        self.world
            .get::<&Navigator>(entity)
            .ok()
            .and_then(|n| n.0.trace().map(|t| t.to_vec()))
    }

    pub fn label_of(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Label>(entity).ok().map(|l| l.0.clone())
    }

    /// Pedestrians in `room` as of the last tick's snapshot
    pub fn people_in_room(&self, room: RoomId) -> u32 {
        self.occupancy.count(room)
    }
}
