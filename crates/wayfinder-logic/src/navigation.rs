//! Navigation state machine.
//!
//! One [`NavigationMachine`] per pedestrian. Each call to
//! [`NavigationMachine::update`] refreshes the cached position and room, runs
//! as many state transitions as the situation allows (bounded by
//! `max_transitions_per_tick`), and returns the displacement for this tick.
//!
//! ```text
//! START ──located──▶ NEW_ROOM ──final──▶ MOVING_TO_FINAL ──reached──▶ ARRIVED
//!   │                 │   ▲ ╲
//!   └─not located──▶ ARRIVED  ╲──door──▶ MOVING_TO_DOOR ──reached──▶ CROSSING_DOOR
//!                     │   └──────────────────────────────────────────────┘
//!                     └─stop──▶ ARRIVED
//! ```
//!
//! The strategy is only consulted in NEW_ROOM. Movement toward the current
//! sub-destination happens every tick and never overshoots it.

use serde::{Deserialize, Serialize};

use crate::cognitive::CognitiveMap;
use crate::config::WayfindingConfig;
use crate::error::NavError;
use crate::geometry::{Vec2, EPSILON};
use crate::graph::{CrossingPoints, NavGraph, PassageId, RoomId};
use crate::memory::VolatileMemory;
use crate::strategy::{Decision, PlanContext, Strategy};
use crate::weighting::Occupancy;

// ── State ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavState {
    Start,
    NewRoom,
    MovingToDoor,
    CrossingDoor,
    MovingToFinal,
    Arrived,
}

impl NavState {
    pub fn name(&self) -> &'static str {
        match self {
            NavState::Start => "START",
            NavState::NewRoom => "NEW_ROOM",
            NavState::MovingToDoor => "MOVING_TO_DOOR",
            NavState::CrossingDoor => "CROSSING_DOOR",
            NavState::MovingToFinal => "MOVING_TO_FINAL",
            NavState::Arrived => "ARRIVED",
        }
    }

    pub fn is_arrived(&self) -> bool {
        matches!(self, NavState::Arrived)
    }
}

impl std::fmt::Display for NavState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Agent handle ───────────────────────────────────────────────────────

/// What the state machine needs to know about the agent it steers.
#[derive(Debug, Clone)]
pub struct Pedestrian {
    pub position: Vec2,
    /// Radius of the agent's circular footprint.
    pub radius: f64,
    /// Walking speed, distance per simulated second.
    pub speed: f64,
    pub memory: VolatileMemory,
    pub cognitive_map: CognitiveMap,
}

impl Pedestrian {
    pub fn new(position: Vec2, radius: f64, speed: f64) -> Self {
        Self {
            position,
            radius,
            speed,
            memory: VolatileMemory::new(),
            cognitive_map: CognitiveMap::new(),
        }
    }

    pub fn with_cognitive_map(mut self, map: CognitiveMap) -> Self {
        self.cognitive_map = map;
        self
    }

    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    pub fn footprint(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }
}

/// Read-only world for one tick: the graph, the configuration and, when
/// congestion is in play, a room occupancy snapshot.
#[derive(Clone, Copy)]
pub struct Surroundings<'a> {
    pub graph: &'a NavGraph,
    pub config: &'a WayfindingConfig,
    pub occupancy: Option<&'a Occupancy>,
}

impl<'a> Surroundings<'a> {
    pub fn new(graph: &'a NavGraph, config: &'a WayfindingConfig) -> Self {
        Self {
            graph,
            config,
            occupancy: None,
        }
    }

    pub fn with_occupancy(mut self, occupancy: &'a Occupancy) -> Self {
        self.occupancy = Some(occupancy);
        self
    }
}

// ── Machine ────────────────────────────────────────────────────────────

/// Cached navigation facts, updated in place every tick.
#[derive(Debug, Clone)]
struct NavContext {
    state: NavState,
    position: Vec2,
    /// Room the agent is planning from. Kept while the agent stands on a
    /// door line or briefly outside every room.
    current_room: Option<RoomId>,
    previous_room: Option<RoomId>,
    /// Head room of the door being crossed.
    expected_room: Option<RoomId>,
    crossing: Option<CrossingPoints>,
    target_door: Option<PassageId>,
    final_point: Option<Vec2>,
    /// Room whose entry was last counted in volatile memory.
    last_registered: Option<RoomId>,
}

impl NavContext {
    fn new() -> Self {
        Self {
            state: NavState::Start,
            position: Vec2::ZERO,
            current_room: None,
            previous_room: None,
            expected_room: None,
            crossing: None,
            target_door: None,
            final_point: None,
            last_registered: None,
        }
    }

    fn clear_goal(&mut self) {
        self.expected_room = None;
        self.crossing = None;
        self.target_door = None;
        self.final_point = None;
    }
}

/// Per-pedestrian navigation state machine.
#[derive(Debug)]
pub struct NavigationMachine {
    ctx: NavContext,
    strategy: Strategy,
    trace: Option<Vec<NavState>>,
}

impl NavigationMachine {
    pub fn new(strategy: impl Into<Strategy>) -> Self {
        Self {
            ctx: NavContext::new(),
            strategy: strategy.into(),
            trace: None,
        }
    }

    /// Record every state entered, starting with START.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(vec![self.ctx.state]);
        self
    }

    pub fn state(&self) -> NavState {
        self.ctx.state
    }

    pub fn position(&self) -> Vec2 {
        self.ctx.position
    }

    pub fn current_room(&self) -> Option<RoomId> {
        self.ctx.current_room
    }

    pub fn previous_room(&self) -> Option<RoomId> {
        self.ctx.previous_room
    }

    pub fn expected_room(&self) -> Option<RoomId> {
        self.ctx.expected_room
    }

    pub fn crossing(&self) -> Option<CrossingPoints> {
        self.ctx.crossing
    }

    pub fn target_door(&self) -> Option<PassageId> {
        self.ctx.target_door
    }

    pub fn final_point(&self) -> Option<Vec2> {
        self.ctx.final_point
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn trace(&self) -> Option<&[NavState]> {
        self.trace.as_deref()
    }

    /// The point the agent is walking toward right now.
    pub fn sub_destination(&self) -> Option<Vec2> {
        match self.ctx.state {
            NavState::MovingToDoor => self.ctx.crossing.map(|c| c.entry),
            NavState::CrossingDoor => self.ctx.crossing.map(|c| c.exit),
            NavState::MovingToFinal => self.ctx.final_point,
            NavState::Start | NavState::NewRoom | NavState::Arrived => None,
        }
    }

    /// Swap in a new strategy, e.g. for a new destination. Planning restarts
    /// from the current room (or from START if it was never located).
    pub fn set_strategy(
        &mut self,
        strategy: impl Into<Strategy>,
        clear_memory: bool,
        pedestrian: &mut Pedestrian,
    ) {
        self.strategy = strategy.into();
        self.ctx.clear_goal();
        if clear_memory {
            pedestrian.memory.clear();
            self.ctx.last_registered = None;
        }
        let next = if self.ctx.current_room.is_some() {
            NavState::NewRoom
        } else {
            NavState::Start
        };
        self.enter(next);
    }

    /// One navigation reaction. Returns the displacement to apply this tick.
    pub fn update(
        &mut self,
        pedestrian: &mut Pedestrian,
        env: &Surroundings<'_>,
    ) -> Result<Vec2, NavError> {
        self.refresh(pedestrian, env);

        for _ in 0..env.config.max_transitions_per_tick {
            match self.step(pedestrian, env)? {
                Some(next) => self.enter(next),
                None => break,
            }
        }

        let budget = env.config.walking_budget(pedestrian.speed);
        Ok(match self.sub_destination() {
            Some(target) => (target - self.ctx.position).clamp_length(budget),
            None => Vec2::ZERO,
        })
    }

    fn enter(&mut self, next: NavState) {
        if next != self.ctx.state {
            log::debug!("{} → {}", self.ctx.state, next);
        }
        self.ctx.state = next;
        if let Some(trace) = self.trace.as_mut() {
            trace.push(next);
        }
    }

    /// Cache the position and check the agent is where it should be.
    fn refresh(&mut self, pedestrian: &Pedestrian, env: &Surroundings<'_>) {
        self.ctx.position = pedestrian.position;
        if matches!(self.ctx.state, NavState::Start | NavState::Arrived) {
            return;
        }

        let preferred = [self.ctx.current_room, self.ctx.expected_room];
        let Some(found) = env.graph.locate(self.ctx.position, &preferred) else {
            return;
        };
        if preferred.contains(&Some(found)) {
            return;
        }

        log::warn!(
            "unexpected room #{} (planned from {:?}, expected {:?}) in {}",
            found.0,
            self.ctx.current_room,
            self.ctx.expected_room,
            self.ctx.state
        );
        self.strategy.unexpected_room(found);
        self.ctx.previous_room = self.ctx.current_room;
        self.ctx.current_room = Some(found);
        self.ctx.clear_goal();
        self.enter(NavState::NewRoom);
    }

    /// Evaluate the current state once. `None` means stay put.
    fn step(
        &mut self,
        pedestrian: &mut Pedestrian,
        env: &Surroundings<'_>,
    ) -> Result<Option<NavState>, NavError> {
        let reach = pedestrian.diameter().max(EPSILON);
        let position = self.ctx.position;

        match self.ctx.state {
            NavState::Start => {
                self.ctx.current_room = env.graph.locate(position, &[]);
                Ok(Some(match self.ctx.current_room {
                    Some(_) => NavState::NewRoom,
                    None => {
                        log::debug!("cannot locate agent at {:?}", position);
                        NavState::Arrived
                    }
                }))
            }

            NavState::NewRoom => {
                let Some(room) = self.ctx.current_room else {
                    return Ok(Some(NavState::Arrived));
                };
                if self.ctx.last_registered != Some(room) {
                    pedestrian.memory.visit(room);
                    self.ctx.last_registered = Some(room);
                }
                let plan_ctx = PlanContext {
                    graph: env.graph,
                    occupancy: env.occupancy,
                    config: env.config,
                    room,
                    previous_room: self.ctx.previous_room,
                    position,
                    radius: pedestrian.radius,
                    footprint: pedestrian.footprint(),
                    memory: &pedestrian.memory,
                    cognitive_map: &pedestrian.cognitive_map,
                };
                let decision = self.strategy.plan(&plan_ctx)?;
                self.apply(decision, room, pedestrian, env).map(Some)
            }

            NavState::MovingToDoor => {
                let Some(door) = self.ctx.target_door else {
                    return Ok(Some(NavState::NewRoom));
                };
                let crossing = env.graph.crossing_points(
                    door,
                    position,
                    pedestrian.radius,
                    env.config.crossing_depth * pedestrian.diameter(),
                )?;
                self.ctx.crossing = Some(crossing);
                if position.distance(&crossing.entry) <= reach {
                    Ok(Some(NavState::CrossingDoor))
                } else {
                    Ok(None)
                }
            }

            NavState::CrossingDoor => {
                let Some(crossing) = self.ctx.crossing else {
                    return Ok(Some(NavState::NewRoom));
                };
                if crossing.coincide() || position.distance(&crossing.exit) <= reach {
                    self.ctx.previous_room = self.ctx.current_room;
                    self.ctx.current_room = self.ctx.expected_room.or(self.ctx.current_room);
                    self.ctx.clear_goal();
                    Ok(Some(NavState::NewRoom))
                } else {
                    Ok(None)
                }
            }

            NavState::MovingToFinal => match self.ctx.final_point {
                Some(p) if position.distance(&p) > env.config.arrival_epsilon => Ok(None),
                _ => Ok(Some(NavState::Arrived)),
            },

            NavState::Arrived => Ok(None),
        }
    }

    /// Turn a strategy decision into the next state, checking it is legal
    /// from `room`.
    fn apply(
        &mut self,
        decision: Decision,
        room: RoomId,
        pedestrian: &Pedestrian,
        env: &Surroundings<'_>,
    ) -> Result<NavState, NavError> {
        self.ctx.clear_goal();
        match decision {
            Decision::Final(p) => {
                if !env.graph.room(room)?.contains(p) {
                    return Err(NavError::FinalOutsideRoom { room });
                }
                self.ctx.final_point = Some(p);
                Ok(NavState::MovingToFinal)
            }
            Decision::Door(passage) => {
                if !env.graph.outgoing(room).contains(&passage) {
                    return Err(NavError::DoorNotInRoom { passage, room });
                }
                let head = env.graph.passage(passage)?.head;
                self.ctx.crossing = Some(env.graph.crossing_points(
                    passage,
                    self.ctx.position,
                    pedestrian.radius,
                    env.config.crossing_depth * pedestrian.diameter(),
                )?);
                self.ctx.target_door = Some(passage);
                self.ctx.expected_room = Some(head);
                Ok(NavState::MovingToDoor)
            }
            Decision::Stop => Ok(NavState::Arrived),
        }
    }
}
