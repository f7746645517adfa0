//! Wayfinding strategies: what to do next once the agent is in a new room.
//!
//! A strategy only answers one question, "final point or which door?", from a
//! read-only [`PlanContext`]. The navigation state machine owns everything
//! else (room caching, crossing points, visit registration), so composed
//! strategies share one context instead of copying state between them.
//!
//! | Variant | Knows |
//! |---------|-------|
//! | [`Pursuing`] | where the destination is, not how to get there |
//! | [`KnownDestinationReaching`] | a landmark route from the cognitive map |
//! | [`RouteFollowing`] | an explicit waypoint list |
//! | [`GoalOrientedExploring`] | nothing until a goal comes into sight |
//! | [`DestinationReaching`] | known and unknown goals together |

mod composite;
mod exploring;
mod known;
mod pursuing;
mod route;

pub use composite::DestinationReaching;
pub use exploring::{Explorer, GoalOrientedExploring, LeastVisitedExplorer, RandomExplorer};
pub use known::{extract_landmark_path, KnownDestinationReaching};
pub use pursuing::Pursuing;
pub use route::RouteFollowing;

use crate::cognitive::CognitiveMap;
use crate::config::WayfindingConfig;
use crate::error::NavError;
use crate::geometry::Vec2;
use crate::graph::{NavGraph, PassageId, Room, RoomId};
use crate::memory::VolatileMemory;
use crate::ranking::DoorRanking;
use crate::weighting::{choose_door, DoorCandidate, Occupancy, WeightInputs};

/// Outcome of planning in a room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Walk straight to this point inside the current room.
    Final(Vec2),
    /// Cross this outgoing door.
    Door(PassageId),
    /// Nothing viable; stop here.
    Stop,
}

/// Read-only view of one agent in one room, handed to strategies.
pub struct PlanContext<'a> {
    pub graph: &'a NavGraph,
    pub occupancy: Option<&'a Occupancy>,
    pub config: &'a WayfindingConfig,
    pub room: RoomId,
    pub previous_room: Option<RoomId>,
    pub position: Vec2,
    pub radius: f64,
    /// Floor area the agent occupies, for the congestion factor.
    pub footprint: f64,
    pub memory: &'a VolatileMemory,
    pub cognitive_map: &'a CognitiveMap,
}

impl<'a> PlanContext<'a> {
    pub fn current_room(&self) -> Result<&'a Room, NavError> {
        self.graph.room(self.room)
    }

    /// A point is in sight when it lies inside the current room.
    pub fn in_sight(&self, p: Vec2) -> bool {
        self.current_room().map(|r| r.contains(p)).unwrap_or(false)
    }

    /// Nearest of `points` that is in sight.
    pub fn nearest_in_sight(&self, points: &[Vec2]) -> Option<Vec2> {
        points
            .iter()
            .copied()
            .filter(|&p| self.in_sight(p))
            .min_by(|a, b| {
                a.distance_squared(&self.position)
                    .total_cmp(&b.distance_squared(&self.position))
            })
    }

    /// Candidates for every outgoing door, ranked when a ranking is given.
    pub fn candidates(&self, ranking: Option<&DoorRanking>) -> Result<Vec<DoorCandidate>, NavError> {
        DoorCandidate::collect(self.graph, self.room, self.position, self.radius, ranking)
    }

    /// Run the weighting model over `candidates` with `goals` as pull points.
    pub fn choose(
        &self,
        candidates: &[DoorCandidate],
        goals: &[Vec2],
    ) -> Result<Option<PassageId>, NavError> {
        let inputs = WeightInputs {
            graph: self.graph,
            memory: self.memory,
            config: self.config,
            goals,
            occupancy: self.occupancy,
            footprint: self.footprint,
        };
        choose_door(candidates, &inputs)
    }
}

/// The strategy a navigator runs, fixed until the destination changes.
#[derive(Debug)]
pub enum Strategy {
    Pursuing(Pursuing),
    KnownDestination(KnownDestinationReaching),
    RouteFollowing(RouteFollowing),
    GoalOrientedExploring(GoalOrientedExploring),
    DestinationReaching(DestinationReaching),
}

impl Strategy {
    /// Pick the next sub-goal from the current room.
    pub fn plan(&mut self, ctx: &PlanContext<'_>) -> Result<Decision, NavError> {
        let decision = match self {
            Strategy::Pursuing(s) => s.plan(ctx),
            Strategy::KnownDestination(s) => s.plan(ctx),
            Strategy::RouteFollowing(s) => s.plan(ctx),
            Strategy::GoalOrientedExploring(s) => s.plan(ctx),
            Strategy::DestinationReaching(s) => s.plan(ctx),
        }?;
        log::debug!(
            "{} in room #{}: {:?}",
            self.name(),
            ctx.room.0,
            decision
        );
        Ok(decision)
    }

    /// The agent turned up in a room nobody predicted. The state machine
    /// re-plans from that room right after this call.
    pub fn unexpected_room(&mut self, room: RoomId) {
        match self {
            Strategy::KnownDestination(s) => s.abandon_route(),
            Strategy::DestinationReaching(s) => s.unexpected_room(room),
            Strategy::Pursuing(_)
            | Strategy::RouteFollowing(_)
            | Strategy::GoalOrientedExploring(_) => {}
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Pursuing(_) => "pursuing",
            Strategy::KnownDestination(_) => "known-destination",
            Strategy::RouteFollowing(_) => "route-following",
            Strategy::GoalOrientedExploring(_) => "goal-oriented-exploring",
            Strategy::DestinationReaching(_) => "destination-reaching",
        }
    }
}

impl From<Pursuing> for Strategy {
    fn from(s: Pursuing) -> Self {
        Strategy::Pursuing(s)
    }
}

impl From<KnownDestinationReaching> for Strategy {
    fn from(s: KnownDestinationReaching) -> Self {
        Strategy::KnownDestination(s)
    }
}

impl From<RouteFollowing> for Strategy {
    fn from(s: RouteFollowing) -> Self {
        Strategy::RouteFollowing(s)
    }
}

impl From<GoalOrientedExploring> for Strategy {
    fn from(s: GoalOrientedExploring) -> Self {
        Strategy::GoalOrientedExploring(s)
    }
}

impl From<DestinationReaching> for Strategy {
    fn from(s: DestinationReaching) -> Self {
        Strategy::DestinationReaching(s)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::navigation::Pedestrian;

    #[test]
    fn test_context_footprint_drives_congestion() {
        let (g, [r0, r1, ..]) = corridor();
        let mut agent = Agent::new();
        agent.config.use_congestion = true;
        let mut crowded = Occupancy::new();
        crowded.set(r0, 50);

        let here = Vec2::new(15.0, 5.0);
        let mut ctx = agent.ctx(&g, r1, here);
        assert_eq!(ctx.footprint, Pedestrian::new(here, 0.25, 1.0).footprint());
        let cands = ctx.candidates(None).unwrap();
        let uncrowded = ctx.choose(&cands, &[]).unwrap();

        ctx.occupancy = Some(&crowded);
        let pick = ctx.choose(&cands, &[]).unwrap();
        assert!(pick.is_some());
        assert_ne!(pick, Some(door(&g, r1, r0)));

        // Without a footprint the crowd weighs nothing
        ctx.footprint = 0.0;
        assert_eq!(ctx.choose(&cands, &[]).unwrap(), uncrowded);
    }
}
