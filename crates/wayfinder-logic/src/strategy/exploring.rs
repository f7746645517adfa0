//! Exploring: wander until a destination comes into sight.
//!
//! A destination the agent has never seen is only perceived once it stands
//! in the current room or in a room one outgoing door away. Until then the
//! choice of door is left to a pluggable [`Explorer`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::NavError;
use crate::geometry::Vec2;
use crate::graph::PassageId;

use super::{Decision, PlanContext};

/// Base exploration behaviour: pick a door when nothing better is known.
/// `Ok(None)` means there is nowhere to go.
pub trait Explorer: Send + Sync + std::fmt::Debug {
    fn explore(&mut self, ctx: &PlanContext<'_>) -> Result<Option<PassageId>, NavError>;
}

/// Weighting model without ranks: mostly a preference for unvisited rooms
/// and against known dead ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastVisitedExplorer;

impl Explorer for LeastVisitedExplorer {
    fn explore(&mut self, ctx: &PlanContext<'_>) -> Result<Option<PassageId>, NavError> {
        let candidates = ctx.candidates(None)?;
        ctx.choose(&candidates, &[])
    }
}

/// Uniformly random door, seeded for reproducible runs. Walking straight
/// back to the previous room is avoided while another door exists.
#[derive(Debug, Clone)]
pub struct RandomExplorer {
    rng: StdRng,
}

impl RandomExplorer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Explorer for RandomExplorer {
    fn explore(&mut self, ctx: &PlanContext<'_>) -> Result<Option<PassageId>, NavError> {
        let mut doors = Vec::new();
        for &pid in ctx.graph.outgoing(ctx.room) {
            doors.push((pid, ctx.graph.passage(pid)?.head));
        }
        if doors.is_empty() {
            return Ok(None);
        }
        let forward: Vec<PassageId> = doors
            .iter()
            .filter(|(_, head)| Some(*head) != ctx.previous_room)
            .map(|(pid, _)| *pid)
            .collect();
        let pool = if forward.is_empty() {
            doors.iter().map(|(pid, _)| *pid).collect()
        } else {
            forward
        };
        Ok(Some(pool[self.rng.gen_range(0..pool.len())]))
    }
}

/// Explores until one of the destinations is perceived, then heads for it.
#[derive(Debug)]
pub struct GoalOrientedExploring {
    destinations: Vec<Vec2>,
    explorer: Box<dyn Explorer>,
}

impl GoalOrientedExploring {
    pub fn new(destinations: impl IntoIterator<Item = Vec2>, explorer: Box<dyn Explorer>) -> Self {
        Self {
            destinations: destinations.into_iter().collect(),
            explorer,
        }
    }

    /// Explore with [`LeastVisitedExplorer`].
    pub fn least_visited(destinations: impl IntoIterator<Item = Vec2>) -> Self {
        Self::new(destinations, Box::new(LeastVisitedExplorer))
    }

    pub fn destinations(&self) -> &[Vec2] {
        &self.destinations
    }

    pub fn set_destinations(&mut self, destinations: Vec<Vec2>) {
        self.destinations = destinations;
    }

    /// Destinations in the current room or behind one of its doors.
    pub fn perceived(&self, ctx: &PlanContext<'_>) -> Vec<Vec2> {
        let graph = ctx.graph;
        let heads: Vec<_> = graph
            .outgoing(ctx.room)
            .iter()
            .filter_map(|&pid| graph.passage(pid).ok())
            .filter_map(|p| graph.room(p.head).ok())
            .collect();
        self.destinations
            .iter()
            .copied()
            .filter(|&d| ctx.in_sight(d) || heads.iter().any(|h| h.contains(d)))
            .collect()
    }

    pub fn perceives(&self, ctx: &PlanContext<'_>) -> bool {
        !self.perceived(ctx).is_empty()
    }

    pub fn plan(&mut self, ctx: &PlanContext<'_>) -> Result<Decision, NavError> {
        if let Some(d) = ctx.nearest_in_sight(&self.destinations) {
            return Ok(Decision::Final(d));
        }

        let seen = self.perceived(ctx);
        if !seen.is_empty() {
            let candidates: Vec<_> = ctx
                .candidates(None)?
                .into_iter()
                .filter(|c| {
                    ctx.graph
                        .room(c.head)
                        .map(|h| seen.iter().any(|&d| h.contains(d)))
                        .unwrap_or(false)
                })
                .collect();
            if let Some(p) = ctx.choose(&candidates, &seen)? {
                return Ok(Decision::Door(p));
            }
        }

        Ok(match self.explorer.explore(ctx)? {
            Some(p) => Decision::Door(p),
            None => Decision::Stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NavGraph;
    use crate::strategy::fixtures::{corridor, door, Agent};

    #[test]
    fn test_destination_in_room() {
        let (g, [_, r1, ..]) = corridor();
        let agent = Agent::new();
        let mut s = GoalOrientedExploring::least_visited([Vec2::new(12.0, 8.0)]);
        let d = s.plan(&agent.ctx(&g, r1, Vec2::new(15.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Final(Vec2::new(12.0, 8.0)));
    }

    #[test]
    fn test_destination_behind_door_is_perceived() {
        let (g, [r0, r1, r2, _]) = corridor();
        let agent = Agent::new();
        let mut s = GoalOrientedExploring::least_visited([Vec2::new(25.0, 5.0)]);
        let ctx = agent.ctx(&g, r1, Vec2::new(15.0, 5.0));
        assert!(s.perceives(&ctx));
        assert_eq!(s.plan(&ctx).unwrap(), Decision::Door(door(&g, r1, r2)));

        // Two rooms away is out of sight
        let ctx = agent.ctx(&g, r0, Vec2::new(5.0, 5.0));
        assert!(!s.perceives(&ctx));
    }

    #[test]
    fn test_least_visited_prefers_fresh_rooms() {
        let (g, [r0, r1, r2, r3]) = corridor();
        let mut agent = Agent::new();
        agent.memory.visit(r0);
        agent.memory.visit(r2);
        agent.memory.visit(r2);
        let mut s = GoalOrientedExploring::least_visited([Vec2::new(100.0, 100.0)]);
        let d = s.plan(&agent.ctx(&g, r1, Vec2::new(15.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Door(door(&g, r1, r3)));
    }

    #[test]
    fn test_random_explorer_avoids_going_back() {
        let (g, [r0, r1, ..]) = corridor();
        let agent = Agent::new();
        let mut explorer = RandomExplorer::new(7);
        for _ in 0..20 {
            let mut ctx = agent.ctx(&g, r1, Vec2::new(15.0, 5.0));
            ctx.previous_room = Some(r0);
            let p = explorer.explore(&ctx).unwrap().unwrap();
            assert_ne!(g.passage(p).unwrap().head, r0);
        }
        // A dead end leaves no choice but the way back
        let mut ctx = agent.ctx(&g, r0, Vec2::new(5.0, 5.0));
        ctx.previous_room = Some(r1);
        assert_eq!(explorer.explore(&ctx).unwrap(), Some(door(&g, r0, r1)));
    }

    #[test]
    fn test_random_explorer_is_reproducible() {
        let (g, [_, r1, ..]) = corridor();
        let agent = Agent::new();
        let ctx = agent.ctx(&g, r1, Vec2::new(15.0, 5.0));
        let mut a = RandomExplorer::new(42);
        let mut b = RandomExplorer::new(42);
        for _ in 0..10 {
            assert_eq!(a.explore(&ctx).unwrap(), b.explore(&ctx).unwrap());
        }
    }

    #[test]
    fn test_no_doors_stops() {
        let mut g = NavGraph::new();
        let r = g.add_rect_room(0.0, 0.0, 5.0, 5.0).unwrap();
        let agent = Agent::new();
        let mut s = GoalOrientedExploring::new([Vec2::new(50.0, 50.0)], Box::new(RandomExplorer::new(1)));
        assert_eq!(
            s.plan(&agent.ctx(&g, r, Vec2::new(1.0, 1.0))).unwrap(),
            Decision::Stop
        );
    }
}
