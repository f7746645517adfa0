//! Route following: pursue an ordered list of waypoints one after another.

use std::collections::VecDeque;

use crate::error::NavError;
use crate::geometry::Vec2;

use super::pursuing::door_toward;
use super::{Decision, PlanContext};

/// Walks an explicit waypoint list. The last waypoint is the destination;
/// earlier ones count as passed once the agent stands in their room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFollowing {
    waypoints: VecDeque<Vec2>,
}

impl RouteFollowing {
    pub fn new(waypoints: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
        }
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Vec2> {
        self.waypoints.iter()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.waypoints.back().copied()
    }

    pub fn is_finished(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn plan(&mut self, ctx: &PlanContext<'_>) -> Result<Decision, NavError> {
        // Skip ahead to the farthest waypoint already in this room.
        if let Some(j) = self.waypoints.iter().rposition(|&w| ctx.in_sight(w)) {
            if j + 1 == self.waypoints.len() {
                let skipped = self.waypoints.drain(..j).count();
                if skipped > 0 {
                    log::debug!("route: skipped {} waypoints", skipped);
                }
                return Ok(Decision::Final(self.waypoints[0]));
            }
            self.waypoints.drain(..=j);
        }

        let Some(&next) = self.waypoints.front() else {
            return Ok(Decision::Stop);
        };
        Ok(match door_toward(ctx, next, &[next])? {
            Some(p) => Decision::Door(p),
            None => Decision::Stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{corridor, door, Agent};

    #[test]
    fn test_follows_waypoints_in_order() {
        let (g, [r0, r1, r2, r3]) = corridor();
        let agent = Agent::new();
        // Through r1 up into r3, then back down to r2
        let mut route = RouteFollowing::new([
            Vec2::new(15.0, 15.0),
            Vec2::new(25.0, 5.0),
        ]);
        let d = route.plan(&agent.ctx(&g, r0, Vec2::new(5.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Door(door(&g, r0, r1)));
        let d = route.plan(&agent.ctx(&g, r1, Vec2::new(11.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Door(door(&g, r1, r3)));
        // In r3: first waypoint passed, head for the second
        let d = route.plan(&agent.ctx(&g, r3, Vec2::new(15.0, 11.0))).unwrap();
        assert_eq!(d, Decision::Door(door(&g, r3, r1)));
        assert_eq!(route.remaining(), 1);
        let d = route.plan(&agent.ctx(&g, r1, Vec2::new(15.0, 9.0))).unwrap();
        assert_eq!(d, Decision::Door(door(&g, r1, r2)));
        let d = route.plan(&agent.ctx(&g, r2, Vec2::new(21.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Final(Vec2::new(25.0, 5.0)));
    }

    #[test]
    fn test_skips_ahead_when_later_waypoint_in_room() {
        let (g, [_, r1, ..]) = corridor();
        let agent = Agent::new();
        let mut route = RouteFollowing::new([
            Vec2::new(25.0, 5.0),
            Vec2::new(12.0, 2.0),
            Vec2::new(18.0, 8.0),
        ]);
        let d = route.plan(&agent.ctx(&g, r1, Vec2::new(15.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Final(Vec2::new(18.0, 8.0)));
        assert_eq!(route.remaining(), 1);
    }

    #[test]
    fn test_intermediate_waypoints_in_room_are_dropped() {
        let (g, [_, r1, r2, _]) = corridor();
        let agent = Agent::new();
        let mut route = RouteFollowing::new([
            Vec2::new(12.0, 2.0),
            Vec2::new(18.0, 8.0),
            Vec2::new(25.0, 5.0),
        ]);
        let d = route.plan(&agent.ctx(&g, r1, Vec2::new(15.0, 5.0))).unwrap();
        assert_eq!(d, Decision::Door(door(&g, r1, r2)));
        assert_eq!(route.remaining(), 1);
        assert_eq!(route.destination(), Some(Vec2::new(25.0, 5.0)));
    }

    #[test]
    fn test_empty_route_stops() {
        let (g, [r0, ..]) = corridor();
        let agent = Agent::new();
        let mut route = RouteFollowing::default();
        assert!(route.is_finished());
        assert_eq!(
            route.plan(&agent.ctx(&g, r0, Vec2::new(5.0, 5.0))).unwrap(),
            Decision::Stop
        );
    }
}
