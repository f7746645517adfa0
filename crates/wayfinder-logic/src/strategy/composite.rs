//! Destination reaching: known routes and exploration under one roof.
//!
//! Destinations the cognitive map knows are reached by
//! [`KnownDestinationReaching`], the rest by [`GoalOrientedExploring`]. A
//! destination that comes into perception always wins over a planned route.
//! Both halves plan from the same [`PlanContext`], and visits are recorded by
//! the state machine alone, so switching between them never double-counts.

use crate::error::NavError;
use crate::geometry::Vec2;
use crate::graph::RoomId;

use super::{Decision, Explorer, GoalOrientedExploring, KnownDestinationReaching, PlanContext};

#[derive(Debug)]
pub struct DestinationReaching {
    destinations: Vec<Vec2>,
    known: KnownDestinationReaching,
    exploring: GoalOrientedExploring,
}

impl DestinationReaching {
    pub fn new(destinations: impl IntoIterator<Item = Vec2>, explorer: Box<dyn Explorer>) -> Self {
        let destinations: Vec<Vec2> = destinations.into_iter().collect();
        Self {
            known: KnownDestinationReaching::new(Vec::new()),
            exploring: GoalOrientedExploring::new(destinations.clone(), explorer),
            destinations,
        }
    }

    pub fn destinations(&self) -> &[Vec2] {
        &self.destinations
    }

    pub fn set_destinations(&mut self, destinations: Vec<Vec2>) {
        self.exploring.set_destinations(destinations.clone());
        self.known.abandon_route();
        self.destinations = destinations;
    }

    pub fn known(&self) -> &KnownDestinationReaching {
        &self.known
    }

    pub fn plan(&mut self, ctx: &PlanContext<'_>) -> Result<Decision, NavError> {
        if self.exploring.perceives(ctx) {
            if self.known.has_route() {
                log::debug!("destination perceived in room #{}, dropping known route", ctx.room.0);
            }
            self.known.abandon_route();
            return self.exploring.plan(ctx);
        }

        let known: Vec<Vec2> = self
            .destinations
            .iter()
            .copied()
            .filter(|&d| ctx.cognitive_map.is_known(d, ctx.graph))
            .collect();
        if known.is_empty() {
            return self.exploring.plan(ctx);
        }
        self.known.set_destinations(known);
        self.known.plan(ctx)
    }

    pub(crate) fn unexpected_room(&mut self, room: RoomId) {
        self.known.unexpected_room(room);
    }
}
