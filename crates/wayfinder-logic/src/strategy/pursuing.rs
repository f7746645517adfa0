//! Pursuing: the destination's position is known, the route is not.

use crate::error::NavError;
use crate::geometry::Vec2;
use crate::graph::PassageId;
use crate::ranking::rank_doors;

use super::{Decision, PlanContext};

/// Heads for a fixed point by local heuristic search.
#[derive(Debug, Clone, PartialEq)]
pub struct Pursuing {
    pub destination: Vec2,
}

impl Pursuing {
    pub fn new(destination: Vec2) -> Self {
        Self { destination }
    }

    pub fn plan(&mut self, ctx: &PlanContext<'_>) -> Result<Decision, NavError> {
        pursue(ctx, self.destination, &[self.destination])
    }
}

/// Final point if `target` is in sight, else the best-weighted door toward it.
pub(crate) fn pursue(
    ctx: &PlanContext<'_>,
    target: Vec2,
    goals: &[Vec2],
) -> Result<Decision, NavError> {
    if ctx.in_sight(target) {
        return Ok(Decision::Final(target));
    }
    Ok(match door_toward(ctx, target, goals)? {
        Some(p) => Decision::Door(p),
        None => Decision::Stop,
    })
}

/// Rank the current room's doors toward `target` and weigh them.
pub(crate) fn door_toward(
    ctx: &PlanContext<'_>,
    target: Vec2,
    goals: &[Vec2],
) -> Result<Option<PassageId>, NavError> {
    let ranking = rank_doors(ctx.graph, ctx.room, target)?;
    let candidates = ctx.candidates(Some(&ranking))?;
    ctx.choose(&candidates, goals)
}
