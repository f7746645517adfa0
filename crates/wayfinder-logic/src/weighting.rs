//! Door weighting model.
//!
//! Each candidate door gets a scalar weight from its head room H and its
//! suitability rank r; the lightest door wins:
//!
//! ```text
//! weight = 2^visits(H) × (1 − 0.5^r) × destination(H) × impasse(H) [× congestion(H)]
//! ```
//!
//! Ties go to the door whose entry crossing point is nearest the agent.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::WayfindingConfig;
use crate::error::NavError;
use crate::geometry::Vec2;
use crate::graph::{NavGraph, PassageId, RoomId};
use crate::memory::VolatileMemory;
use crate::ranking::DoorRanking;

/// Snapshot of how many agents stand in each room, taken once per tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Occupancy {
    counts: HashMap<RoomId, u32>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, room: RoomId) {
        *self.counts.entry(room).or_insert(0) += 1;
    }

    pub fn set(&mut self, room: RoomId, count: u32) {
        self.counts.insert(room, count);
    }

    pub fn count(&self, room: RoomId) -> u32 {
        self.counts.get(&room).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// One door under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorCandidate {
    pub passage: PassageId,
    pub head: RoomId,
    /// Strategy-specific suitability rank, `None` when none applies.
    pub rank: Option<u32>,
    /// Distance from the agent to the door's entry crossing point.
    pub crossing_distance: f64,
}

impl DoorCandidate {
    /// Candidates for every outgoing door of `room`, ranked by `ranking`
    /// when one is given.
    pub fn collect(
        graph: &NavGraph,
        room: RoomId,
        position: Vec2,
        clearance: f64,
        ranking: Option<&DoorRanking>,
    ) -> Result<Vec<Self>, NavError> {
        graph
            .outgoing(room)
            .iter()
            .map(|&pid| {
                let passage = graph.passage(pid)?;
                let crossing = graph.crossing_points(pid, position, clearance, 0.0)?;
                Ok(Self {
                    passage: pid,
                    head: passage.head,
                    rank: ranking.and_then(|r| r.rank(pid)),
                    crossing_distance: position.distance(&crossing.entry),
                })
            })
            .collect()
    }
}

/// Everything the weighting model reads besides the candidate itself.
pub struct WeightInputs<'a> {
    pub graph: &'a NavGraph,
    pub memory: &'a VolatileMemory,
    pub config: &'a WayfindingConfig,
    /// Points the agent is trying to reach.
    pub goals: &'a [Vec2],
    pub occupancy: Option<&'a Occupancy>,
    /// Floor area one agent takes up.
    pub footprint: f64,
}

/// Doubles with every recorded visit.
pub fn memory_factor(visits: u32) -> f64 {
    2f64.powi(visits.min(1024) as i32)
}

/// `1 − 0.5^r`; neutral (1.0) without a rank.
pub fn suitability_factor(rank: Option<u32>) -> f64 {
    match rank {
        Some(r) => 1.0 - 0.5f64.powi(r.min(1024) as i32),
        None => 1.0,
    }
}

/// `1 + footprint × occupants / area`.
pub fn congestion_factor(footprint: f64, occupants: u32, area: f64) -> f64 {
    if area <= 0.0 {
        return 1.0;
    }
    1.0 + footprint * occupants as f64 / area
}

fn destination_factor(head: RoomId, inputs: &WeightInputs<'_>) -> Result<f64, NavError> {
    let room = inputs.graph.room(head)?;
    if inputs.goals.iter().any(|&g| room.contains(g)) {
        Ok(inputs.config.destination_factor)
    } else {
        Ok(1.0)
    }
}

fn impasse_factor(head: RoomId, inputs: &WeightInputs<'_>) -> f64 {
    if inputs.memory.knows(head) && inputs.graph.outgoing(head).len() <= 1 {
        inputs.config.impasse_factor
    } else {
        1.0
    }
}

/// Weight of one candidate door; lower is better.
pub fn door_weight(candidate: &DoorCandidate, inputs: &WeightInputs<'_>) -> Result<f64, NavError> {
    let head = candidate.head;
    let mut weight = memory_factor(inputs.memory.visits(head))
        * suitability_factor(candidate.rank)
        * destination_factor(head, inputs)?
        * impasse_factor(head, inputs);

    if inputs.config.use_congestion {
        if let Some(occupancy) = inputs.occupancy {
            let area = inputs.graph.room(head)?.area();
            weight *= congestion_factor(inputs.footprint, occupancy.count(head), area);
        }
    }

    log::trace!(
        "door #{} → room #{}: rank {:?}, weight {:.4}",
        candidate.passage.0,
        head.0,
        candidate.rank,
        weight
    );
    Ok(weight)
}

/// The lightest candidate, ties broken by crossing distance then id.
/// `None` when there are no candidates.
pub fn choose_door(
    candidates: &[DoorCandidate],
    inputs: &WeightInputs<'_>,
) -> Result<Option<PassageId>, NavError> {
    let mut best: Option<(f64, &DoorCandidate)> = None;
    for c in candidates {
        let w = door_weight(c, inputs)?;
        let better = match best {
            None => true,
            Some((bw, b)) => {
                w < bw
                    || (w == bw
                        && (c.crossing_distance < b.crossing_distance
                            || (c.crossing_distance == b.crossing_distance
                                && c.passage < b.passage)))
            }
        };
        if better {
            best = Some((w, c));
        }
    }
    Ok(best.map(|(_, c)| c.passage))
}
