//! Door suitability ranking.
//!
//! For a room and a target point the pedestrian may not see, every outgoing
//! door is ranked by how short a walk from the target to the door would be
//! if it had to go *around* the room rather than through it.
//!
//! Algorithm:
//! 1. Nodes: the room's boundary vertices, the midpoint of every outgoing
//!    door, and the target.
//! 2. Walk each wall from vertex to vertex, threading the door midpoints on
//!    that wall in order; consecutive nodes are joined by their distance.
//! 3. Every boundary node with a clear line to the target (one that neither
//!    crosses a wall nor cuts through the room) is joined to the target.
//! 4. Single-source shortest paths from the target; doors sorted by path
//!    length get ranks 1..=N, rank 1 being the most suitable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use pathfinding::prelude::dijkstra_all;

use crate::error::NavError;
use crate::geometry::{from_cost, has_line_of_sight, to_cost, Vec2};
use crate::graph::{NavGraph, PassageId, RoomId};

/// A door and its place in the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedDoor {
    pub passage: PassageId,
    /// 1 = most suitable.
    pub rank: u32,
    /// Length of the around-the-room path from the target; infinite when
    /// the door could not be reached at all.
    pub path_length: f64,
}

/// Ranks for every outgoing door of one room toward one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoorRanking {
    doors: Vec<RankedDoor>,
}

impl DoorRanking {
    pub fn rank(&self, passage: PassageId) -> Option<u32> {
        self.find(passage).map(|d| d.rank)
    }

    pub fn path_length(&self, passage: PassageId) -> Option<f64> {
        self.find(passage).map(|d| d.path_length)
    }

    /// Doors from most to least suitable.
    pub fn ordered(&self) -> &[RankedDoor] {
        &self.doors
    }

    pub fn best(&self) -> Option<PassageId> {
        self.doors.first().map(|d| d.passage)
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    fn find(&self, passage: PassageId) -> Option<&RankedDoor> {
        self.doors.iter().find(|d| d.passage == passage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Vertex(usize),
    Door(usize),
    Target,
}

/// Rank the outgoing doors of `room` toward `target`.
pub fn rank_doors(graph: &NavGraph, room: RoomId, target: Vec2) -> Result<DoorRanking, NavError> {
    let polygon = &graph.room(room)?.polygon;
    let vertices = polygon.vertices();
    let n = vertices.len();

    let doors: Vec<(PassageId, Vec2)> = graph
        .outgoing(room)
        .iter()
        .map(|&pid| graph.passage(pid).map(|p| (pid, p.crossing.midpoint())))
        .collect::<Result<_, _>>()?;
    if doors.is_empty() {
        return Ok(DoorRanking::default());
    }

    let position = |node: Node| match node {
        Node::Vertex(i) => vertices[i],
        Node::Door(j) => doors[j].1,
        Node::Target => target,
    };

    // Door midpoints grouped by the wall they sit on, ordered along it.
    let mut on_side: Vec<Vec<(f64, usize)>> = vec![Vec::new(); n];
    let edges: Vec<_> = polygon.edges().collect();
    for (j, &(_, mid)) in doors.iter().enumerate() {
        let side = polygon
            .edge_containing(mid, 1e-6)
            .unwrap_or_else(|| polygon.nearest_edge(mid));
        on_side[side].push((edges[side].project(mid), j));
    }

    let mut adj: HashMap<Node, Vec<(Node, u64)>> = HashMap::new();
    let mut link = |a: Node, b: Node| {
        let cost = to_cost(position(a).distance(&position(b)));
        adj.entry(a).or_default().push((b, cost));
        adj.entry(b).or_default().push((a, cost));
    };

    for (i, side_doors) in on_side.iter_mut().enumerate() {
        side_doors.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let mut prev = Node::Vertex(i);
        for &(_, j) in side_doors.iter() {
            link(prev, Node::Door(j));
            prev = Node::Door(j);
        }
        link(prev, Node::Vertex((i + 1) % n));
    }

    let boundary_nodes = (0..n).map(Node::Vertex).chain((0..doors.len()).map(Node::Door));
    for node in boundary_nodes {
        if has_line_of_sight(polygon, position(node), target) {
            link(node, Node::Target);
        }
    }

    let reached = dijkstra_all(&Node::Target, |node| {
        adj.get(node).cloned().unwrap_or_default()
    });

    let mut scored: Vec<(Option<u64>, PassageId)> = doors
        .iter()
        .enumerate()
        .map(|(j, &(pid, mid))| {
            let cost = if mid.approx_eq(&target, crate::geometry::EPSILON) {
                Some(0)
            } else {
                reached.get(&Node::Door(j)).map(|&(_, c)| c)
            };
            (cost, pid)
        })
        .collect();
    // Reachable doors first, then by path length, then by id for stable ties.
    scored.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.1.cmp(&b.1)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });

    let doors: Vec<RankedDoor> = scored
        .into_iter()
        .enumerate()
        .map(|(idx, (cost, passage))| RankedDoor {
            passage,
            rank: idx as u32 + 1,
            path_length: cost.map(from_cost).unwrap_or(f64::INFINITY),
        })
        .collect();

    for d in &doors {
        log::trace!(
            "room #{} door #{} rank {} (path {:.3})",
            room.0,
            d.passage.0,
            d.rank,
            d.path_length
        );
    }

    Ok(DoorRanking { doors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;

    /// Hub room [0,10]² with a door on each wall leading to a side room.
    /// Returns (graph, hub, [east, north, west, south] passages).
    fn hub() -> (NavGraph, RoomId, [PassageId; 4]) {
        let mut g = NavGraph::new();
        let hub = g.add_rect_room(0.0, 0.0, 10.0, 10.0).unwrap();
        let east = g.add_rect_room(10.0, 0.0, 10.0, 10.0).unwrap();
        let north = g.add_rect_room(0.0, 10.0, 10.0, 10.0).unwrap();
        let west = g.add_rect_room(-10.0, 0.0, 10.0, 10.0).unwrap();
        let south = g.add_rect_room(0.0, -10.0, 10.0, 10.0).unwrap();
        let e = g
            .add_passage(hub, east, Segment::new(Vec2::new(10.0, 4.0), Vec2::new(10.0, 6.0)))
            .unwrap();
        let n = g
            .add_passage(hub, north, Segment::new(Vec2::new(4.0, 10.0), Vec2::new(6.0, 10.0)))
            .unwrap();
        let w = g
            .add_passage(hub, west, Segment::new(Vec2::new(0.0, 4.0), Vec2::new(0.0, 6.0)))
            .unwrap();
        let s = g
            .add_passage(hub, south, Segment::new(Vec2::new(4.0, 0.0), Vec2::new(6.0, 0.0)))
            .unwrap();
        (g, hub, [e, n, w, s])
    }

    #[test]
    fn test_target_east_ranks_east_door_first() {
        let (g, hub, [e, n, w, s]) = hub();
        let ranking = rank_doors(&g, hub, Vec2::new(30.0, 5.0)).unwrap();
        assert_eq!(ranking.rank(e), Some(1));
        assert_eq!(ranking.rank(w), Some(4));
        // North and south are symmetric; the tie goes to the lower id
        assert_eq!(ranking.rank(n), Some(2));
        assert_eq!(ranking.rank(s), Some(3));
        assert_eq!(ranking.best(), Some(e));
    }

    #[test]
    fn test_path_goes_around_room() {
        let (g, hub, [_, _, w, _]) = hub();
        let ranking = rank_doors(&g, hub, Vec2::new(30.0, 5.0)).unwrap();
        // West door: target → corner (10,0) → (0,0) → (0,5), never across the room
        let around = Vec2::new(30.0, 5.0).distance(&Vec2::new(10.0, 0.0)) + 10.0 + 5.0;
        let got = ranking.path_length(w).unwrap();
        assert!((got - around).abs() < 1e-3, "got {got}, expected {around}");
        assert!(got > 25.0, "straight line through the room would be 25");
    }

    #[test]
    fn test_ranks_form_permutation() {
        let (g, hub, _) = hub();
        for target in [
            Vec2::new(-30.0, 2.0),
            Vec2::new(5.0, 40.0),
            Vec2::new(12.0, -12.0),
            Vec2::new(5.0, 5.0),
        ] {
            let ranking = rank_doors(&g, hub, target).unwrap();
            let mut ranks: Vec<u32> = ranking.ordered().iter().map(|d| d.rank).collect();
            ranks.sort();
            assert_eq!(ranks, vec![1, 2, 3, 4]);
            // Monotone in path length
            for pair in ranking.ordered().windows(2) {
                assert!(pair[0].path_length <= pair[1].path_length);
            }
        }
    }

    #[test]
    fn test_room_without_doors() {
        let mut g = NavGraph::new();
        let r = g.add_rect_room(0.0, 0.0, 5.0, 5.0).unwrap();
        let ranking = rank_doors(&g, r, Vec2::new(50.0, 50.0)).unwrap();
        assert!(ranking.is_empty());
        assert_eq!(ranking.best(), None);
    }

    #[test]
    fn test_two_doors_on_same_wall() {
        let mut g = NavGraph::new();
        let r = g.add_rect_room(0.0, 0.0, 10.0, 10.0).unwrap();
        let other = g.add_rect_room(10.0, 0.0, 10.0, 10.0).unwrap();
        let low = g
            .add_passage(r, other, Segment::new(Vec2::new(10.0, 1.0), Vec2::new(10.0, 2.0)))
            .unwrap();
        let high = g
            .add_passage(r, other, Segment::new(Vec2::new(10.0, 8.0), Vec2::new(10.0, 9.0)))
            .unwrap();
        // Target up and to the right: the high door is closer around the wall
        let ranking = rank_doors(&g, r, Vec2::new(15.0, 20.0)).unwrap();
        assert_eq!(ranking.rank(high), Some(1));
        assert_eq!(ranking.rank(low), Some(2));
    }

    #[test]
    fn test_unknown_room() {
        let g = NavGraph::new();
        assert!(rank_doors(&g, RoomId(3), Vec2::ZERO).is_err());
    }
}
