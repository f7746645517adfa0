//! Cognitive map: the landmarks an agent has perceived and how they connect.
//!
//! The map is built incrementally by the perception layer and only queried
//! here. Its builder keeps it a spanning forest, so between two landmarks
//! there is normally a single simple path. When that does not hold, path
//! selection prefers the most detailed of the shortest paths (most edges).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use pathfinding::prelude::astar_bag_collect;

use crate::error::NavError;
use crate::geometry::{to_cost, ConvexPolygon, Vec2, COST_SCALE};
use crate::graph::NavGraph;

/// Index of a landmark in its [`CognitiveMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandmarkId(pub u32);

/// A perceived region of the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmark {
    pub id: LandmarkId,
    pub region: ConvexPolygon,
    pub centroid: Vec2,
}

impl Landmark {
    pub fn contains(&self, p: Vec2) -> bool {
        self.region.contains(p)
    }
}

/// Undirected landmark graph; edges carry no payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CognitiveMap {
    landmarks: Vec<Landmark>,
    edges: HashMap<LandmarkId, Vec<LandmarkId>>,
}

impl CognitiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_landmark(&mut self, region: ConvexPolygon) -> LandmarkId {
        let id = LandmarkId(self.landmarks.len() as u32);
        let centroid = region.centroid();
        self.landmarks.push(Landmark {
            id,
            region,
            centroid,
        });
        self.edges.entry(id).or_default();
        id
    }

    /// Link two landmarks. Linking twice is a no-op.
    pub fn connect(&mut self, a: LandmarkId, b: LandmarkId) -> Result<(), NavError> {
        self.landmark(a)?;
        self.landmark(b)?;
        if a == b || self.neighbors(a).contains(&b) {
            return Ok(());
        }
        self.edges.entry(a).or_default().push(b);
        self.edges.entry(b).or_default().push(a);
        Ok(())
    }

    pub fn landmark(&self, id: LandmarkId) -> Result<&Landmark, NavError> {
        self.landmarks
            .get(id.0 as usize)
            .ok_or(NavError::UnknownLandmark(id))
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn neighbors(&self, id: LandmarkId) -> &[LandmarkId] {
        self.edges.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn landmark_containing(&self, p: Vec2) -> Option<LandmarkId> {
        self.landmarks.iter().find(|l| l.contains(p)).map(|l| l.id)
    }

    /// Landmark containing `p`, else the one whose centroid is nearest.
    pub fn nearest_landmark(&self, p: Vec2) -> Option<LandmarkId> {
        self.landmark_containing(p).or_else(|| {
            self.landmarks
                .iter()
                .min_by(|a, b| {
                    a.centroid
                        .distance_squared(&p)
                        .total_cmp(&b.centroid.distance_squared(&p))
                })
                .map(|l| l.id)
        })
    }

    /// True when the map has no cycles (every component is a tree).
    pub fn is_forest(&self) -> bool {
        let edge_count: usize = self.edges.values().map(|v| v.len()).sum::<usize>() / 2;
        edge_count + self.component_count() == self.landmarks.len()
    }

    fn component_count(&self) -> usize {
        let mut seen = vec![false; self.landmarks.len()];
        let mut components = 0;
        for start in 0..self.landmarks.len() {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![LandmarkId(start as u32)];
            seen[start] = true;
            while let Some(id) = stack.pop() {
                for &next in self.neighbors(id) {
                    if !seen[next.0 as usize] {
                        seen[next.0 as usize] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }

    /// Shortest landmark path (by centroid distance) from `from` to `to`,
    /// both ends included. Among equally short paths the one with the most
    /// landmarks wins, then the lowest ids.
    pub fn shortest_path(&self, from: LandmarkId, to: LandmarkId) -> Option<Vec<LandmarkId>> {
        self.landmark(from).ok()?;
        let goal = self.landmark(to).ok()?.centroid;
        if from == to {
            return Some(vec![from]);
        }

        let (paths, _cost) = astar_bag_collect(
            &from,
            |&id| {
                let here = self.landmarks[id.0 as usize].centroid;
                self.neighbors(id)
                    .iter()
                    .map(move |&n| (n, to_cost(here.distance(&self.landmarks[n.0 as usize].centroid))))
                    .collect::<Vec<_>>()
            },
            |&id| self.remaining_cost_bound(id, goal),
            |&id| id == to,
        )?;

        if paths.len() > 1 {
            log::debug!(
                "{} equally short landmark paths between #{} and #{}; map is not a tree",
                paths.len(),
                from.0,
                to.0
            );
        }

        paths
            .into_iter()
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
    }

    /// Lower bound on the search cost from `id` to `goal`. Each edge cost is
    /// rounded on its own, so a path can undercut the straight line by up to
    /// half a unit per edge; a simple path has fewer edges than landmarks.
    fn remaining_cost_bound(&self, id: LandmarkId, goal: Vec2) -> u64 {
        let d = self.landmarks[id.0 as usize].centroid.distance(&goal);
        ((d.max(0.0) * COST_SCALE).floor() as u64).saturating_sub(self.landmarks.len() as u64)
    }

    /// Whether `point` counts as a known destination: some landmark lies in
    /// the room containing it or in a room adjacent to that one.
    pub fn is_known(&self, point: Vec2, graph: &NavGraph) -> bool {
        let Some(room) = graph.room_at(point) else {
            return false;
        };
        let mut rooms = graph.adjacent_rooms(room);
        rooms.push(room);
        self.landmarks.iter().any(|l| {
            rooms
                .iter()
                .filter_map(|&r| graph.room(r).ok())
                .any(|r| r.contains(l.centroid))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;

    fn rect(x: f64, y: f64) -> ConvexPolygon {
        ConvexPolygon::rect(x, y, 10.0, 10.0).unwrap()
    }

    /// a - b - c in a row along x
    fn chain() -> (CognitiveMap, [LandmarkId; 3]) {
        let mut map = CognitiveMap::new();
        let a = map.add_landmark(rect(0.0, 0.0));
        let b = map.add_landmark(rect(10.0, 0.0));
        let c = map.add_landmark(rect(20.0, 0.0));
        map.connect(a, b).unwrap();
        map.connect(b, c).unwrap();
        (map, [a, b, c])
    }

    #[test]
    fn test_connect_is_idempotent() {
        let (mut map, [a, b, _]) = chain();
        map.connect(b, a).unwrap();
        assert_eq!(map.neighbors(a), &[b]);
        assert!(map.connect(a, LandmarkId(42)).is_err());
    }

    #[test]
    fn test_shortest_path_chain() {
        let (map, [a, b, c]) = chain();
        assert_eq!(map.shortest_path(a, c), Some(vec![a, b, c]));
        assert_eq!(map.shortest_path(c, a), Some(vec![c, b, a]));
        assert_eq!(map.shortest_path(b, b), Some(vec![b]));
    }

    #[test]
    fn test_shortest_path_disconnected() {
        let (mut map, [a, _, _]) = chain();
        let island = map.add_landmark(rect(100.0, 100.0));
        assert_eq!(map.shortest_path(a, island), None);
        assert_eq!(map.shortest_path(a, LandmarkId(99)), None);
        assert!(map.is_forest());
    }

    #[test]
    fn test_empty_map_has_no_paths() {
        let map = CognitiveMap::new();
        assert!(map.is_empty());
        assert_eq!(map.nearest_landmark(Vec2::ZERO), None);
        assert_eq!(map.shortest_path(LandmarkId(0), LandmarkId(0)), None);
    }

    #[test]
    fn test_cycle_prefers_most_detailed_path() {
        // a and d at opposite ends; a-d direct edge is exactly as long as
        // a-m-d through a collinear midpoint landmark.
        let mut map = CognitiveMap::new();
        let a = map.add_landmark(rect(0.0, 0.0));
        let m = map.add_landmark(rect(10.0, 0.0));
        let d = map.add_landmark(rect(20.0, 0.0));
        map.connect(a, d).unwrap();
        map.connect(a, m).unwrap();
        map.connect(m, d).unwrap();
        assert!(!map.is_forest());
        assert_eq!(map.shortest_path(a, d), Some(vec![a, m, d]));
    }

    #[test]
    fn test_cost_bound_under_rounded_edges() {
        // Landmarks 0.4 µm apart: every edge rounds to cost 0, while the
        // straight line from the first to the last is 1.6 µm.
        let mut map = CognitiveMap::new();
        let ids: Vec<LandmarkId> = (0..5)
            .map(|i| {
                let region = ConvexPolygon::rect(i as f64 * 0.4e-6, 0.0, 1.0, 1.0).unwrap();
                map.add_landmark(region)
            })
            .collect();
        for pair in ids.windows(2) {
            map.connect(pair[0], pair[1]).unwrap();
        }
        map.connect(ids[0], ids[4]).unwrap();

        let goal = map.landmark(ids[4]).unwrap().centroid;
        for &id in &ids {
            assert_eq!(map.remaining_cost_bound(id, goal), 0);
        }
        assert_eq!(map.shortest_path(ids[0], ids[4]), Some(ids.clone()));
    }

    #[test]
    fn test_nearest_landmark() {
        let (map, [a, _, c]) = chain();
        assert_eq!(map.nearest_landmark(Vec2::new(2.0, 2.0)), Some(a));
        assert_eq!(map.nearest_landmark(Vec2::new(40.0, 5.0)), Some(c));
    }

    #[test]
    fn test_is_known() {
        let mut graph = NavGraph::new();
        let r0 = graph.add_rect_room(0.0, 0.0, 10.0, 10.0).unwrap();
        let r1 = graph.add_rect_room(10.0, 0.0, 10.0, 10.0).unwrap();
        let r2 = graph.add_rect_room(20.0, 0.0, 10.0, 10.0).unwrap();
        let door = |x: f64| Segment::new(Vec2::new(x, 4.0), Vec2::new(x, 6.0));
        graph.connect_both(r0, r1, door(10.0)).unwrap();
        graph.connect_both(r1, r2, door(20.0)).unwrap();

        let mut map = CognitiveMap::new();
        map.add_landmark(rect(0.0, 0.0));

        // Same room and adjacent room are known, two rooms away is not
        assert!(map.is_known(Vec2::new(5.0, 5.0), &graph));
        assert!(map.is_known(Vec2::new(15.0, 5.0), &graph));
        assert!(!map.is_known(Vec2::new(25.0, 5.0), &graph));
        assert!(!map.is_known(Vec2::new(50.0, 5.0), &graph));
    }
}
