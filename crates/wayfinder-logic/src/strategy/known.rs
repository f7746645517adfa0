//! Known-destination reaching: route through the cognitive map.
//!
//! For each destination the agent knows, a landmark path is pulled from the
//! cognitive map and turned into a waypoint route (landmark centroids, then
//! the destination). The path is only worth taking when its first landmark is
//! strictly closer than the destination itself; otherwise plain pursuing is
//! at least as good. The legs between waypoints are walked by pursuing.

use crate::cognitive::{CognitiveMap, LandmarkId};
use crate::error::NavError;
use crate::geometry::Vec2;
use crate::graph::RoomId;

use super::pursuing::pursue;
use super::route::RouteFollowing;
use super::{Decision, PlanContext};

/// Landmark path from the agent at `position` toward `destination`, or an
/// empty path when the map offers nothing better than walking straight at it.
pub fn extract_landmark_path(
    map: &CognitiveMap,
    position: Vec2,
    destination: Vec2,
) -> Vec<LandmarkId> {
    let (Some(start), Some(end)) = (
        map.nearest_landmark(position),
        map.nearest_landmark(destination),
    ) else {
        return Vec::new();
    };
    let Ok(first) = map.landmark(start) else {
        return Vec::new();
    };
    if first.centroid.distance(&position) >= destination.distance(&position) {
        return Vec::new();
    }
    map.shortest_path(start, end).unwrap_or_default()
}

fn route_length(position: Vec2, waypoints: &[Vec2]) -> f64 {
    let mut total = 0.0;
    let mut at = position;
    for &w in waypoints {
        total += at.distance(&w);
        at = w;
    }
    total
}

/// Reaches destinations the agent already knows about.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownDestinationReaching {
    destinations: Vec<Vec2>,
    route: Option<RouteFollowing>,
}

impl KnownDestinationReaching {
    pub fn new(destinations: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            destinations: destinations.into_iter().collect(),
            route: None,
        }
    }

    pub fn destinations(&self) -> &[Vec2] {
        &self.destinations
    }

    /// Replace the destination set; the active route is dropped if the set
    /// actually changed.
    pub fn set_destinations(&mut self, destinations: Vec<Vec2>) {
        if destinations != self.destinations {
            self.destinations = destinations;
            self.route = None;
        }
    }

    pub fn has_route(&self) -> bool {
        self.route.as_ref().map(|r| !r.is_finished()).unwrap_or(false)
    }

    pub fn route(&self) -> Option<&RouteFollowing> {
        self.route.as_ref()
    }

    /// Forget the planned route; the next plan starts from scratch.
    pub fn abandon_route(&mut self) {
        self.route = None;
    }

    pub fn plan(&mut self, ctx: &PlanContext<'_>) -> Result<Decision, NavError> {
        if self.destinations.is_empty() {
            return Ok(Decision::Stop);
        }
        if let Some(d) = ctx.nearest_in_sight(&self.destinations) {
            self.route = None;
            return Ok(Decision::Final(d));
        }

        if !self.has_route() {
            self.route = self.build_route(ctx);
        }
        if let Some(route) = self.route.as_mut() {
            let decision = route.plan(ctx)?;
            if decision != Decision::Stop {
                return Ok(decision);
            }
            self.route = None;
        }

        // No usable landmark route: pursue the nearest destination directly.
        let nearest = self.nearest_destination(ctx.position);
        pursue(ctx, nearest, &self.destinations)
    }

    /// Route of the known destination with the shortest landmark walk.
    fn build_route(&self, ctx: &PlanContext<'_>) -> Option<RouteFollowing> {
        let map = ctx.cognitive_map;
        self.destinations
            .iter()
            .filter_map(|&dest| {
                let path = extract_landmark_path(map, ctx.position, dest);
                if path.is_empty() {
                    return None;
                }
                let mut waypoints: Vec<Vec2> = path
                    .iter()
                    .filter_map(|&id| map.landmark(id).ok())
                    .map(|l| l.centroid)
                    .collect();
                waypoints.push(dest);
                Some((route_length(ctx.position, &waypoints), waypoints))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(len, waypoints)| {
                log::debug!(
                    "known route with {} waypoints ({:.1} long)",
                    waypoints.len(),
                    len
                );
                RouteFollowing::new(waypoints)
            })
    }

    fn nearest_destination(&self, position: Vec2) -> Vec2 {
        self.destinations
            .iter()
            .copied()
            .min_by(|a, b| {
                a.distance_squared(&position)
                    .total_cmp(&b.distance_squared(&position))
            })
            .unwrap_or(position)
    }

    pub(crate) fn unexpected_room(&mut self, room: RoomId) {
        log::debug!("known route dropped after unexpected room #{}", room.0);
        self.abandon_route();
    }
}
