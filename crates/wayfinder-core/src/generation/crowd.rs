//! Crowd generation - random pedestrians with random destinations.

use rand::Rng;
use serde::{Deserialize, Serialize};
use wayfinder_logic::geometry::Vec2;
use wayfinder_logic::graph::{NavGraph, Room};
use wayfinder_logic::navigation::Pedestrian;

/// Shape of a generated crowd.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrowdSpec {
    pub count: usize,
    pub radius: f64,
    /// Walking speeds are drawn uniformly from `[min_speed, max_speed)`.
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for CrowdSpec {
    fn default() -> Self {
        Self {
            count: 100,
            radius: 0.25,
            min_speed: 1.0,
            max_speed: 1.6,
        }
    }
}

/// A pedestrian to spawn and the point it should walk to.
#[derive(Debug, Clone)]
pub struct CrowdMember {
    pub label: String,
    pub pedestrian: Pedestrian,
    pub destination: Vec2,
}

/// A point inside `room`, at least `margin` from its bounding box edges when
/// possible. Falls back to the centroid.
pub fn random_point_in_room<R: Rng>(room: &Room, margin: f64, rng: &mut R) -> Vec2 {
    let vertices = room.polygon.vertices();
    let (mut min, mut max) = (room.centroid, room.centroid);
    for v in vertices {
        min = Vec2::new(min.x.min(v.x), min.y.min(v.y));
        max = Vec2::new(max.x.max(v.x), max.y.max(v.y));
    }
    let (x0, x1) = (min.x + margin, max.x - margin);
    let (y0, y1) = (min.y + margin, max.y - margin);
    if x1 <= x0 || y1 <= y0 {
        return room.centroid;
    }
    for _ in 0..32 {
        let p = Vec2::new(rng.gen_range(x0..x1), rng.gen_range(y0..y1));
        if room.contains(p) {
            return p;
        }
    }
    room.centroid
}

/// Pedestrians scattered over random rooms, each bound for a random point in
/// a different room (when the graph has more than one).
pub fn generate_crowd<R: Rng>(graph: &NavGraph, spec: &CrowdSpec, rng: &mut R) -> Vec<CrowdMember> {
    let rooms = graph.rooms();
    if rooms.is_empty() {
        return Vec::new();
    }

    (0..spec.count)
        .map(|i| {
            let origin = rng.gen_range(0..rooms.len());
            let mut target = rng.gen_range(0..rooms.len());
            if rooms.len() > 1 {
                while target == origin {
                    target = rng.gen_range(0..rooms.len());
                }
            }
            let speed = if spec.max_speed > spec.min_speed {
                rng.gen_range(spec.min_speed..spec.max_speed)
            } else {
                spec.min_speed
            };
            let start = random_point_in_room(&rooms[origin], spec.radius, rng);
            CrowdMember {
                label: format!("walker-{}", i),
                pedestrian: Pedestrian::new(start, spec.radius, speed),
                destination: random_point_in_room(&rooms[target], spec.radius, rng),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GridLayout;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_crowd_members_start_and_end_in_different_rooms() {
        let g = GridLayout::new(3, 3, 10.0).open_grid().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let crowd = generate_crowd(
            &g,
            &CrowdSpec {
                count: 50,
                ..Default::default()
            },
            &mut rng,
        );
        assert_eq!(crowd.len(), 50);
        for m in &crowd {
            let from = g.room_at(m.pedestrian.position).unwrap();
            let to = g.room_at(m.destination).unwrap();
            assert_ne!(from, to);
            assert!(m.pedestrian.speed >= 1.0 && m.pedestrian.speed < 1.6);
        }
    }

    #[test]
    fn test_point_respects_margin() {
        let g = GridLayout::new(1, 1, 4.0).rooms().unwrap();
        let room = &g.rooms()[0];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = random_point_in_room(room, 1.0, &mut rng);
            assert!(p.x >= 1.0 && p.x <= 3.0);
            assert!(p.y >= 1.0 && p.y <= 3.0);
        }
        // Margin too wide for the room
        assert_eq!(random_point_in_room(room, 3.0, &mut rng), room.centroid);
    }

    #[test]
    fn test_empty_graph_gives_empty_crowd() {
        let g = NavGraph::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_crowd(&g, &CrowdSpec::default(), &mut rng).is_empty());
    }
}
