//! Navigation graph: convex rooms joined by directed passages.
//!
//! The graph is owned by the environment and is read-only to the navigators.
//! Passages are directed; a geometrically two-way door is two passages
//! (see [`NavGraph::connect_both`]). Each passage carries the door segment on
//! the shared wall, from which the entry/exit crossing points are derived.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::NavError;
use crate::geometry::{ConvexPolygon, Segment, Vec2};

/// Index of a room in its [`NavGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub u32);

/// Index of a passage in its [`NavGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PassageId(pub u32);

/// A convex navigable region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub polygon: ConvexPolygon,
    pub centroid: Vec2,
}

impl Room {
    pub fn contains(&self, p: Vec2) -> bool {
        self.polygon.contains(p)
    }

    pub fn area(&self) -> f64 {
        self.polygon.area()
    }
}

/// A directed door from `tail` into `head`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    pub tail: RoomId,
    pub head: RoomId,
    /// Door opening on the wall shared by both rooms.
    pub crossing: Segment,
}

/// Entry and exit points for walking through a passage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossingPoints {
    /// On the door line, the point to walk to first.
    pub entry: Vec2,
    /// Inside the head room, the point to walk to second.
    pub exit: Vec2,
}

impl CrossingPoints {
    pub fn coincide(&self) -> bool {
        self.entry.approx_eq(&self.exit, crate::geometry::EPSILON)
    }
}

/// Rooms and passages with outgoing/incoming adjacency.
#[derive(Debug, Clone, Default)]
pub struct NavGraph {
    rooms: Vec<Room>,
    passages: Vec<Passage>,
    /// room → passages leaving it
    outgoing: HashMap<RoomId, Vec<PassageId>>,
    /// room → passages entering it
    incoming: HashMap<RoomId, Vec<PassageId>>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a room and return its id.
    pub fn add_room(&mut self, polygon: ConvexPolygon) -> RoomId {
        let id = RoomId(self.rooms.len() as u32);
        let centroid = polygon.centroid();
        self.rooms.push(Room {
            id,
            polygon,
            centroid,
        });
        self.outgoing.entry(id).or_default();
        self.incoming.entry(id).or_default();
        id
    }

    /// Add an axis-aligned rectangular room.
    pub fn add_rect_room(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<RoomId, NavError> {
        let polygon = ConvexPolygon::rect(x, y, width, height)
            .ok_or(NavError::DegenerateRoom(RoomId(self.rooms.len() as u32)))?;
        Ok(self.add_room(polygon))
    }

    /// Add a one-way passage from `tail` to `head` through `crossing`.
    pub fn add_passage(
        &mut self,
        tail: RoomId,
        head: RoomId,
        crossing: Segment,
    ) -> Result<PassageId, NavError> {
        self.room(tail)?;
        self.room(head)?;
        let id = PassageId(self.passages.len() as u32);
        self.passages.push(Passage {
            id,
            tail,
            head,
            crossing,
        });
        self.outgoing.entry(tail).or_default().push(id);
        self.incoming.entry(head).or_default().push(id);
        Ok(id)
    }

    /// Add the two directed passages of a door usable both ways.
    pub fn connect_both(
        &mut self,
        a: RoomId,
        b: RoomId,
        crossing: Segment,
    ) -> Result<(PassageId, PassageId), NavError> {
        let ab = self.add_passage(a, b, crossing)?;
        let ba = self.add_passage(b, a, crossing)?;
        Ok((ab, ba))
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, NavError> {
        self.rooms
            .get(id.0 as usize)
            .ok_or(NavError::UnknownRoom(id))
    }

    pub fn passage(&self, id: PassageId) -> Result<&Passage, NavError> {
        self.passages
            .get(id.0 as usize)
            .ok_or(NavError::UnknownPassage(id))
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Number of rooms in the graph.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Passages leaving `room`, in insertion order.
    pub fn outgoing(&self, room: RoomId) -> &[PassageId] {
        self.outgoing.get(&room).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Passages entering `room`, in insertion order.
    pub fn incoming(&self, room: RoomId) -> &[PassageId] {
        self.incoming.get(&room).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Rooms sharing a passage with `room` in either direction.
    pub fn adjacent_rooms(&self, room: RoomId) -> Vec<RoomId> {
        let mut out: Vec<RoomId> = self
            .outgoing(room)
            .iter()
            .chain(self.incoming(room))
            .filter_map(|&pid| self.passage(pid).ok())
            .map(|p| if p.tail == room { p.head } else { p.tail })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// First room (by id) containing `p`.
    pub fn room_at(&self, p: Vec2) -> Option<RoomId> {
        self.rooms.iter().find(|r| r.contains(p)).map(|r| r.id)
    }

    /// Locate `p`, trying the likely candidates before a full scan:
    /// `preferred` rooms in order, then neighbours of the first preferred
    /// room, then every room.
    pub fn locate(&self, p: Vec2, preferred: &[Option<RoomId>]) -> Option<RoomId> {
        for id in preferred.iter().flatten() {
            if self.room(*id).map(|r| r.contains(p)).unwrap_or(false) {
                return Some(*id);
            }
        }
        if let Some(origin) = preferred.iter().flatten().next() {
            for id in self.adjacent_rooms(*origin) {
                if self.room(id).map(|r| r.contains(p)).unwrap_or(false) {
                    return Some(id);
                }
            }
        }
        self.room_at(p)
    }

    /// Crossing points for walking through `passage` from `approach`.
    ///
    /// The entry point is the point of the door opening nearest to
    /// `approach`, kept `clearance` away from the door jambs. The exit point
    /// lies `depth` further along the door normal, on the head room's side.
    pub fn crossing_points(
        &self,
        passage: PassageId,
        approach: Vec2,
        clearance: f64,
        depth: f64,
    ) -> Result<CrossingPoints, NavError> {
        let p = self.passage(passage)?;
        let head = self.room(p.head)?;
        let door = p.crossing;

        let len = door.length();
        let entry = if len > 2.0 * clearance && len > 0.0 {
            let t0 = clearance / len;
            let opening = Segment::new(door.point_at(t0), door.point_at(1.0 - t0));
            opening.closest_point(approach)
        } else {
            door.midpoint()
        };

        let mut normal = (door.b - door.a).perp().normalize();
        if normal.dot(&(head.centroid - entry)) < 0.0 {
            normal = normal * -1.0;
        }
        let exit = entry + normal * depth;
        Ok(CrossingPoints { entry, exit })
    }
}
