//! Volatile memory: how often an agent has entered each room.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::RoomId;

/// Per-agent room visit counters.
///
/// Incremented once per room entry by the navigation state machine, read by
/// the weighting model. Never expires on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VolatileMemory {
    visits: HashMap<RoomId, u32>,
}

impl VolatileMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entry into `room`; returns the new count.
    pub fn visit(&mut self, room: RoomId) -> u32 {
        let count = self.visits.entry(room).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn visits(&self, room: RoomId) -> u32 {
        self.visits.get(&room).copied().unwrap_or(0)
    }

    /// A room is known once it has been entered, and stays known across
    /// [`reset`](Self::reset).
    pub fn knows(&self, room: RoomId) -> bool {
        self.visits.contains_key(&room)
    }

    /// Zero every counter but remember which rooms were seen.
    pub fn reset(&mut self) {
        for count in self.visits.values_mut() {
            *count = 0;
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.visits.clear();
    }

    /// Every room entered since the last [`clear`](Self::clear).
    pub fn known_rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.visits.keys().copied()
    }

    /// No room known at all.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_counts() {
        let mut mem = VolatileMemory::new();
        assert_eq!(mem.visits(RoomId(1)), 0);
        assert_eq!(mem.visit(RoomId(1)), 1);
        assert_eq!(mem.visit(RoomId(1)), 2);
        assert_eq!(mem.visit(RoomId(2)), 1);
        assert!(mem.knows(RoomId(2)));
        assert!(!mem.knows(RoomId(3)));
    }

    #[test]
    fn test_reset_zeroes_counts_keeps_rooms() {
        let mut mem = VolatileMemory::new();
        mem.visit(RoomId(1));
        mem.visit(RoomId(1));
        mem.visit(RoomId(2));
        mem.reset();
        assert_eq!(mem.visits(RoomId(1)), 0);
        assert_eq!(mem.visits(RoomId(2)), 0);
        assert!(mem.knows(RoomId(1)));
        assert!(mem.knows(RoomId(2)));
        assert!(!mem.knows(RoomId(3)));
        assert!(!mem.is_empty());
        assert_eq!(mem.known_rooms().count(), 2);
        assert_eq!(mem.visit(RoomId(1)), 1);
    }

    #[test]
    fn test_clear() {
        let mut mem = VolatileMemory::new();
        mem.visit(RoomId(4));
        mem.clear();
        assert!(mem.is_empty());
        assert!(!mem.knows(RoomId(4)));
        assert_eq!(mem.visit(RoomId(4)), 1);
    }
}
