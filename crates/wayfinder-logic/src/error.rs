//! Errors raised by the wayfinding core.
//!
//! Only precondition violations are errors. "No viable door", "no cognitive
//! map path" and "destination not in sight" are ordinary outcomes and are
//! modelled with `Option` / `Decision::Stop` instead.

use crate::cognitive::LandmarkId;
use crate::graph::{PassageId, RoomId};

/// Errors that can occur while building graphs or updating a navigator
#[derive(Debug, Clone, PartialEq)]
pub enum NavError {
    /// A room id that the navigation graph does not know.
    UnknownRoom(RoomId),
    /// A passage id that the navigation graph does not know.
    UnknownPassage(PassageId),
    /// A landmark id that the cognitive map does not know.
    UnknownLandmark(LandmarkId),
    /// A strategy asked to cross a door that does not leave the current room.
    DoorNotInRoom { passage: PassageId, room: RoomId },
    /// A strategy asked to walk to a final point outside the current room.
    FinalOutsideRoom { room: RoomId },
    /// Room polygon with fewer than three vertices or zero area.
    DegenerateRoom(RoomId),
    /// Configuration value out of range.
    InvalidConfig(String),
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavError::UnknownRoom(id) => write!(f, "unknown room #{}", id.0),
            NavError::UnknownPassage(id) => write!(f, "unknown passage #{}", id.0),
            NavError::UnknownLandmark(id) => write!(f, "unknown landmark #{}", id.0),
            NavError::DoorNotInRoom { passage, room } => write!(
                f,
                "passage #{} is not an outgoing door of room #{}",
                passage.0, room.0
            ),
            NavError::FinalOutsideRoom { room } => {
                write!(f, "final point lies outside current room #{}", room.0)
            }
            NavError::DegenerateRoom(id) => write!(f, "room #{} has a degenerate polygon", id.0),
            NavError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for NavError {}
