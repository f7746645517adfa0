//! Component definitions for the ECS simulation.
//!
//! Components are pure data attached to pedestrian entities. The wayfinding
//! itself lives in `wayfinder-logic`; systems only shuttle data between the
//! world and the navigation machines.

mod pedestrian;

pub use pedestrian::*;
