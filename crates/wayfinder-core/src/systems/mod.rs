//! Systems - logic that operates on components

mod navigation;
mod occupancy;

pub use navigation::*;
pub use occupancy::*;
