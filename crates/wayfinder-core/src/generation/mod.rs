//! Generation - procedural room layouts and crowds for scenarios and benches

mod crowd;
mod layout;

pub use crowd::*;
pub use layout::*;
