//! Wayfinder Core - Pedestrian Simulation Engine
//!
//! An ECS-based driver for the `wayfinder-logic` navigation core. It stands
//! in for the outside world the core expects: a scheduler that fires one
//! navigation reaction per pedestrian per tick, and a (trivial) physics
//! step that applies the returned displacement.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Pedestrians
//! - **Components**: `Walker` (agent handle), `Navigator` (state machine),
//!   `Label`, `Odometer`
//! - **Systems**: occupancy snapshot, then navigation
//!
//! # Example
//!
//! ```rust,no_run
//! use wayfinder_core::prelude::*;
//! use wayfinder_core::generation::GridLayout;
//! use wayfinder_logic::geometry::Vec2;
//! use wayfinder_logic::navigation::Pedestrian;
//! use wayfinder_logic::strategy::Pursuing;
//!
//! let layout = GridLayout::new(3, 3, 10.0);
//! let graph = layout.open_grid().unwrap();
//! let mut engine = SimulationEngine::new(graph, EngineConfig::default()).unwrap();
//!
//! let walker = Pedestrian::new(layout.centre((0, 0)), 0.25, 1.4);
//! engine.spawn_pedestrian("ada", walker, Pursuing::new(layout.centre((2, 2))));
//!
//! let summary = engine.run(10_000);
//! assert!(summary.all_arrived());
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod generation;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{EngineConfig, RunSummary, SimulationEngine};
    pub use crate::error::EngineError;
}
