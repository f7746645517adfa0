//! Tunable constants of the wayfinding core.
//!
//! `WayfindingConfig` is plain data with sensible defaults; scenario loaders
//! deserialize it, the core only reads it.

use serde::{Deserialize, Serialize};

use crate::error::NavError;

/// Weighting and timing parameters shared by every navigator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WayfindingConfig {
    /// Navigation reactions per simulated second. The per-tick walking
    /// budget is `speed / reaction_rate`.
    pub reaction_rate: f64,
    /// Multiplier (< 1) for doors leading into a room that holds a goal.
    pub destination_factor: f64,
    /// Multiplier (> 1) for doors leading into a known dead end.
    pub impasse_factor: f64,
    /// Penalize doors by how crowded their head room is.
    pub use_congestion: bool,
    /// Distance under which the final point counts as reached.
    pub arrival_epsilon: f64,
    /// How far past the door line the exit crossing point sits, in agent
    /// diameters.
    pub crossing_depth: f64,
    /// Default for `NavigationMachine::set_strategy`.
    pub clear_memory_on_new_destination: bool,
    /// Upper bound on chained state transitions within one update.
    pub max_transitions_per_tick: u32,
}

impl Default for WayfindingConfig {
    fn default() -> Self {
        Self {
            reaction_rate: 10.0,
            destination_factor: 0.1,
            impasse_factor: 10.0,
            use_congestion: false,
            arrival_epsilon: 1e-6,
            crossing_depth: 2.0,
            clear_memory_on_new_destination: true,
            max_transitions_per_tick: 8,
        }
    }
}

impl WayfindingConfig {
    /// Check every field is in its valid range.
    pub fn validate(&self) -> Result<(), NavError> {
        if !(self.reaction_rate > 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "reaction_rate must be positive, got {}",
                self.reaction_rate
            )));
        }
        if !(self.destination_factor > 0.0 && self.destination_factor < 1.0) {
            return Err(NavError::InvalidConfig(format!(
                "destination_factor must be in (0, 1), got {}",
                self.destination_factor
            )));
        }
        if !(self.impasse_factor > 1.0) {
            return Err(NavError::InvalidConfig(format!(
                "impasse_factor must be greater than 1, got {}",
                self.impasse_factor
            )));
        }
        if !(self.arrival_epsilon >= 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "arrival_epsilon must be non-negative, got {}",
                self.arrival_epsilon
            )));
        }
        if !(self.crossing_depth > 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "crossing_depth must be positive, got {}",
                self.crossing_depth
            )));
        }
        if self.max_transitions_per_tick == 0 {
            return Err(NavError::InvalidConfig(
                "max_transitions_per_tick must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Distance an agent walking at `speed` covers in one reaction.
    pub fn walking_budget(&self, speed: f64) -> f64 {
        speed / self.reaction_rate
    }
}
