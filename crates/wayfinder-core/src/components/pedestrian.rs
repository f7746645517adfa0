//! Components carried by every simulated pedestrian.

use serde::{Deserialize, Serialize};
use wayfinder_logic::navigation::{NavigationMachine, Pedestrian};

/// The agent handle: position, body, speed, memory and cognitive map.
#[derive(Debug, Clone)]
pub struct Walker(pub Pedestrian);

/// The navigation state machine steering this walker.
#[derive(Debug)]
pub struct Navigator(pub NavigationMachine);

/// Display name for reports and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label(pub String);

/// Running totals of how far and how long a walker has moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Odometer {
    /// Total distance walked.
    pub distance: f64,
    /// Ticks with a non-zero displacement.
    pub moving_ticks: u64,
    /// Tick at which the navigator first reported ARRIVED.
    pub arrived_at: Option<u64>,
}

impl Odometer {
    pub fn record(&mut self, step: f64) {
        if step > 0.0 {
            self.distance += step;
            self.moving_ticks += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odometer_ignores_standing_still() {
        let mut odo = Odometer::default();
        odo.record(0.5);
        odo.record(0.0);
        odo.record(0.25);
        assert_eq!(odo.distance, 0.75);
        assert_eq!(odo.moving_ticks, 2);
        assert_eq!(odo.arrived_at, None);
    }
}
