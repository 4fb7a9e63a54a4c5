use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables of the position simulator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Seconds of simulated movement per tick
    pub tick_interval_secs: u64,

    /// Travel time between two consecutive stops, also used to size fleets
    pub minutes_per_hop: u32,

    pub vehicle_capacity: u32,

    /// Lower bound of the passenger random walk (capped at capacity)
    pub min_passengers: u32,
    pub passenger_step: u32,

    pub min_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub speed_step_kmh: f64,

    pub max_early_minutes: i32,
    pub max_late_minutes: i32,
    pub delay_step_minutes: i32,

    pub max_vehicles_per_route: u32,

    /// Fixed seed for reproducible runs; entropy is used when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 10,
            minutes_per_hop: 2,
            vehicle_capacity: 60,
            min_passengers: 5,
            passenger_step: 6,
            min_speed_kmh: 18.0,
            max_speed_kmh: 32.0,
            speed_step_kmh: 2.0,
            max_early_minutes: 3,
            max_late_minutes: 10,
            delay_step_minutes: 1,
            max_vehicles_per_route: 4,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    pub(crate) fn speed_bounds(&self) -> (f64, f64) {
        let low = self.min_speed_kmh.min(self.max_speed_kmh).max(0.0);
        let high = self.min_speed_kmh.max(self.max_speed_kmh).max(low);
        (low, high)
    }

    pub(crate) fn delay_bounds(&self) -> (i32, i32) {
        (
            -self.max_early_minutes.saturating_abs(),
            self.max_late_minutes.saturating_abs(),
        )
    }

    pub(crate) fn passenger_floor(&self) -> u32 {
        self.min_passengers.min(self.vehicle_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"tickIntervalSecs": 5, "seed": 7}"#).unwrap();

        assert_eq!(config.tick_interval(), Duration::from_secs(5));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.vehicle_capacity, 60);
    }

    #[test]
    fn test_bounds_are_normalised() {
        let config = SimulationConfig {
            min_speed_kmh: 40.0,
            max_speed_kmh: 20.0,
            max_early_minutes: -3,
            vehicle_capacity: 3,
            tick_interval_secs: 0,
            ..SimulationConfig::default()
        };

        assert_eq!(config.speed_bounds(), (20.0, 40.0));
        assert_eq!(config.delay_bounds(), (-3, 10));
        assert_eq!(config.passenger_floor(), 3);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
