use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveTime;
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::identifiers::StopId;

/// Where a trip starts or ends
#[derive(Clone, Debug, PartialEq)]
pub enum Place {
    Coordinate(Point),
    Stop(StopId),
}

/// What the traveller wants minimised
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimize {
    Time,
    Cost,
    Comfort,
    Environment,
    #[default]
    Balanced,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Preferences {
    pub optimize: Optimize,
    /// Upper bound on walking, per access leg and in total
    pub max_walk_meters: f64,
    pub avoid_crowded: bool,
    pub accessibility_required: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            optimize: Optimize::Balanced,
            max_walk_meters: 800.0,
            avoid_crowded: false,
            accessibility_required: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TripRequest {
    pub origin: Place,
    pub destination: Place,
    pub preferences: Preferences,
    /// Restrict to routes running at this time of day
    pub departure_time: Option<NaiveTime>,
}

impl TripRequest {
    pub fn new(origin: Place, destination: Place) -> Self {
        Self {
            origin,
            destination,
            preferences: Preferences::default(),
            departure_time: None,
        }
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Tunables of the trip composer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    pub walking_speed_kmh: f64,
    pub max_results: usize,
    /// Minutes a transfer is worth when scoring balanced trips
    pub transfer_penalty_minutes: f64,
    /// kg CO2 per passenger-km
    pub car_emission_factor: f64,
    pub bus_emission_factor: f64,
    pub time_weight: f64,
    pub cost_weight: f64,
    pub comfort_weight: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 4.8,
            max_results: 5,
            transfer_penalty_minutes: 5.0,
            car_emission_factor: 0.192,
            bus_emission_factor: 0.089,
            time_weight: 0.5,
            cost_weight: 0.3,
            comfort_weight: 0.2,
        }
    }
}

/// Time and cancellation limits for one planning request
#[derive(Clone, Debug, Default)]
pub struct PlanBudget {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl PlanBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancelled: None,
        }
    }

    /// Stop early once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = Some(flag);
        self
    }

    pub fn is_exhausted(&self) -> bool {
        let cancelled = self
            .cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        cancelled || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
