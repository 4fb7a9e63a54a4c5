use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::crowding::{classify, occupancy_percent, CrowdingLevel};
use crate::identifiers::{RouteId, VehicleId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    InService,
    OutOfService,
    Maintenance,
}

/// A simulated bus bound to one route for the lifetime of a run
#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub route_id: RouteId,
    pub location: Point,
    /// Index into the route's stop sequence of the next stop to reach
    pub next_stop_index: usize,
    pub passengers: u32,
    pub capacity: u32,
    pub speed_kmh: f64,
    /// Degrees clockwise from north
    pub heading: f64,
    /// Minutes behind schedule; negative when early
    pub delay_minutes: i32,
    pub last_updated: DateTime<Utc>,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn is_in_service(&self) -> bool {
        self.status == VehicleStatus::InService
    }

    pub fn crowding(&self) -> CrowdingLevel {
        classify(self.passengers, self.capacity)
    }

    pub fn occupancy_percent(&self) -> u8 {
        occupancy_percent(self.passengers, self.capacity)
    }
}
