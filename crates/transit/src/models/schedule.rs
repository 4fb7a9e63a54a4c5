//! Daily service window and headway of a route.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// When a route runs and how often
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSchedule {
    pub first_departure: NaiveTime,
    pub last_departure: NaiveTime,
    /// Target minutes between consecutive buses
    pub headway_minutes: u32,
}

impl RouteSchedule {
    /// Whether `time` falls inside the service window (inclusive).
    ///
    /// A window whose last departure is earlier than its first one runs past
    /// midnight, e.g. 05:30 to 00:30.
    pub fn operates_at(&self, time: NaiveTime) -> bool {
        if self.first_departure <= self.last_departure {
            self.first_departure <= time && time <= self.last_departure
        } else {
            time >= self.first_departure || time <= self.last_departure
        }
    }
}
