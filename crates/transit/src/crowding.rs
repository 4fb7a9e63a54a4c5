//! Passenger load classification.

use serde::{Deserialize, Serialize};

/// Qualitative load of a vehicle, ordered from emptiest to fullest
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdingLevel {
    Comfortable,
    Moderate,
    Crowded,
    Full,
}

impl CrowdingLevel {
    /// Penalty used when ranking trips for comfort
    pub fn comfort_penalty(self) -> u32 {
        match self {
            Self::Comfortable => 0,
            Self::Moderate => 1,
            Self::Crowded => 2,
            Self::Full => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comfortable => "comfortable",
            Self::Moderate => "moderate",
            Self::Crowded => "crowded",
            Self::Full => "full",
        }
    }
}

/// Bucket an occupancy ratio. A vehicle without capacity counts as full.
pub fn classify(passengers: u32, capacity: u32) -> CrowdingLevel {
    if capacity == 0 {
        return CrowdingLevel::Full;
    }
    let ratio = f64::from(passengers) / f64::from(capacity);
    if ratio < 0.40 {
        CrowdingLevel::Comfortable
    } else if ratio < 0.70 {
        CrowdingLevel::Moderate
    } else if ratio < 0.90 {
        CrowdingLevel::Crowded
    } else {
        CrowdingLevel::Full
    }
}

/// Occupancy as a whole percentage, capped at 100
pub fn occupancy_percent(passengers: u32, capacity: u32) -> u8 {
    if capacity == 0 {
        return 100;
    }
    let percent = (f64::from(passengers) * 100.0 / f64::from(capacity)).round();
    percent.min(100.0) as u8
}
