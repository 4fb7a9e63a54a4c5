use geo::Point;

use crate::crowding::CrowdingLevel;
use crate::identifiers::{RouteId, StopId, VehicleId};

/// One leg of a composed journey
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Walk {
        from: Point,
        to: Point,
        meters: f64,
        minutes: f64,
    },
    Wait {
        stop_id: StopId,
        minutes: f64,
        /// Vehicle expected to be boarded; `None` when only the timetable headway is known
        vehicle_id: Option<VehicleId>,
    },
    Ride {
        route_id: RouteId,
        from_stop: StopId,
        to_stop: StopId,
        hops: usize,
        minutes: f64,
        fare: f64,
        distance_km: f64,
        crowding: Option<CrowdingLevel>,
    },
}

impl Segment {
    pub fn minutes(&self) -> f64 {
        match self {
            Self::Walk { minutes, .. }
            | Self::Wait { minutes, .. }
            | Self::Ride { minutes, .. } => *minutes,
        }
    }

    pub fn is_ride(&self) -> bool {
        matches!(self, Self::Ride { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TripOption {
    pub segments: Vec<Segment>,
    pub total_minutes: f64,
    pub total_fare: f64,
    pub walking_meters: f64,
    pub transfers: usize,
    /// 0.0 to 1.0, higher is better
    pub score: f64,
    /// kg CO2 saved compared to driving the same distance
    pub co2_saved_kg: f64,
    pub(crate) comfort_penalty: u32,
    pub(crate) key: String,
}

impl TripOption {
    pub fn rides(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_ride())
    }

    /// Routes ridden, in order
    pub fn route_ids(&self) -> Vec<&RouteId> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Ride { route_id, .. } => Some(route_id),
                _ => None,
            })
            .collect()
    }

    /// Stop where the first bus is boarded
    pub fn boarding_stop(&self) -> Option<&StopId> {
        self.segments.iter().find_map(|s| match s {
            Segment::Ride { from_stop, .. } => Some(from_stop),
            _ => None,
        })
    }

    /// Worst crowding among the rides; unknown rides are ignored
    pub fn worst_crowding(&self) -> Option<CrowdingLevel> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Ride { crowding, .. } => *crowding,
                _ => None,
            })
            .max()
    }

    pub fn is_walk_only(&self) -> bool {
        self.rides().next().is_none()
    }
}

/// Ranked result of one planning request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripPlan {
    pub options: Vec<TripOption>,
    /// Enumeration hit its time budget; `options` holds what was found so far
    pub timed_out: bool,
}

impl TripPlan {
    /// No candidate satisfied the constraints
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
