use addis_transit::crowding::CrowdingLevel;
use addis_transit::identifiers::StopId;
use addis_transit::planner::{Optimize, Place, Preferences, Segment, TripOption, TripPlan};
use chrono::NaiveTime;
use geo::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateDto {
    pub lat: f64,
    pub lng: f64,
}

impl From<Point> for CoordinateDto {
    fn from(point: Point) -> Self {
        Self {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

impl From<CoordinateDto> for Point {
    fn from(coordinate: CoordinateDto) -> Self {
        Point::new(coordinate.lng, coordinate.lat)
    }
}

/// Either `{"stopId": "..."}` or `{"lat": .., "lng": ..}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceDto {
    Stop {
        #[serde(rename = "stopId")]
        stop_id: String,
    },
    Coordinate(CoordinateDto),
}

impl From<PlaceDto> for Place {
    fn from(place: PlaceDto) -> Self {
        match place {
            PlaceDto::Stop { stop_id } => Place::Stop(StopId::new(stop_id)),
            PlaceDto::Coordinate(coordinate) => Place::Coordinate(coordinate.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreferencesDto {
    pub optimize: Optimize,
    pub max_walk_meters: f64,
    pub avoid_crowded: bool,
    pub accessibility_required: bool,
}

impl Default for PreferencesDto {
    fn default() -> Self {
        Preferences::default().into()
    }
}

impl From<Preferences> for PreferencesDto {
    fn from(p: Preferences) -> Self {
        Self {
            optimize: p.optimize,
            max_walk_meters: p.max_walk_meters,
            avoid_crowded: p.avoid_crowded,
            accessibility_required: p.accessibility_required,
        }
    }
}

impl From<PreferencesDto> for Preferences {
    fn from(p: PreferencesDto) -> Self {
        Self {
            optimize: p.optimize,
            max_walk_meters: p.max_walk_meters,
            avoid_crowded: p.avoid_crowded,
            accessibility_required: p.accessibility_required,
        }
    }
}

/// Body of `POST /trip-plan`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanRequest {
    pub origin: PlaceDto,
    pub destination: PlaceDto,
    #[serde(default)]
    pub preferences: PreferencesDto,
    #[serde(default)]
    pub departure_time: Option<NaiveTime>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentDto {
    Walk {
        from: CoordinateDto,
        to: CoordinateDto,
        meters: f64,
        minutes: f64,
    },
    Wait {
        #[serde(rename = "stopId")]
        stop_id: String,
        minutes: f64,
        #[serde(rename = "vehicleId")]
        vehicle_id: Option<String>,
    },
    Ride {
        #[serde(rename = "routeId")]
        route_id: String,
        #[serde(rename = "fromStop")]
        from_stop: String,
        #[serde(rename = "toStop")]
        to_stop: String,
        hops: usize,
        minutes: f64,
        fare: f64,
        #[serde(rename = "distanceKm")]
        distance_km: f64,
        crowding: Option<CrowdingLevel>,
    },
}

impl From<&Segment> for SegmentDto {
    fn from(segment: &Segment) -> Self {
        match segment {
            Segment::Walk {
                from,
                to,
                meters,
                minutes,
            } => Self::Walk {
                from: (*from).into(),
                to: (*to).into(),
                meters: *meters,
                minutes: *minutes,
            },
            Segment::Wait {
                stop_id,
                minutes,
                vehicle_id,
            } => Self::Wait {
                stop_id: stop_id.to_string(),
                minutes: *minutes,
                vehicle_id: vehicle_id.as_ref().map(ToString::to_string),
            },
            Segment::Ride {
                route_id,
                from_stop,
                to_stop,
                hops,
                minutes,
                fare,
                distance_km,
                crowding,
            } => Self::Ride {
                route_id: route_id.to_string(),
                from_stop: from_stop.to_string(),
                to_stop: to_stop.to_string(),
                hops: *hops,
                minutes: *minutes,
                fare: *fare,
                distance_km: *distance_km,
                crowding: *crowding,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripOptionDto {
    pub segments: Vec<SegmentDto>,
    pub total_minutes: f64,
    pub total_fare: f64,
    pub walking_meters: f64,
    pub transfers: usize,
    pub score: f64,
    pub co2_saved_kg: f64,
}

impl From<&TripOption> for TripOptionDto {
    fn from(option: &TripOption) -> Self {
        Self {
            segments: option.segments.iter().map(SegmentDto::from).collect(),
            total_minutes: option.total_minutes,
            total_fare: option.total_fare,
            walking_meters: option.walking_meters,
            transfers: option.transfers,
            score: option.score,
            co2_saved_kg: option.co2_saved_kg,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Ok,
    NoRouteFound,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResponse {
    pub status: PlanStatus,
    pub timed_out: bool,
    pub options: Vec<TripOptionDto>,
}

impl From<&TripPlan> for TripPlanResponse {
    fn from(plan: &TripPlan) -> Self {
        Self {
            status: if plan.is_empty() {
                PlanStatus::NoRouteFound
            } else {
                PlanStatus::Ok
            },
            timed_out: plan.timed_out,
            options: plan.options.iter().map(TripOptionDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_shapes() {
        let stop: PlaceDto = serde_json::from_str(r#"{"stopId": "piassa"}"#).unwrap();
        assert_eq!(Place::from(stop), Place::Stop(StopId::new("piassa")));

        let coordinate: PlaceDto = serde_json::from_str(r#"{"lat": 9.01, "lng": 38.76}"#).unwrap();
        assert_eq!(
            Place::from(coordinate),
            Place::Coordinate(Point::new(38.76, 9.01))
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: TripPlanRequest = serde_json::from_str(
            r#"{"origin": {"stopId": "mexico"}, "destination": {"lat": 9.0, "lng": 38.7},
                "preferences": {"optimize": "cost"}}"#,
        )
        .unwrap();

        assert_eq!(request.preferences.optimize, Optimize::Cost);
        assert_eq!(request.preferences.max_walk_meters, 800.0);
        assert!(!request.preferences.avoid_crowded);
        assert!(request.departure_time.is_none());
    }

    #[test]
    fn test_empty_plan_status() {
        let response = TripPlanResponse::from(&TripPlan::default());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "no_route_found");
        assert_eq!(json["timedOut"], false);
    }

    #[test]
    fn test_segment_tagging() {
        let segment = Segment::Wait {
            stop_id: StopId::new("lancha"),
            minutes: 3.0,
            vehicle_id: None,
        };
        let json = serde_json::to_value(SegmentDto::from(&segment)).unwrap();
        assert_eq!(json["type"], "wait");
        assert_eq!(json["stopId"], "lancha");
        assert!(json["vehicleId"].is_null());
    }
}
