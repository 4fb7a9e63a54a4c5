use std::collections::BTreeMap;

use addis_transit::models::{Facility, Route, RouteSchedule, RouteStatus, Stop};
use addis_transit::spatial::NearbyStop;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDto {
    pub id: String,
    /// Name in the requested language
    pub name: String,
    pub names: BTreeMap<String, String>,
    pub latitude: f64,
    pub longitude: f64,
    pub zone: String,
    pub facilities: Vec<Facility>,
}

impl StopDto {
    pub fn from_stop(stop: &Stop, lang: &str) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name(lang).to_string(),
            names: stop.names.clone(),
            latitude: stop.latitude(),
            longitude: stop.longitude(),
            zone: stop.zone.clone(),
            facilities: stop.facilities.iter().copied().collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyStopDto {
    #[serde(flatten)]
    pub stop: StopDto,
    pub distance_km: f64,
}

impl NearbyStopDto {
    pub fn from_nearby(nearby: &NearbyStop, lang: &str) -> Self {
        Self {
            stop: StopDto::from_stop(&nearby.stop, lang),
            distance_km: nearby.distance_km,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDto {
    pub first_departure: NaiveTime,
    pub last_departure: NaiveTime,
    pub headway_minutes: u32,
}

impl From<RouteSchedule> for ScheduleDto {
    fn from(schedule: RouteSchedule) -> Self {
        Self {
            first_departure: schedule.first_departure,
            last_departure: schedule.last_departure,
            headway_minutes: schedule.headway_minutes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub id: String,
    pub number: String,
    pub name: String,
    pub names: BTreeMap<String, String>,
    pub operator: String,
    pub stop_ids: Vec<String>,
    pub schedule: ScheduleDto,
    pub fare: f64,
    pub status: RouteStatus,
}

impl RouteDto {
    pub fn from_route(route: &Route, lang: &str) -> Self {
        Self {
            id: route.id.to_string(),
            number: route.number.clone(),
            name: route.name(lang).to_string(),
            names: route.names.clone(),
            operator: route.operator.to_string(),
            stop_ids: route.stop_ids.iter().map(ToString::to_string).collect(),
            schedule: route.schedule.into(),
            fare: route.fare,
            status: route.status,
        }
    }
}

/// Ordered stops of one route
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStopsResponse {
    pub route_id: String,
    pub stops: Vec<StopDto>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub version: u64,
    pub stops: usize,
    pub routes: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub tick: u64,
    pub vehicles: usize,
}
