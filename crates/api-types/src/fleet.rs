use addis_transit::arrivals::ArrivalPrediction;
use addis_transit::crowding::CrowdingLevel;
use addis_transit::models::Route;
use addis_transit::simulation::{FleetSnapshot, Vehicle, VehicleStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bus as shown on the live map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDto {
    pub id: String,
    pub route_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `None` when the route no longer exists
    pub next_stop_id: Option<String>,
    pub next_stop_index: usize,
    pub passengers: u32,
    pub capacity: u32,
    pub occupancy_percent: u8,
    pub crowding: CrowdingLevel,
    pub speed_kmh: f64,
    pub heading: f64,
    pub delay_minutes: i32,
    pub status: VehicleStatus,
    pub last_updated: DateTime<Utc>,
}

impl BusDto {
    pub fn from_vehicle(vehicle: &Vehicle, route: Option<&Route>) -> Self {
        let next_stop_id = route
            .filter(|r| !r.is_empty())
            .map(|r| r.stop_ids[vehicle.next_stop_index % r.len()].to_string());

        Self {
            id: vehicle.id.to_string(),
            route_id: vehicle.route_id.to_string(),
            latitude: vehicle.location.y(),
            longitude: vehicle.location.x(),
            next_stop_id,
            next_stop_index: vehicle.next_stop_index,
            passengers: vehicle.passengers,
            capacity: vehicle.capacity,
            occupancy_percent: vehicle.occupancy_percent(),
            crowding: vehicle.crowding(),
            speed_kmh: vehicle.speed_kmh,
            heading: vehicle.heading,
            delay_minutes: vehicle.delay_minutes,
            status: vehicle.status,
            last_updated: vehicle.last_updated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBusesResponse {
    pub tick: u64,
    pub network_version: u64,
    pub taken_at: DateTime<Utc>,
    pub buses: Vec<BusDto>,
}

impl LiveBusesResponse {
    pub fn new(fleet: &FleetSnapshot, buses: Vec<BusDto>) -> Self {
        Self {
            tick: fleet.tick,
            network_version: fleet.network_version,
            taken_at: fleet.taken_at,
            buses,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalDto {
    pub vehicle_id: String,
    pub route_id: String,
    pub eta_minutes: i32,
    pub hops: usize,
    pub load_percent: u8,
    pub crowding: CrowdingLevel,
}

impl From<&ArrivalPrediction> for ArrivalDto {
    fn from(prediction: &ArrivalPrediction) -> Self {
        Self {
            vehicle_id: prediction.vehicle_id.to_string(),
            route_id: prediction.route_id.to_string(),
            eta_minutes: prediction.eta_minutes,
            hops: prediction.hops,
            load_percent: prediction.load_percent,
            crowding: prediction.crowding,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalsResponse {
    pub stop_id: String,
    pub arrivals: Vec<ArrivalDto>,
}
