//! Arrival-time estimation from the fleet snapshot.
//!
//! Routes are treated as loops: a bus that has already passed a stop reaches
//! it again after wrapping around the end of its sequence.

use crate::crowding::CrowdingLevel;
use crate::identifiers::{RouteId, StopId, VehicleId};
use crate::models::types::{Result, Route};
use crate::network::Network;
use crate::simulation::{FleetSnapshot, Vehicle};

/// Reference travel time between consecutive stops
pub const DEFAULT_MINUTES_PER_HOP: u32 = 2;

/// When a vehicle is expected at a stop
#[derive(Clone, Debug, PartialEq)]
pub struct ArrivalPrediction {
    pub stop_id: StopId,
    pub vehicle_id: VehicleId,
    pub route_id: RouteId,
    /// Minutes until arrival; negative means the bus is running early past
    /// its slot and has most likely just left
    pub eta_minutes: i32,
    pub hops: usize,
    pub load_percent: u8,
    pub crowding: CrowdingLevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrivalEstimator {
    pub minutes_per_hop: u32,
}

impl Default for ArrivalEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES_PER_HOP)
    }
}

impl ArrivalEstimator {
    pub fn new(minutes_per_hop: u32) -> Self {
        Self { minutes_per_hop }
    }

    /// Every in-service vehicle that will pass `stop_id`, soonest first
    pub fn arrivals_for(
        &self,
        network: &Network,
        fleet: &FleetSnapshot,
        stop_id: &StopId,
    ) -> Result<Vec<ArrivalPrediction>> {
        network.stop(stop_id)?;
        let mut predictions: Vec<ArrivalPrediction> = fleet
            .in_service()
            .filter_map(|vehicle| {
                let route = network.route(&vehicle.route_id).ok()?;
                self.predict(route, vehicle, stop_id)
            })
            .collect();

        predictions.sort_by(|a, b| {
            a.eta_minutes
                .cmp(&b.eta_minutes)
                .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
        });
        Ok(predictions)
    }

    /// Predictions at `stop_id` restricted to one route
    pub fn arrivals_for_route(
        &self,
        network: &Network,
        fleet: &FleetSnapshot,
        stop_id: &StopId,
        route_id: &RouteId,
    ) -> Result<Vec<ArrivalPrediction>> {
        network.route(route_id)?;
        let mut predictions = self.arrivals_for(network, fleet, stop_id)?;
        predictions.retain(|p| &p.route_id == route_id);
        Ok(predictions)
    }

    fn predict(
        &self,
        route: &Route,
        vehicle: &Vehicle,
        stop_id: &StopId,
    ) -> Option<ArrivalPrediction> {
        let hops = hops_until(route, vehicle.next_stop_index, stop_id)?;
        let travel = i64::try_from(hops).ok()? * i64::from(self.minutes_per_hop);
        let eta = travel + i64::from(vehicle.delay_minutes);

        Some(ArrivalPrediction {
            stop_id: stop_id.clone(),
            vehicle_id: vehicle.id.clone(),
            route_id: route.id.clone(),
            eta_minutes: i32::try_from(eta).unwrap_or(i32::MAX),
            hops,
            load_percent: vehicle.occupancy_percent(),
            crowding: vehicle.crowding(),
        })
    }
}

/// Stop-to-stop hops from `next_index` to the nearest upcoming visit of `stop_id`
pub fn hops_until(route: &Route, next_index: usize, stop_id: &StopId) -> Option<usize> {
    let len = route.len();
    if len == 0 {
        return None;
    }
    let from = next_index % len;
    route
        .indices_of(stop_id)
        .map(|target| (target + len - from) % len)
        .min()
}
