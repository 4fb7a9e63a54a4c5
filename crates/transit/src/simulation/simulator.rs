//! Long-lived fleet simulation.
//!
//! Vehicles keep their identity across ticks. Every tick each in-service bus
//! moves toward its next stop along the great circle, and its passenger
//! count, delay, and speed take one bounded random-walk step.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::identifiers::{RouteId, VehicleId};
use crate::models::types::{Result, Route, TransitError};
use crate::network::Network;
use crate::simulation::config::SimulationConfig;
use crate::simulation::fleet::{FleetHandle, FleetSnapshot};
use crate::simulation::vehicle::{Vehicle, VehicleStatus};
use crate::spatial::queries::{bearing_degrees, haversine_km, intermediate_point};

pub struct Simulator<R = ChaCha8Rng> {
    config: SimulationConfig,
    rng: R,
    /// Sorted by identifier so random draws happen in a stable order
    vehicles: Vec<Vehicle>,
    /// Vehicles taken out of service because their route stopped running
    retired_with_route: HashSet<VehicleId>,
    tick: u64,
    network_version: u64,
    handle: FleetHandle,
}

impl Simulator<ChaCha8Rng> {
    /// Seed from the configured seed, or from OS entropy when none is set
    pub fn from_config(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Simulator<R> {
    pub fn with_rng(config: SimulationConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            vehicles: Vec::new(),
            retired_with_route: HashSet::new(),
            tick: 0,
            network_version: 0,
            handle: FleetHandle::default(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read access for other components
    pub fn handle(&self) -> FleetHandle {
        self.handle.clone()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Create fleets for active routes that have none and publish the result
    pub fn initialize(&mut self, network: &Network, now: DateTime<Utc>) -> Arc<FleetSnapshot> {
        self.reconcile(network, now);
        self.publish(now)
    }

    /// Retire the whole fleet and start over from the network
    pub fn reset(&mut self, network: &Network, now: DateTime<Utc>) -> Arc<FleetSnapshot> {
        info!(retired = self.vehicles.len(), "resetting simulation");
        self.vehicles.clear();
        self.retired_with_route.clear();
        self.initialize(network, now)
    }

    pub fn tick(&mut self, network: &Network) -> Arc<FleetSnapshot> {
        self.tick_at(network, Utc::now())
    }

    /// Advance every in-service vehicle by one tick interval
    pub fn tick_at(&mut self, network: &Network, now: DateTime<Utc>) -> Arc<FleetSnapshot> {
        self.reconcile(network, now);

        let tick_hours = self.config.tick_interval().as_secs_f64() / 3600.0;
        let Self {
            config,
            rng,
            vehicles,
            ..
        } = self;

        for vehicle in vehicles.iter_mut().filter(|v| v.is_in_service()) {
            let Ok(route) = network.route(&vehicle.route_id) else {
                continue;
            };
            advance(vehicle, route, network, tick_hours);
            perturb(vehicle, config, rng);
            vehicle.last_updated = now;
        }

        self.tick += 1;
        debug!(
            tick = self.tick,
            vehicles = self.vehicles.len(),
            network_version = network.version(),
            "fleet advanced"
        );
        self.publish(now)
    }

    /// Change a vehicle's status by hand (e.g. send it to maintenance)
    pub fn set_vehicle_status(
        &mut self,
        id: &VehicleId,
        status: VehicleStatus,
        now: DateTime<Utc>,
    ) -> Result<Arc<FleetSnapshot>> {
        let vehicle = self
            .vehicles
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| TransitError::VehicleNotFound(id.clone()))?;
        vehicle.status = status;
        vehicle.last_updated = now;
        self.retired_with_route.remove(id);
        Ok(self.publish(now))
    }

    /// Bring the fleet in line with the network: retire vehicles of routes that
    /// stopped running, revive those whose route is back, staff new routes.
    fn reconcile(&mut self, network: &Network, now: DateTime<Utc>) {
        for vehicle in &mut self.vehicles {
            match network.route(&vehicle.route_id) {
                Ok(route) if route.is_active() => {
                    vehicle.next_stop_index %= route.len();
                    if self.retired_with_route.remove(&vehicle.id) {
                        info!(vehicle = %vehicle.id, route = %route.id, "vehicle back in service");
                        vehicle.status = VehicleStatus::InService;
                        vehicle.last_updated = now;
                    }
                }
                _ => {
                    if vehicle.status != VehicleStatus::OutOfService {
                        warn!(
                            vehicle = %vehicle.id,
                            route = %vehicle.route_id,
                            "route no longer active, retiring vehicle"
                        );
                        vehicle.status = VehicleStatus::OutOfService;
                        vehicle.last_updated = now;
                        self.retired_with_route.insert(vehicle.id.clone());
                    }
                }
            }
        }

        let staffed: HashSet<&RouteId> = self.vehicles.iter().map(|v| &v.route_id).collect();
        let unstaffed: Vec<Arc<Route>> = network
            .active_routes()
            .filter(|r| !staffed.contains(&r.id))
            .cloned()
            .collect();

        for route in unstaffed {
            self.spawn_route(&route, network, now);
        }
        self.vehicles.sort_by(|a, b| a.id.cmp(&b.id));
        self.network_version = network.version();
    }

    fn spawn_route(&mut self, route: &Route, network: &Network, now: DateTime<Utc>) {
        let count = fleet_size(route, &self.config);
        let len = route.len();
        let (min_speed, max_speed) = self.config.speed_bounds();
        let capacity = self.config.vehicle_capacity;
        let floor = self.config.passenger_floor();
        let initial_ceiling = (capacity.saturating_mul(3) / 5).max(floor);

        for n in 0..count {
            let start = n * len / count;
            let next = (start + 1) % len;
            let (Ok(from), Ok(to)) = (
                network.stop(&route.stop_ids[start]),
                network.stop(&route.stop_ids[next]),
            ) else {
                continue;
            };

            self.vehicles.push(Vehicle {
                id: VehicleId::new(format!("{}-bus-{:02}", route.id, n + 1)),
                route_id: route.id.clone(),
                location: from.location,
                next_stop_index: next,
                passengers: self.rng.gen_range(floor..=initial_ceiling),
                capacity,
                speed_kmh: self.rng.gen_range(min_speed..=max_speed),
                heading: bearing_degrees(from.location, to.location),
                delay_minutes: 0,
                last_updated: now,
                status: VehicleStatus::InService,
            });
        }
        info!(route = %route.id, vehicles = count, "fleet created");
    }

    fn publish(&self, now: DateTime<Utc>) -> Arc<FleetSnapshot> {
        let snapshot = Arc::new(FleetSnapshot::new(
            self.tick,
            self.network_version,
            now,
            self.vehicles.clone(),
        ));
        self.handle.publish(snapshot.clone());
        snapshot
    }
}

/// Buses needed to keep the target headway over one pass of the route
fn fleet_size(route: &Route, config: &SimulationConfig) -> usize {
    let stops = u32::try_from(route.len()).unwrap_or(u32::MAX);
    let cycle_minutes = stops.saturating_mul(config.minutes_per_hop);
    let needed = cycle_minutes.div_ceil(route.schedule.headway_minutes.max(1));
    needed.clamp(1, config.max_vehicles_per_route.max(1)) as usize
}

/// Move toward the next stop; reaching it advances the index by exactly one.
fn advance(vehicle: &mut Vehicle, route: &Route, network: &Network, tick_hours: f64) {
    let len = route.len();
    let index = vehicle.next_stop_index % len;
    let Ok(target) = network.stop(&route.stop_ids[index]) else {
        return;
    };

    let origin = vehicle.location;
    let remaining = haversine_km(origin, target.location);
    let step = vehicle.speed_kmh * tick_hours;

    if step >= remaining {
        vehicle.location = target.location;
        vehicle.next_stop_index = (index + 1) % len;
    } else {
        vehicle.location = intermediate_point(origin, target.location, step / remaining);
        vehicle.next_stop_index = index;
    }

    if vehicle.location != origin {
        vehicle.heading = bearing_degrees(origin, vehicle.location);
    }
}

fn perturb<R: Rng>(vehicle: &mut Vehicle, config: &SimulationConfig, rng: &mut R) {
    let step = i64::from(config.passenger_step);
    let floor = i64::from(config.passenger_floor());
    let ceiling = i64::from(vehicle.capacity).max(floor);
    let passengers = i64::from(vehicle.passengers) + rng.gen_range(-step..=step);
    vehicle.passengers = passengers.clamp(floor, ceiling) as u32;

    let (early, late) = config.delay_bounds();
    let delay_step = config.delay_step_minutes.saturating_abs();
    let delay = vehicle
        .delay_minutes
        .saturating_add(rng.gen_range(-delay_step..=delay_step));
    vehicle.delay_minutes = delay.clamp(early, late);

    let (min_speed, max_speed) = config.speed_bounds();
    let speed_step = config.speed_step_kmh.abs();
    let speed = vehicle.speed_kmh + rng.gen_range(-speed_step..=speed_step);
    vehicle.speed_kmh = speed.clamp(min_speed, max_speed);
}
