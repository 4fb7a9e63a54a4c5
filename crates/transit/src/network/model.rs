//! In-memory network version with lookup maps and spatial indices.
//!
//! A `Network` is immutable once built. Every query runs against one
//! version, so a reader can never see a route whose stops are missing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use geo::Point;

use crate::identifiers::*;
use crate::models::types::*;
use crate::network::definition::{NetworkDefinition, RouteDefinition, StopDefinition};
use crate::spatial::index::{NearbyRoute, NearbyStop, ProximityIndex};
use crate::spatial::queries::haversine_km;

/// One published version of the bus network
///
/// Cheap to share: all entities are stored in `Arc`s.
#[derive(Clone)]
pub struct Network {
    version: u64,

    // Core data, sorted by identifier
    stops: Vec<Arc<Stop>>,
    routes: Vec<Arc<Route>>,

    // Lookup maps
    stop_map: HashMap<StopId, Arc<Stop>>,
    route_map: HashMap<RouteId, Arc<Route>>,
    routes_by_stop: HashMap<StopId, Vec<Arc<Route>>>,

    proximity: ProximityIndex,
}

impl Network {
    /// Create a network with no stops or routes
    pub fn empty() -> Self {
        Self::from_parts(0, Vec::new(), Vec::new())
    }

    /// Validate a definition and build the version from it
    pub fn build(definition: NetworkDefinition, version: u64) -> Result<Self> {
        let mut stop_ids = HashSet::new();
        let mut stops = Vec::with_capacity(definition.stops.len());
        for def in definition.stops {
            validate_stop(&def)?;
            if !stop_ids.insert(def.id.clone()) {
                return Err(invalid(format!("duplicate stop id {}", def.id)));
            }
            stops.push(Stop {
                id: def.id,
                names: def.names,
                location: Point::new(def.longitude, def.latitude),
                zone: def.zone,
                facilities: def.facilities,
            });
        }

        let mut route_ids = HashSet::new();
        let mut routes = Vec::with_capacity(definition.routes.len());
        for def in definition.routes {
            validate_route(&def, &stop_ids)?;
            if !route_ids.insert(def.id.clone()) {
                return Err(invalid(format!("duplicate route id {}", def.id)));
            }
            routes.push(Route {
                id: def.id,
                number: def.number,
                names: def.names,
                operator: def.operator,
                stop_ids: def.stops,
                schedule: def.schedule,
                fare: def.fare,
                status: def.status,
            });
        }

        Ok(Self::from_parts(version, stops, routes))
    }

    fn from_parts(version: u64, stops: Vec<Stop>, routes: Vec<Route>) -> Self {
        let mut stops: Vec<Arc<Stop>> = stops.into_iter().map(Arc::new).collect();
        let mut routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
        stops.sort_by(|a, b| a.id.cmp(&b.id));
        routes.sort_by(|a, b| a.id.cmp(&b.id));

        // Build lookup maps
        let stop_map: HashMap<_, _> = stops.iter().map(|s| (s.id.clone(), s.clone())).collect();
        let route_map: HashMap<_, _> = routes.iter().map(|r| (r.id.clone(), r.clone())).collect();

        let mut routes_by_stop: HashMap<StopId, Vec<Arc<Route>>> = HashMap::new();
        for route in &routes {
            let distinct: HashSet<&StopId> = route.stop_ids.iter().collect();
            for stop_id in distinct {
                routes_by_stop
                    .entry(stop_id.clone())
                    .or_default()
                    .push(route.clone());
            }
        }

        // Build spatial indices
        let proximity = ProximityIndex::build(&stop_map, &routes);

        Self {
            version,
            stops,
            routes,
            stop_map,
            route_map,
            routes_by_stop,
            proximity,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    // ---- Lookups ----

    pub fn stop(&self, id: &StopId) -> Result<&Arc<Stop>> {
        self.stop_map
            .get(id)
            .ok_or_else(|| TransitError::StopNotFound(id.clone()))
    }

    pub fn route(&self, id: &RouteId) -> Result<&Arc<Route>> {
        self.route_map
            .get(id)
            .ok_or_else(|| TransitError::RouteNotFound(id.clone()))
    }

    // ---- Collections ----

    pub fn stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn active_routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter().filter(|r| r.is_active())
    }

    /// Stops in a fare zone, ordered by identifier
    pub fn stops_by_zone(&self, zone: &str) -> Result<Vec<Arc<Stop>>> {
        let found: Vec<_> = self
            .stops
            .iter()
            .filter(|s| s.zone == zone)
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(TransitError::ZoneNotFound(zone.to_string()));
        }
        Ok(found)
    }

    /// Routes run by an operator, ordered by identifier
    pub fn routes_by_operator(&self, operator: &OperatorId) -> Result<Vec<Arc<Route>>> {
        let found: Vec<_> = self
            .routes
            .iter()
            .filter(|r| &r.operator == operator)
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(TransitError::OperatorNotFound(operator.clone()));
        }
        Ok(found)
    }

    pub fn stop_sequence(&self, route_id: &RouteId) -> Result<&[StopId]> {
        self.route(route_id).map(|r| r.stop_ids.as_slice())
    }

    /// Routes visiting a stop, ordered by identifier
    pub fn routes_serving(&self, stop_id: &StopId) -> Result<Vec<Arc<Route>>> {
        self.stop(stop_id)?;
        Ok(self
            .routes_by_stop
            .get(stop_id)
            .cloned()
            .unwrap_or_default())
    }

    pub fn stop_index(&self, route_id: &RouteId, stop_id: &StopId) -> Result<usize> {
        self.route(route_id)?
            .index_of(stop_id)
            .ok_or_else(|| TransitError::StopNotFound(stop_id.clone()))
    }

    /// Great-circle length of `hops` consecutive legs starting at `from_index`,
    /// wrapping at the end of the sequence
    pub fn segment_km(&self, route_id: &RouteId, from_index: usize, hops: usize) -> Result<f64> {
        let route = self.route(route_id)?;
        let len = route.len();
        let mut total = 0.0;
        for step in 0..hops {
            let a = self.stop(&route.stop_ids[(from_index + step) % len])?;
            let b = self.stop(&route.stop_ids[(from_index + step + 1) % len])?;
            total += haversine_km(a.location, b.location);
        }
        Ok(total)
    }

    // ---- Spatial queries ----

    pub fn proximity(&self) -> &ProximityIndex {
        &self.proximity
    }

    /// Stops within `radius_km`, closest first
    pub fn nearby(&self, point: Point, radius_km: f64) -> Vec<NearbyStop> {
        self.proximity.nearby(point, radius_km)
    }

    /// Routes passing within `radius_km`, closest first
    pub fn routes_near(&self, point: Point, radius_km: f64) -> Vec<NearbyRoute> {
        self.proximity.routes_near(point, radius_km)
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("version", &self.version)
            .field("stops", &self.stops.len())
            .field("routes", &self.routes.len())
            .finish()
    }
}

fn invalid(message: String) -> TransitError {
    TransitError::ConfigInvalid(message)
}

fn validate_stop(def: &StopDefinition) -> Result<()> {
    if !(-90.0..=90.0).contains(&def.latitude) || !(-180.0..=180.0).contains(&def.longitude) {
        return Err(invalid(format!(
            "stop {} has coordinate ({}, {}) out of range",
            def.id, def.latitude, def.longitude
        )));
    }
    Ok(())
}

fn validate_route(def: &RouteDefinition, stop_ids: &HashSet<StopId>) -> Result<()> {
    if def.stops.len() < 2 {
        return Err(invalid(format!(
            "route {} has {} stop(s), at least 2 required",
            def.id,
            def.stops.len()
        )));
    }
    if let Some(missing) = def.stops.iter().find(|s| !stop_ids.contains(*s)) {
        return Err(invalid(format!(
            "route {} references unknown stop {}",
            def.id, missing
        )));
    }
    if let Some(pair) = def.stops.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(invalid(format!(
            "route {} visits stop {} twice in a row",
            def.id, pair[0]
        )));
    }
    if def.schedule.headway_minutes == 0 {
        return Err(invalid(format!("route {} has a zero headway", def.id)));
    }
    if !def.fare.is_finite() || def.fare < 0.0 {
        return Err(invalid(format!("route {} has invalid fare {}", def.id, def.fare)));
    }
    Ok(())
}
