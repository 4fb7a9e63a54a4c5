use addis_transit::identifiers::{OperatorId, RouteId, StopId, VehicleId};
use addis_transit::models::DEFAULT_LANGUAGE;
use addis_transit::network::NetworkDefinition;
use addis_transit::planner::{PlanBudget, TripPlanner, TripRequest};
use addis_transit::simulation::{FleetSnapshot, VehicleStatus};
use addis_transit_api_types::{
    ArrivalDto, ArrivalsResponse, BusDto, LiveBusesResponse, NearbyStopDto, ReloadResponse,
    ResetResponse, RouteDto, RouteStopsResponse, StopDto, TripPlanRequest, TripPlanResponse,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use geo::Point;
use serde::Deserialize;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::simulation::SimulationCommand;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn create_router(state: AppState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/stops", get(list_stops))
        .route("/stops/nearby", get(nearby_stops))
        .route("/routes", get(list_routes))
        .route("/routes/{id}/stops", get(route_stops))
        .route("/buses/live", get(live_buses))
        .route("/buses/{id}", get(bus))
        .route("/arrivals", get(arrivals))
        .route("/trip-plan", post(trip_plan))
        .route("/admin/network", put(reload_network))
        .route("/admin/simulation/reset", post(reset_simulation))
        .route("/admin/buses/{id}/status", put(set_bus_status));

    let router = if cors_permissive {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };
    router.with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn language(lang: Option<String>) -> String {
    lang.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

#[derive(Debug, Deserialize)]
struct StopsQuery {
    zone: Option<String>,
    lang: Option<String>,
}

async fn list_stops(
    State(state): State<AppState>,
    query: Result<Query<StopsQuery>, QueryRejection>,
) -> ApiResult<Vec<StopDto>> {
    let Query(query) = query?;
    let network = state.network.snapshot();
    let lang = language(query.lang);

    let stops = match &query.zone {
        Some(zone) => network.stops_by_zone(zone)?,
        None => network.stops().to_vec(),
    };
    Ok(Json(
        stops.iter().map(|s| StopDto::from_stop(s, &lang)).collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearbyQuery {
    lat: f64,
    lng: f64,
    #[serde(default = "default_radius_km")]
    radius_km: f64,
    lang: Option<String>,
}

fn default_radius_km() -> f64 {
    1.0
}

async fn nearby_stops(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> ApiResult<Vec<NearbyStopDto>> {
    let Query(query) = query?;
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lng) {
        return Err(ApiError::BadRequest(format!(
            "coordinate out of range: {}, {}",
            query.lat, query.lng
        )));
    }
    if !query.radius_km.is_finite() || query.radius_km < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "radiusKm must be a non-negative number, got {}",
            query.radius_km
        )));
    }

    let network = state.network.snapshot();
    let lang = language(query.lang);
    let point = Point::new(query.lng, query.lat);
    Ok(Json(
        network
            .nearby(point, query.radius_km)
            .iter()
            .map(|n| NearbyStopDto::from_nearby(n, &lang))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct RoutesQuery {
    operator: Option<String>,
    lang: Option<String>,
}

async fn list_routes(
    State(state): State<AppState>,
    query: Result<Query<RoutesQuery>, QueryRejection>,
) -> ApiResult<Vec<RouteDto>> {
    let Query(query) = query?;
    let network = state.network.snapshot();
    let lang = language(query.lang);

    let routes = match query.operator {
        Some(operator) => network.routes_by_operator(&OperatorId::new(operator))?,
        None => network.routes().to_vec(),
    };
    Ok(Json(
        routes.iter().map(|r| RouteDto::from_route(r, &lang)).collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

async fn route_stops(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<LangQuery>, QueryRejection>,
) -> ApiResult<RouteStopsResponse> {
    let Query(query) = query?;
    let network = state.network.snapshot();
    let lang = language(query.lang);
    let route_id = RouteId::new(id);

    let stops = network
        .stop_sequence(&route_id)?
        .iter()
        .map(|stop_id| Ok(StopDto::from_stop(network.stop(stop_id)?, &lang)))
        .collect::<Result<Vec<_>, ApiError>>()?;
    Ok(Json(RouteStopsResponse {
        route_id: route_id.to_string(),
        stops,
    }))
}

fn bus_dto(state: &AppState, fleet: &FleetSnapshot) -> Vec<BusDto> {
    let network = state.network.snapshot();
    fleet
        .vehicles()
        .iter()
        .map(|v| BusDto::from_vehicle(v, network.route(&v.route_id).ok().map(|r| &**r)))
        .collect()
}

async fn live_buses(State(state): State<AppState>) -> ApiResult<LiveBusesResponse> {
    let fleet = state.fleet.snapshot();
    let buses = bus_dto(&state, &fleet);
    Ok(Json(LiveBusesResponse::new(&fleet, buses)))
}

async fn bus(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<BusDto> {
    let fleet = state.fleet.snapshot();
    let network = state.network.snapshot();
    let vehicle = fleet.vehicle(&VehicleId::new(id))?;
    let route = network.route(&vehicle.route_id).ok();
    Ok(Json(BusDto::from_vehicle(vehicle, route.map(|r| &**r))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalsQuery {
    stop_id: String,
}

async fn arrivals(
    State(state): State<AppState>,
    query: Result<Query<ArrivalsQuery>, QueryRejection>,
) -> ApiResult<ArrivalsResponse> {
    let Query(query) = query?;
    let network = state.network.snapshot();
    let fleet = state.fleet.snapshot();
    let stop_id = StopId::new(query.stop_id);

    let predictions = state.estimator.arrivals_for(&network, &fleet, &stop_id)?;
    Ok(Json(ArrivalsResponse {
        stop_id: stop_id.to_string(),
        arrivals: predictions.iter().map(ArrivalDto::from).collect(),
    }))
}

async fn trip_plan(
    State(state): State<AppState>,
    body: Result<Json<TripPlanRequest>, JsonRejection>,
) -> ApiResult<TripPlanResponse> {
    let Json(body) = body?;
    let request = TripRequest {
        origin: body.origin.into(),
        destination: body.destination.into(),
        preferences: body.preferences.into(),
        departure_time: body.departure_time,
    };
    let max_walk = request.preferences.max_walk_meters;
    if max_walk.is_nan() || max_walk < 0.0 {
        return Err(ApiError::BadRequest(
            "maxWalkMeters must be a non-negative number".to_string(),
        ));
    }

    let network = state.network.snapshot();
    let fleet = state.fleet.snapshot();
    let planner = state.planner.clone();
    let estimator = state.estimator;
    let budget = PlanBudget::with_timeout(state.plan_timeout);
    // Planning is CPU-bound; keep it off the async workers
    let plan = tokio::task::spawn_blocking(move || {
        TripPlanner::new(&network, &fleet, estimator, &planner).plan(&request, &budget)
    })
    .await
    .map_err(|err| {
        warn!(%err, "trip planning task failed");
        ApiError::Busy("trip planning failed".to_string())
    })??;
    if plan.timed_out {
        warn!(options = plan.options.len(), "trip planning hit its time budget");
    }
    Ok(Json(TripPlanResponse::from(&plan)))
}

async fn reload_network(
    State(state): State<AppState>,
    body: Result<Json<NetworkDefinition>, JsonRejection>,
) -> ApiResult<ReloadResponse> {
    let Json(definition) = body?;
    let network = state.network.reload(definition)?;
    info!(version = network.version(), "network replaced over HTTP");
    Ok(Json(ReloadResponse {
        version: network.version(),
        stops: network.stops().len(),
        routes: network.routes().len(),
    }))
}

async fn send_command<T>(
    state: &AppState,
    command: SimulationCommand,
    reply: oneshot::Receiver<T>,
) -> Result<T, ApiError> {
    state
        .commands
        .try_send(command)
        .map_err(|_| ApiError::Busy("simulation is not accepting commands".to_string()))?;
    reply
        .await
        .map_err(|_| ApiError::Busy("simulation stopped before answering".to_string()))
}

async fn reset_simulation(State(state): State<AppState>) -> ApiResult<ResetResponse> {
    let (reply, rx) = oneshot::channel();
    let fleet = send_command(&state, SimulationCommand::Reset { reply }, rx).await?;
    Ok(Json(ResetResponse {
        tick: fleet.tick,
        vehicles: fleet.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: VehicleStatus,
}

async fn set_bus_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusBody>, JsonRejection>,
) -> ApiResult<BusDto> {
    let Json(body) = body?;
    let vehicle = VehicleId::new(id);
    let (reply, rx) = oneshot::channel();
    let command = SimulationCommand::SetStatus {
        vehicle: vehicle.clone(),
        status: body.status,
        reply,
    };
    let fleet = send_command(&state, command, rx).await??;

    let network = state.network.snapshot();
    let updated = fleet.vehicle(&vehicle)?;
    let route = network.route(&updated.route_id).ok();
    Ok(Json(BusDto::from_vehicle(updated, route.map(|r| &**r))))
}
