use std::sync::Arc;

use addis_transit::network::{NetworkDefinition, NetworkStore};
use addis_transit::simulation::SimulationConfig;
use addis_transit_server::logging::init_test_logger;
use addis_transit_server::{build_app, ServerConfig};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

const NETWORK_JSON: &str = include_str!("../../../data/addis-network.json");

fn definition() -> NetworkDefinition {
    serde_json::from_str(NETWORK_JSON).unwrap()
}

fn app() -> Router {
    let store = Arc::new(NetworkStore::from_definition(definition()).unwrap());
    let config = ServerConfig {
        simulation: SimulationConfig {
            seed: Some(7),
            ..SimulationConfig::default()
        },
        ..ServerConfig::default()
    };
    build_app(&config, store).router
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn with_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn ids(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let _log = init_test_logger();
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_stop_listings() {
    let _log = init_test_logger();
    let app = app();

    let (status, stops) = get(&app, "/stops").await;
    assert_eq!(status, StatusCode::OK);
    let all = ids(&stops);
    assert_eq!(all.len(), 14);
    assert!(all.windows(2).all(|w| w[0] < w[1]));

    let (_, bole) = get(&app, "/stops?zone=bole").await;
    assert_eq!(ids(&bole), vec!["bole-airport", "bole-medhanialem", "urael"]);

    let (status, error) = get(&app, "/stops?zone=nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_localized_names() {
    let _log = init_test_logger();
    let app = app();
    let (_, stops) = get(&app, "/stops?zone=arada&lang=am").await;
    assert_eq!(stops[0]["id"], "arat-kilo");
    assert_eq!(stops[0]["name"], "አራት ኪሎ");

    // Unknown language falls back to English
    let (_, stops) = get(&app, "/stops?zone=arada&lang=fr").await;
    assert_eq!(stops[0]["name"], "Arat Kilo");
}

#[tokio::test]
async fn test_nearby_stops() {
    let _log = init_test_logger();
    let app = app();

    let (status, nearby) = get(&app, "/stops/nearby?lat=9.0120&lng=38.7634&radiusKm=1").await;
    assert_eq!(status, StatusCode::OK);
    let found = ids(&nearby);
    assert_eq!(found[0], "meskel-square");
    assert!(found.contains(&"stadium"));
    assert!(!found.contains(&"kazanchis"));

    let distances: Vec<f64> = nearby
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["distanceKm"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));

    let (status, error) = get(&app, "/stops/nearby?lat=100&lng=38.7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "bad_request");

    let (status, _) = get(&app, "/stops/nearby?lng=38.7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_listings() {
    let _log = init_test_logger();
    let app = app();

    let (_, routes) = get(&app, "/routes").await;
    assert_eq!(ids(&routes), vec!["route-01", "route-02", "route-03", "route-04"]);

    let (_, sheger) = get(&app, "/routes?operator=sheger").await;
    assert_eq!(ids(&sheger), vec!["route-03", "route-04"]);
    assert_eq!(sheger[1]["status"], "suspended");
    assert_eq!(sheger[0]["schedule"]["headwayMinutes"], 20);

    let (status, _) = get(&app, "/routes?operator=nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, sequence) = get(&app, "/routes/route-01/stops").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sequence["routeId"], "route-01");
    let stops = ids(&sequence["stops"]);
    assert_eq!(stops.len(), 7);
    assert_eq!(stops[0], "piassa");
    assert_eq!(stops[6], "bole-airport");

    let (status, _) = get(&app, "/routes/route-99/stops").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_live_buses() {
    let _log = init_test_logger();
    let app = app();

    let (status, live) = get(&app, "/buses/live").await;
    assert_eq!(status, StatusCode::OK);
    let buses = live["buses"].as_array().unwrap();
    // 2 on route-01, 1 each on route-02 and route-03, none on the suspended route-04
    assert_eq!(buses.len(), 4);
    for bus in buses {
        assert_ne!(bus["routeId"], "route-04");
        assert_eq!(bus["status"], "in_service");
        assert!(bus["nextStopId"].is_string());
        assert!(bus["occupancyPercent"].as_u64().unwrap() <= 100);
    }

    let (status, bus) = get(&app, "/buses/route-01-bus-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bus["routeId"], "route-01");

    let (status, error) = get(&app, "/buses/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_arrivals() {
    let _log = init_test_logger();
    let app = app();

    let (status, body) = get(&app, "/arrivals?stopId=meskel-square").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stopId"], "meskel-square");
    let arrivals = body["arrivals"].as_array().unwrap();
    assert_eq!(arrivals.len(), 3);
    assert!(arrivals
        .iter()
        .all(|a| a["routeId"] == "route-01" || a["routeId"] == "route-02"));
    let etas: Vec<i64> = arrivals.iter().map(|a| a["etaMinutes"].as_i64().unwrap()).collect();
    assert!(etas.windows(2).all(|w| w[0] <= w[1]));

    let (status, _) = get(&app, "/arrivals?stopId=atlantis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/arrivals").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trip_plan() {
    let _log = init_test_logger();
    let app = app();

    let (status, plan) = with_json(
        &app,
        "POST",
        "/trip-plan",
        json!({
            "origin": { "stopId": "meskel-square" },
            "destination": { "stopId": "bole-airport" },
            "preferences": { "optimize": "time" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["status"], "ok");
    assert_eq!(plan["timedOut"], false);

    let option = &plan["options"][0];
    let ride = option["segments"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["type"] == "ride")
        .unwrap();
    assert_eq!(ride["routeId"], "route-01");
    assert_eq!(ride["hops"], 4);
    assert_eq!(option["totalFare"], 5.0);
    let score = option["score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_trip_plans() {
    let _log = init_test_logger();
    let app = app();
    let body = |destination: &str| {
        json!({
            "origin": { "stopId": "meskel-square" },
            "destination": { "stopId": destination },
            "preferences": { "optimize": "time" }
        })
    };

    let (airport, saris, again) = tokio::join!(
        with_json(&app, "POST", "/trip-plan", body("bole-airport")),
        with_json(&app, "POST", "/trip-plan", body("saris")),
        with_json(&app, "POST", "/trip-plan", body("bole-airport")),
    );
    for (status, plan) in [&airport, &saris, &again] {
        assert_eq!(*status, StatusCode::OK);
        assert_eq!(plan["status"], "ok");
    }
    assert_eq!(airport.1["options"][0]["totalFare"], 5.0);
    assert_eq!(again.1["options"][0]["totalFare"], 5.0);
    let transfers = saris.1["options"][0]["transfers"].as_u64().unwrap();
    assert_eq!(transfers, 1);
}

#[tokio::test]
async fn test_trip_plan_outcomes() {
    let _log = init_test_logger();
    let app = app();

    // Nairobi is far beyond walking distance of any stop
    let (status, plan) = with_json(
        &app,
        "POST",
        "/trip-plan",
        json!({
            "origin": { "lat": -1.2921, "lng": 36.8219 },
            "destination": { "stopId": "bole-airport" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["status"], "no_route_found");
    assert!(plan["options"].as_array().unwrap().is_empty());

    let (status, error) = with_json(
        &app,
        "POST",
        "/trip-plan",
        json!({
            "origin": { "stopId": "atlantis" },
            "destination": { "stopId": "bole-airport" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");

    let (status, error) = with_json(&app, "POST", "/trip-plan", json!({ "origin": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "bad_request");
}

#[tokio::test]
async fn test_network_reload() {
    let _log = init_test_logger();
    let app = app();

    let mut broken = serde_json::to_value(definition()).unwrap();
    broken["routes"][0]["stops"] = json!(["piassa"]);
    let (status, error) = with_json(&app, "PUT", "/admin/network", broken).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "config_invalid");

    let (_, stops) = get(&app, "/stops").await;
    assert_eq!(ids(&stops).len(), 14);

    let mut extended = serde_json::to_value(definition()).unwrap();
    extended["stops"].as_array_mut().unwrap().push(json!({
        "id": "ayat",
        "names": { "en": "Ayat" },
        "latitude": 9.0205,
        "longitude": 38.8820,
        "zone": "yeka"
    }));
    let (status, reloaded) = with_json(&app, "PUT", "/admin/network", extended).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reloaded["version"], 2);
    assert_eq!(reloaded["stops"], 15);

    let (_, yeka) = get(&app, "/stops?zone=yeka").await;
    assert!(ids(&yeka).contains(&"ayat"));
}

#[tokio::test]
async fn test_simulation_commands() {
    let _log = init_test_logger();
    let app = app();

    let (status, bus) = with_json(
        &app,
        "PUT",
        "/admin/buses/route-02-bus-01/status",
        json!({ "status": "maintenance" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bus["status"], "maintenance");

    let (_, body) = get(&app, "/arrivals?stopId=mexico").await;
    assert!(body["arrivals"].as_array().unwrap().is_empty());

    let (status, _) = with_json(
        &app,
        "PUT",
        "/admin/buses/ghost/status",
        json!({ "status": "maintenance" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::post("/admin/simulation/reset")
        .body(Body::empty())
        .unwrap();
    let (status, reset) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["vehicles"], 4);

    let (_, bus) = get(&app, "/buses/route-02-bus-01").await;
    assert_eq!(bus["status"], "in_service");
}
