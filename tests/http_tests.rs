//! End-to-end tests: HTTP server, real adapters, mock upstream APIs.

use std::sync::atomic::Ordering;

use futures_util::future::join_all;
use serde_json::{json, Value};

mod common;
use common::{http_client, start_end_to_end};

#[tokio::test]
async fn test_optimize_end_to_end() {
    let (addr, shutdown, mock) = start_end_to_end().await;

    let res = http_client()
        .post(format!("http://{}/api/optimize", addr))
        .json(&json!({
            "startQuery": "89109",
            "stops": [
                {"id": "a", "query": "Starbucks"},
                {"id": "b", "query": "Chipotle"},
                {"id": "c", "query": "Hoover Dam"}
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["optimized"], json!(true));
    assert_eq!(body["destinationId"], json!("c"));
    // Mock solver reverses the job order.
    assert_eq!(body["orderedIds"], json!(["b", "a", "c"]));
    assert_eq!(body["routeDistance_m"], json!(21000.0));
    assert_eq!(body["routeDuration_s"], json!(1800.0));
    assert_eq!(body["startUsed"]["source"], json!("zip"));

    let stops = body["resolvedStops"].as_array().unwrap();
    assert_eq!(stops.len(), 3);
    assert_eq!(stops[0]["pickedFrom"], json!("brand_nearest"));
    assert_eq!(stops[2]["pickedFrom"], json!("geocode"));
    // The name filter skips the non-matching first result.
    assert_eq!(stops[0]["lat"], json!(common::STARBUCKS.lat));

    assert_eq!(mock.matrix_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.solver_calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_preview_end_to_end() {
    let (addr, shutdown, mock) = start_end_to_end().await;

    let res = http_client()
        .post(format!("http://{}/api/optimize", addr))
        .json(&json!({
            "startCoords": {"lat": 36.1147, "lon": -115.1728},
            "previewOnly": true,
            "stops": [
                {"id": "a", "query": "Starbucks"},
                {"id": "b", "query": "Chipotle"}
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["preview"], json!(true));
    assert_eq!(body["optimized"], json!(false));
    assert_eq!(body["suggestedDestinationId"], json!("b"));
    assert_eq!(body["startUsed"]["source"], json!("gps"));
    assert!(body["stops"][0]["eta_min"].as_u64().unwrap() >= 1);
    assert!(body["stops"][1]["dist_mi"].as_f64().unwrap() > 0.0);

    assert_eq!(mock.geocode_calls.load(Ordering::SeqCst), 0);
    assert_eq!(mock.solver_calls.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_zero_stops_is_400() {
    let (addr, shutdown, mock) = start_end_to_end().await;

    let res = http_client()
        .post(format!("http://{}/api/optimize", addr))
        .json(&json!({"startQuery": "89109", "stops": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["optimized"], json!(false));
    assert!(body["note"].as_str().unwrap().contains("at least one stop"));
    assert_eq!(mock.geocode_calls.load(Ordering::SeqCst), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_json_is_400_with_note() {
    let (addr, shutdown, _mock) = start_end_to_end().await;

    let res = http_client()
        .post(format!("http://{}/api/optimize", addr))
        .header("content-type", "application/json")
        .body("{\"stops\": [")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["optimized"], json!(false));
    assert!(body["note"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_health() {
    let (addr, shutdown, _mock) = start_end_to_end().await;

    let res = http_client()
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (addr, shutdown, _mock) = start_end_to_end().await;

    let res = http_client()
        .get(format!("http://{}/health", addr))
        .header("x-request-id", "trip-42")
        .send()
        .await
        .unwrap();
    assert_eq!(
        res.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "trip-42"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_trips_share_the_cache() {
    let (addr, shutdown, mock) = start_end_to_end().await;
    let client = http_client();
    let url = format!("http://{}/api/optimize", addr);
    let body = json!({
        "startCoords": {"lat": 36.1147, "lon": -115.1728},
        "stops": [{"id": "a", "query": "Starbucks"}, {"id": "b", "query": "Chipotle"}]
    });

    // Warm the cache, then fire a burst of identical trips.
    let res = client.post(&url).json(&body).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(mock.places_calls.load(Ordering::SeqCst), 2);

    let responses = join_all((0..8).map(|_| client.post(&url).json(&body).send())).await;
    for res in responses {
        let res = res.unwrap();
        assert_eq!(res.status(), 200);
        let value: Value = res.json().await.unwrap();
        assert_eq!(value["resolvedStops"][0]["pickedFrom"], json!("brand_cache"));
    }
    assert_eq!(mock.places_calls.load(Ordering::SeqCst), 2);

    shutdown.trigger();
}
