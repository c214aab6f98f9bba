//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::{Body, BodyDataStream},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tower::ServiceExt;
use trade_price::{
    api::create_router,
    service::{FilteringTradePriceService, IndexedCacheTradePriceService, PricePublisher},
    tasks::evict_expired,
    AppState,
};

// == Helper Functions ==

fn create_test_state() -> AppState {
    AppState::new(
        IndexedCacheTradePriceService::new().unwrap(),
        PricePublisher::new(16),
    )
}

fn create_test_app() -> Router {
    create_router(create_test_state())
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn price_json(vendor_id: u64, symbol: &str, bid: f64) -> String {
    json!({
        "vendorId": vendor_id,
        "vendorName": format!("Vendor {}", vendor_id),
        "vendorDescription": "A vendor",
        "instrumentSymbol": symbol,
        "instrumentDescription": format!("{} description", symbol),
        "bid": bid,
        "ask": bid + 1.0
    })
    .to_string()
}

async fn post_price(app: &Router, body: String) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/price")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == POST /price Tests ==

#[tokio::test]
async fn test_create_price_accepted() {
    let app = create_test_app();

    assert_eq!(post_price(&app, price_json(1, "VOD", 10.21)).await, StatusCode::ACCEPTED);

    let (status, json) = get_json(&app, "/price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["vendor"]["id"], 1);
    assert_eq!(json[0]["instrument"]["symbol"], "VOD");
    assert_eq!(json[0]["bid"], 10.21);
    assert!(json[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_price_validation_errors() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/price")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"vendorId":1,"vendorName":"","bid":1.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    let fields: Vec<&str> = json["fieldErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec![
            "vendorName",
            "vendorDescription",
            "instrumentSymbol",
            "instrumentDescription",
            "ask"
        ]
    );
    assert_eq!(json["fieldErrors"][0]["rejectedValue"], "");

    let (_, all) = get_json(&app, "/price").await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let status = post_price(&app, r#"{"invalid json"#.to_string()).await;

    // Axum rejects malformed JSON before the handler runs
    assert!(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY);
}

// == Query Endpoint Tests ==

#[tokio::test]
async fn test_query_by_vendor_and_instrument() {
    let app = create_test_app();
    post_price(&app, price_json(1, "VOD", 10.0)).await;
    post_price(&app, price_json(1, "BAY", 11.0)).await;
    post_price(&app, price_json(2, "BAY", 10.5)).await;

    let (status, vendor_1) = get_json(&app, "/vendor/1/prices").await;
    assert_eq!(status, StatusCode::OK);
    let symbols: Vec<&str> = vendor_1
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["instrument"]["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, vec!["BAY", "VOD"]);

    let (_, bay) = get_json(&app, "/instrument/BAY/prices").await;
    let vendors: Vec<u64> = bay
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["vendor"]["id"].as_u64().unwrap())
        .collect();
    assert_eq!(vendors, vec![1, 2]);

    let (_, unknown) = get_json(&app, "/instrument/XYZ/prices").await;
    assert!(unknown.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_replaces_previous_quote() {
    let app = create_test_app();
    post_price(&app, price_json(1, "VOD", 10.0)).await;
    post_price(&app, price_json(1, "VOD", 12.5)).await;

    let (_, vod) = get_json(&app, "/instrument/VOD/prices").await;
    assert_eq!(vod.as_array().unwrap().len(), 1);
    assert_eq!(vod[0]["bid"], 12.5);

    let (_, all) = get_json(&app, "/price").await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_filtered_store_behaves_the_same() {
    let app = create_router(AppState::new(
        FilteringTradePriceService::new(),
        PricePublisher::new(16),
    ));
    post_price(&app, price_json(1, "VOD", 10.0)).await;
    post_price(&app, price_json(2, "VOD", 11.0)).await;
    post_price(&app, price_json(2, "VOD", 11.5)).await;

    let (_, vod) = get_json(&app, "/instrument/VOD/prices").await;
    assert_eq!(vod.as_array().unwrap().len(), 2);
    assert_eq!(vod[1]["bid"], 11.5);
}

// == Price Stream Tests ==

async fn open_price_stream(app: &Router) -> BodyDataStream {
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/price/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    response.into_body().into_data_stream()
}

fn is_price_event(frame: &str) -> bool {
    frame
        .lines()
        .any(|line| line.strip_prefix("event:").map(str::trim) == Some("price"))
}

/// Reads frames until the next `price` event and returns it.
async fn next_price_event(stream: &mut BodyDataStream, buffer: &mut String) -> String {
    let read = async {
        loop {
            if let Some(end) = buffer.find("\n\n") {
                let frame: String = buffer.drain(..end + 2).collect();
                if is_price_event(&frame) {
                    return frame;
                }
                continue;
            }
            let chunk = stream.next().await.unwrap().unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    };
    tokio::time::timeout(std::time::Duration::from_secs(5), read)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_price_stream_emits_accepted_prices() {
    let app = create_test_app();
    let mut stream = open_price_stream(&app).await;
    let mut buffer = String::new();

    post_price(&app, price_json(4, "VOD", 2.5)).await;
    post_price(&app, price_json(4, "BAY", 3.5)).await;

    let first = next_price_event(&mut stream, &mut buffer).await;
    assert!(first.contains(r#""vendor":{"id":4"#));
    assert!(first.contains(r#""symbol":"VOD""#));

    let second = next_price_event(&mut stream, &mut buffer).await;
    assert!(second.contains(r#""symbol":"BAY""#));
}

#[tokio::test]
async fn test_price_stream_lagging_client_skips_missed_prices() {
    let app = create_router(AppState::new(
        IndexedCacheTradePriceService::new().unwrap(),
        PricePublisher::new(1),
    ));
    let mut stream = open_price_stream(&app).await;
    let mut buffer = String::new();

    // Capacity 1: only the last price is still buffered when the client reads
    for vendor_id in 1..=3 {
        post_price(&app, price_json(vendor_id, "VOD", 1.0)).await;
    }

    let event = next_price_event(&mut stream, &mut buffer).await;
    assert!(event.contains(r#""vendor":{"id":3"#));

    // The stream stays usable after the lag
    post_price(&app, price_json(9, "BAY", 1.0)).await;
    let event = next_price_event(&mut stream, &mut buffer).await;
    assert!(event.contains(r#""vendor":{"id":9"#));
}

// == Eviction Tests ==

#[tokio::test]
async fn test_evicted_prices_disappear_from_every_endpoint() {
    let state = create_test_state();
    let app = create_router(state.clone());

    let mut old = serde_json::from_str::<Value>(&price_json(1, "VOD", 1.0)).unwrap();
    old["timestamp"] = json!((Utc::now() - Duration::days(31)).to_rfc3339());
    post_price(&app, old.to_string()).await;
    post_price(&app, price_json(1, "BAY", 2.0)).await;

    assert_eq!(evict_expired(state.service.as_ref(), Duration::days(30)), 1);

    let (_, vod) = get_json(&app, "/instrument/VOD/prices").await;
    assert!(vod.as_array().unwrap().is_empty());
    let (_, vendor) = get_json(&app, "/vendor/1/prices").await;
    assert_eq!(vendor.as_array().unwrap().len(), 1);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    post_price(&app, price_json(3, "VOD", 1.0)).await;

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert_eq!(json["prices"], 1);
    assert!(json.get("timestamp").is_some());
}

// == Live Server Tests ==

#[tokio::test]
async fn test_live_server_round_trip() {
    let state = create_test_state();
    let mut feed = state.publisher.subscribe();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/price", addr))
        .header("content-type", "application/json")
        .body(price_json(5, "VOD", 3.0))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let published = feed.recv().await.unwrap();
    assert_eq!(published.vendor.id, 5);

    let prices: Value = client
        .get(format!("http://{}/vendor/5/prices", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prices[0]["instrument"]["symbol"], "VOD");

    server.abort();
}
