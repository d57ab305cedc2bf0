//! Integration tests for the HTTP gateway
//!
//! These drive the full router (handlers, validation, manager, index) with
//! in-memory requests, plus one test over a real socket.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use contact_server::{ContactServer, ServerConfig};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tower::ServiceExt;

fn create_test_server() -> ContactServer {
    ContactServer::new(ServerConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: impl Into<Body>) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .expect("request should build");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, String) {
    send(app, Method::POST, uri, body.to_string()).await
}

fn ping_body(id: &str, lat: f64, lon: f64) -> Value {
    json!({"id": id, "location": {"lat": lat, "lon": lon}})
}

#[tokio::test]
async fn test_near_contacts_end_to_end() {
    let server = create_test_server();
    let app = server.router();

    let (status, body) = post(&app, "/contacts", json!({"id": "alice", "contacts": ["bob", "carol"]})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    for id in ["alice", "bob"] {
        let (status, _) = post(&app, "/ping", ping_body(id, 51.50, -0.10)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = post(&app, "/near", ping_body("alice", 51.50, -0.10)).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed, json!({"contacts": ["bob"]}));
}

#[tokio::test]
async fn test_near_without_contacts_is_empty_list() {
    let app = create_test_server().router();
    post(&app, "/ping", ping_body("x", 1.0, 1.0)).await;

    let (status, body) = post(&app, "/near", ping_body("x", 1.0, 1.0)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"contacts": []}));
}

#[tokio::test]
async fn test_repeated_ping_keeps_one_point() {
    let server = create_test_server();
    let app = server.router();

    post(&app, "/ping", ping_body("x", 1.0, 1.0)).await;
    post(&app, "/ping", ping_body("x", 1.0, 1.0)).await;

    assert_eq!(server.manager().point_count(), 1);
}

#[tokio::test]
async fn test_non_post_rejected() {
    let app = create_test_server().router();

    for uri in ["/contacts", "/ping", "/near", "/_all"] {
        let (status, body) = send(&app, Method::GET, uri, Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, "Bad Request. Non POST");
    }
}

#[tokio::test]
async fn test_validation_messages() {
    let app = create_test_server().router();

    let (status, body) = send(&app, Method::POST, "/ping", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad Request. Failed to unmarshal request.");

    let (status, body) = post(&app, "/contacts", json!({"id": "a", "contacts": [1]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad Request. Failed to parse contacts.");

    let (status, body) = post(&app, "/near", json!({"location": {"lat": 1, "lon": 1}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad Request. Could not find id.");

    let (status, body) = post(&app, "/ping", json!({"id": "a", "location": {"lat": 1}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad Request. Could not parse longitude.");

    let (status, body) = post(&app, "/_all", json!({"id": "a", "distance": 1, "location": {"lat": 1, "lon": 1}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad Request. Could not find num_points.");
}

#[tokio::test]
async fn test_out_of_bounds_ping_is_bad_request() {
    let server = create_test_server();
    let app = server.router();

    let (status, _) = post(&app, "/ping", ping_body("x", 120.0, 0.0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.manager().point_count(), 0);
    assert_eq!(server.manager().user_count(), 0);
}

#[tokio::test]
async fn test_all_endpoint_lists_points() {
    let app = create_test_server().router();
    post(&app, "/ping", ping_body("a", 10.0, 10.0)).await;
    post(&app, "/ping", ping_body("b", 11.0, 10.0)).await;
    post(&app, "/ping", ping_body("c", 40.0, 40.0)).await;

    let (status, body) = post(
        &app,
        "/_all",
        json!({"id": "ops", "distance": 5.0, "num_points": 10, "location": {"lat": 10.0, "lon": 10.0}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({
            "a": {"lat": 10.0, "lon": 10.0},
            "b": {"lat": 11.0, "lon": 10.0}
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_serves_over_tcp() {
    let server = create_test_server();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .serve(listener, async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let body = ping_body("x", 1.0, 2.0).to_string();
    let request = format!(
        "POST /ping HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "unexpected response: {response}");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
