use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::inventory::router::inventory_router;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn register_define_and_assign_over_http() {
    let (service, _, _) = build_service();
    let router = inventory_router(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/hostels",
            json!({ "name": "Riverside" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let hostel_id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("hostel id")
        .to_string();
    assert_eq!(created.get("architecture_defined"), Some(&json!(false)));

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/hostels/{hostel_id}/architecture"),
            json!({
                "floors": [
                    { "name": "Ground", "rooms": [
                        { "number": "101", "capacity": 2 },
                        { "number": "102" }
                    ]}
                ]
            }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let defined = read_json_body(response).await;
    assert_eq!(defined.get("total_rooms"), Some(&json!(2)));
    assert_eq!(defined.pointer("/summary/total_capacity"), Some(&json!(3)));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/hostels/{hostel_id}/residents"),
            json!({ "name": "Asha", "duration_months": 6, "join_date": "2026-06-01" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let resident = read_json_body(response).await;
    assert_eq!(resident.get("room"), Some(&json!("101")));
    assert_eq!(resident.get("end_date"), Some(&json!("2026-12-01")));

    let response = router
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/hostels/{hostel_id}/residents"),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let listing = read_json_body(response).await;
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn invalid_architecture_is_unprocessable() {
    let (service, _, _) = build_service();
    let hostel = service
        .register_hostel(crate::inventory::HostelRegistration {
            name: "Broken".to_string(),
        })
        .expect("registered");
    let router = inventory_router(service);

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/hostels/{}/architecture", hostel.id()),
            json!({ "floors": [ { "name": "Ground", "rooms": [ { "number": "101", "capacity": 0 } ] } ] }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("capacity"));
}

#[tokio::test]
async fn full_hostel_returns_conflict() {
    let (service, _, _) = build_service();
    let hostel = hostel_with(&service, single_rooms()).await;
    for name in ["A", "B"] {
        service
            .assign_new_resident(hostel.id(), submission(name), today())
            .await
            .expect("assigned");
    }
    let router = inventory_router(service);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/hostels/{}/residents", hostel.id()),
            json!({ "name": "Late", "duration_months": 3 }),
        ))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn exchange_relocate_and_remove_routes() {
    let (service, _, _) = build_service();
    let hostel = hostel_with(&service, single_rooms()).await;
    let a = service
        .assign_new_resident(hostel.id(), submission("A"), today())
        .await
        .expect("A");
    let c = service
        .assign_new_resident(hostel.id(), submission("C"), today())
        .await
        .expect("C");
    let router = inventory_router(service.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/room-exchanges",
            json!({ "first": a.id.0.clone(), "second": c.id.0.clone() }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let swapped = read_json_body(response).await;
    assert_eq!(swapped.pointer("/0/room"), Some(&json!("102")));
    assert_eq!(swapped.pointer("/1/room"), Some(&json!("101")));

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/residents/{}/room", a.id),
            json!({ "room": "101" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .clone()
        .oneshot(empty_request("DELETE", &format!("/api/v1/residents/{}", c.id)))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let removal = read_json_body(response).await;
    assert_eq!(removal.pointer("/discharge/outcome"), Some(&json!("released")));
    assert_eq!(removal.pointer("/discharge/room"), Some(&json!("101")));

    let response = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/residents/{}/room", a.id),
            json!({ "room": "101" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(empty_request("GET", &format!("/api/v1/residents/{}", c.id)))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_hostel_is_not_found() {
    let (service, _, _) = build_service();
    let router = inventory_router(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/hostels/hostel-nope"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_use_the_error_shape() {
    let (service, _, _) = build_service();
    let hostel = hostel_with(&service, single_rooms()).await;
    let router = inventory_router(service);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/hostels")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload.get("error").and_then(Value::as_str).is_some());

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/hostels/{}/residents", hostel.id()),
            json!({ "name": "Nobody" }),
        ))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("duration_months"));
}
