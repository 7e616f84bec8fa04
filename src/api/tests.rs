#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use super::*;
use crate::{ai::Advisor, errors::Result, test_utils::*};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Result<(Router, Marketplace)> {
    let (db, fixture) = setup_marketplace().await?;
    let router = build_router(AppState::new(db, Advisor::disabled(), Settings::default()));
    Ok((router, fixture))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn order_body(fixture: &Marketplace, quantity: i32) -> Value {
    json!({
        "vendor_id": fixture.vendor_id,
        "supplier_id": fixture.supplier_id,
        "items": [{ "product_id": fixture.product.id, "quantity": quantity }],
        "delivery_address": "Karol Bagh Market, Stall 12",
    })
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let (router, _) = app().await?;
    let (status, body) = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["ai_provider"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_register_and_fetch_users() -> Result<()> {
    let (router, _) = app().await?;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({
            "phone": "9811111111",
            "name": "Ramesh",
            "role": "supplier",
            "latitude": 28.6627,
            "longitude": 77.1909,
            "supplier": { "business_name": "Ramesh Sabzi", "is_online": true },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "supplier");
    assert_eq!(body["supplier"]["business_name"], "Ramesh Sabzi");
    let user_id = body["user"]["id"].as_i64().unwrap();

    let (status, body) = send(&router, Method::GET, &format!("/api/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ramesh");

    let (status, body) = send(&router, Method::GET, "/api/users/by-phone/9811111111", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supplier"]["is_online"], true);

    let (status, body) = send(
        &router,
        Method::PATCH,
        &format!("/api/users/{user_id}"),
        Some(json!({ "address": "Naraina" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "Naraina");

    let (status, body) = send(&router, Method::GET, "/api/users/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/users",
        Some(json!({ "phone": "9811111111", "name": "Copy", "role": "vendor" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    Ok(())
}

#[tokio::test]
async fn test_order_lifecycle_over_http() -> Result<()> {
    let (router, fixture) = app().await?;

    let (status, order) = send(&router, Method::POST, "/api/orders", Some(order_body(&fixture, 5))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total_amount"], 150.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["overdue"], false);
    let id = order["id"].as_i64().unwrap();

    let status_uri = format!("/api/orders/{id}/status");
    let (status, body) = send(
        &router,
        Method::PATCH,
        &status_uri,
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    for next in ["confirmed", "preparing", "out_for_delivery", "delivered"] {
        let (status, body) = send(&router, Method::PATCH, &status_uri, Some(json!({ "status": next }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], next);
    }

    let (status, details) = send(&router, Method::GET, &format!("/api/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["vendor"]["stall_name"], "Test Stall");
    assert_eq!(details["supplier"]["user"]["id"], fixture.supplier_user_id);
    assert!(details["actual_delivery_time"].is_string());

    let (status, listed) = send(
        &router,
        Method::GET,
        &format!("/api/orders/vendor/{}", fixture.vendor_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let can_review_uri = format!(
        "/api/reviews/can-review?order_id={id}&reviewer_id={}",
        fixture.vendor_user_id
    );
    let (status, body) = send(&router, Method::GET, &can_review_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_review"], true);

    let (status, review) = send(
        &router,
        Method::POST,
        "/api/reviews",
        Some(json!({ "order_id": id, "reviewer_id": fixture.vendor_user_id, "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["reviewee_id"], fixture.supplier_user_id);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/reviews",
        Some(json!({ "order_id": id, "reviewer_id": fixture.vendor_user_id, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_review");

    let (_, body) = send(&router, Method::GET, &can_review_uri, None).await;
    assert_eq!(body["can_review"], false);

    let (status, stats) = send(
        &router,
        Method::GET,
        &format!("/api/suppliers/{}/stats", fixture.supplier_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_orders"], 1);
    assert_eq!(stats["total_revenue"], 150.0);
    assert_eq!(stats["average_rating"], 4.0);
    Ok(())
}

#[tokio::test]
async fn test_order_errors_over_http() -> Result<()> {
    let (router, fixture) = app().await?;

    let (status, body) = send(&router, Method::POST, "/api/orders", Some(order_body(&fixture, 500))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient_stock");

    let (status, body) = send(
        &router,
        Method::PATCH,
        "/api/orders/4242/status",
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&router, Method::GET, "/api/orders/4242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_emergency_queue_and_notifications() -> Result<()> {
    let (router, fixture) = app().await?;

    let mut urgent = order_body(&fixture, 2);
    urgent["is_emergency"] = json!(true);
    let (status, order) = send(&router, Method::POST, "/api/orders", Some(urgent)).await;
    assert_eq!(status, StatusCode::CREATED);
    send(&router, Method::POST, "/api/orders", Some(order_body(&fixture, 1))).await;

    let (status, queue) = send(&router, Method::GET, "/api/orders/emergency", None).await;
    assert_eq!(status, StatusCode::OK);
    let queue = queue.as_array().cloned().unwrap_or_default();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["id"], order["id"]);

    let (status, inbox) = send(
        &router,
        Method::GET,
        &format!("/api/notifications/{}", fixture.supplier_user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let inbox = inbox.as_array().cloned().unwrap_or_default();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[1]["category"], "emergency");

    let notification_id = inbox[0]["id"].as_i64().unwrap();
    let (status, read) = send(
        &router,
        Method::PATCH,
        &format!("/api/notifications/{notification_id}/read"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["is_read"], true);
    Ok(())
}

#[tokio::test]
async fn test_proximity_endpoints() -> Result<()> {
    let (router, fixture) = app().await?;

    let (status, nearby) = send(
        &router,
        Method::GET,
        "/api/suppliers/nearby?lat=28.6627&lon=77.1909",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nearby[0]["id"], fixture.supplier_id);
    assert_eq!(nearby[0]["distance_km"], 1.2);

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/suppliers/nearby?lat=95&lon=77.1909",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_coordinates");

    let (status, found) = send(&router, Method::GET, "/api/products/search?query=ONION", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["name"], "Onions");
    assert!(found[0]["distance_km"].is_null());

    let (status, body) = send(&router, Method::GET, "/api/products/search?query=onion&lat=28.6", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_coordinates");

    let (status, offline) = send(
        &router,
        Method::PATCH,
        &format!("/api/suppliers/{}/status", fixture.supplier_id),
        Some(json!({ "is_online": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(offline["is_online"], false);

    let (_, found) = send(&router, Method::GET, "/api/products/category/vegetables", None).await;
    assert_eq!(found, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_malformed_query_parameters() -> Result<()> {
    let (router, _) = app().await?;

    for uri in [
        "/api/suppliers/nearby?lat=abc&lon=77.19",
        "/api/suppliers/nearby?lon=77.19",
        "/api/products/search?query=onion&lat=abc&lon=77.19",
        "/api/products/category/vegetables?lat=28.65&lon=",
    ] {
        let (status, body) = send(&router, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "invalid_coordinates", "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }

    let (status, body) = send(
        &router,
        Method::GET,
        "/api/suppliers/nearby?lat=28.65&lon=77.19&radius=far",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    Ok(())
}

#[tokio::test]
async fn test_product_endpoints() -> Result<()> {
    let (router, fixture) = app().await?;

    let (status, created) = send(
        &router,
        Method::POST,
        "/api/products",
        Some(json!({
            "supplier_id": fixture.supplier_id,
            "name": "Green Chillies",
            "category": "Vegetables",
            "unit": "kg",
            "price_per_unit": 60.0,
            "stock_quantity": 20,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "vegetables");

    let (status, updated) = send(
        &router,
        Method::PATCH,
        &format!("/api/products/{}/stock", fixture.product.id),
        Some(json!({ "stock_quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock_quantity"], 3);

    let (status, withdrawn) = send(
        &router,
        Method::PATCH,
        &format!("/api/products/{}/availability", fixture.product.id),
        Some(json!({ "is_available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(withdrawn["is_available"], false);

    let (status, listed) = send(
        &router,
        Method::GET,
        &format!("/api/suppliers/{}/products", fixture.supplier_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let (status, stats) = send(
        &router,
        Method::GET,
        &format!("/api/vendors/{}/stats", fixture.vendor_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_orders"], 0);
    Ok(())
}

#[tokio::test]
async fn test_ai_endpoints_degrade() -> Result<()> {
    let (router, _) = app().await?;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/ai/recommendations",
        Some(json!({
            "category": "vegetables",
            "latitude": 28.6519,
            "longitude": 77.1909,
            "urgency": "high",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["recommendations"], json!([]));

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/ai/quality-check",
        Some(json!({ "image": "AAAA", "product_type": "tomatoes" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quality_score"], 0.0);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/ai/price-negotiation",
        Some(json!({ "current_price": 40.0, "target_price": 35.0, "context": "daily order" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert!(body["message"].is_string());
    Ok(())
}
