mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::TestApp;
use hotel_ops::application::services::notifications::Notification;

fn movement(item: &str, quantity: i64, action: &str) -> Value {
    json!({ "item": item, "quantity": quantity, "action": action })
}

async fn stock(app: &TestApp, token: &str, item: &str, quantity: i64, level: i64) -> String {
    let (status, body) = app
        .post(
            "/inventory",
            token,
            json!({ "item": item, "quantity": quantity, "action": "add", "lowStockLevel": level }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn add_creates_item_with_default_threshold() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;

    let (status, body) = app.post("/inventory", &token, movement("Soap", 25, "add")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"], "Soap");
    assert_eq!(body["data"]["quantity"], 25);
    assert_eq!(body["data"]["lowStockLevel"], 10);
    assert_eq!(body["lowStockAlertQueued"], false);
    assert_eq!(body["transaction"]["action"], "add");
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn names_match_case_insensitively() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let id = stock(&app, &token, "Bath Towel", 20, 5).await;

    let (status, body) = app
        .post("/inventory", &token, movement("bath towel", 5, "add"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["quantity"], 25);
    assert_eq!(body["transaction"]["item"], "Bath Towel");

    let (_, body) = app.get("/inventory", &token).await;
    assert_eq!(body["results"], 1);
}

#[tokio::test]
async fn use_beyond_stock_is_rejected_and_leaves_quantity() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let id = stock(&app, &token, "Soap", 4, 1).await;

    let (status, body) = app.post("/inventory", &token, movement("Soap", 5, "use")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot use 5 units. Only 4 are in stock.");

    let (_, body) = app.get(&format!("/inventory/{id}"), &token).await;
    assert_eq!(body["data"]["quantity"], 4);

    let (_, body) = app.get("/inventory/transactions", &token).await;
    assert_eq!(body["results"], 1);
}

#[tokio::test]
async fn use_decrements_exactly_and_ledgers_once() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    stock(&app, &token, "Shampoo", 30, 5).await;

    let (status, body) = app
        .post("/inventory", &token, movement("Shampoo", 7, "use"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 23);

    let (_, body) = app.get("/inventory/transactions?item=shampoo", &token).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["action"], "use");
    assert_eq!(rows[0]["quantity"], 7);
    assert_eq!(rows[1]["action"], "add");
}

#[tokio::test]
async fn use_of_unknown_item_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;

    let (status, body) = app.post("/inventory", &token, movement("Ghost", 1, "use")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found in inventory");
}

#[tokio::test]
async fn invalid_movements_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;

    for body in [
        json!({ "item": "Soap", "action": "add" }),
        json!({ "quantity": 3, "action": "add" }),
        movement("Soap", 0, "add"),
        movement("Soap", -2, "add"),
        movement("Soap", 2, "steal"),
    ] {
        let (status, response) = app.post("/inventory", &token, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {response}");
    }
}

#[tokio::test]
async fn low_stock_boundary_is_inclusive() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    stock(&app, &token, "Soap", 12, 5).await;

    let (_, body) = app.post("/inventory", &token, movement("Soap", 6, "use")).await;
    assert_eq!(body["data"]["quantity"], 6);
    assert_eq!(body["lowStockAlertQueued"], false);
    assert!(app.notifier.sent().is_empty());

    let (_, body) = app.post("/inventory", &token, movement("Soap", 1, "use")).await;
    assert_eq!(body["data"]["quantity"], 5);
    assert_eq!(body["lowStockAlertQueued"], true);

    let sent = app.notifier.sent();
    assert_eq!(
        sent,
        vec![Notification::LowStock {
            item: "Soap".to_string(),
            quantity: 5,
            low_stock_level: 5,
        }]
    );
}

#[tokio::test]
async fn supplied_threshold_overwrites_existing_level() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    stock(&app, &token, "Soap", 20, 5).await;

    let (_, body) = app
        .post(
            "/inventory",
            &token,
            json!({ "item": "Soap", "quantity": 1, "action": "add", "lowStockThreshold": 30 }),
        )
        .await;
    assert_eq!(body["data"]["lowStockLevel"], 30);
    assert_eq!(body["lowStockAlertQueued"], true);
}

#[tokio::test]
async fn concurrent_uses_never_drive_stock_negative() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let id = stock(&app, &token, "Soap", 10, 0).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = app.router.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            let request = axum::http::Request::builder()
                .method("POST")
                .uri("/inventory")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(axum::body::Body::from(movement("Soap", 3, "use").to_string()))
                .unwrap();
            tower::ServiceExt::oneshot(router, request)
                .await
                .unwrap()
                .status()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::OK {
            successes += 1;
        }
    }

    assert!(successes <= 3, "{successes} uses of 3 fit in 10 units");
    let (_, body) = app.get(&format!("/inventory/{id}"), &token).await;
    let remaining = body["data"]["quantity"].as_i64().unwrap();
    assert!(remaining >= 0);
    assert_eq!(remaining, 10 - 3 * successes);

    let (_, body) = app.get("/inventory/transactions", &token).await;
    let uses = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|row| row["action"] == "use")
        .count() as i64;
    assert_eq!(uses, successes);
}

#[tokio::test]
async fn put_overwrites_without_ledger_and_rejects_duplicate_names() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let soap = stock(&app, &token, "Soap", 20, 5).await;
    stock(&app, &token, "Towel", 20, 5).await;

    let (status, body) = app
        .put(&format!("/inventory/{soap}"), &token, json!({ "quantity": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["lowStockAlertQueued"], true);
    assert_eq!(app.notifier.sent().len(), 1);

    let (_, body) = app.get("/inventory/transactions", &token).await;
    assert_eq!(body["results"], 2);

    let (status, _) = app
        .put(&format!("/inventory/{soap}"), &token, json!({ "item": "towel" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .put(&format!("/inventory/{soap}"), &token, json!({ "quantity": -1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&format!("/inventory/{soap}"), &token, json!({ "item": "SOAP" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"], "SOAP");

    let (status, _) = app
        .put("/inventory/missing", &token, json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_item_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let id = stock(&app, &token, "Soap", 1, 0).await;

    assert_eq!(app.delete(&format!("/inventory/{id}"), &token).await.0, StatusCode::OK);
    assert_eq!(
        app.delete(&format!("/inventory/{id}"), &token).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn snapshot_replays_the_ledger() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    stock(&app, &token, "Soap", 10, 4).await;
    stock(&app, &token, "Towel", 6, 2).await;
    app.post("/inventory", &token, movement("Soap", 3, "use")).await;
    let towel = app.get("/inventory", &token).await.1["data"][1]["id"]
        .as_str()
        .unwrap()
        .to_string();
    app.delete(&format!("/inventory/{towel}"), &token).await;

    let today = chrono::Utc::now().date_naive();
    let (status, body) = app
        .get(&format!("/inventory/snapshot/{today}"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            { "item": "Soap", "quantity": 7, "lowStockLevel": 4 },
            { "item": "Towel", "quantity": 6, "lowStockLevel": 0 },
        ])
    );

    let (_, body) = app.get("/inventory/snapshot/2000-01-01", &token).await;
    assert_eq!(body["data"], json!([]));

    let (status, _) = app.get("/inventory/snapshot/yesterday", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quantities_above_the_ceiling_are_rejected_without_reaching_the_store() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let ceiling = hotel_ops::domain::models::inventory::MAX_STOCK_QUANTITY;

    let (status, body) = app
        .post("/inventory", &token, movement("Soap", i64::MAX, "add"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    let id = stock(&app, &token, "Soap", ceiling, 0).await;
    let (status, body) = app.post("/inventory", &token, movement("Soap", 1, "add")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["status"], "fail");

    let (_, body) = app.get(&format!("/inventory/{id}"), &token).await;
    assert_eq!(body["data"]["quantity"], ceiling);

    let (status, _) = app
        .put(&format!("/inventory/{id}"), &token, json!({ "quantity": i64::MAX }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/inventory/transactions", &token).await;
    assert_eq!(body["results"], 1);
}

#[tokio::test]
async fn snapshot_survives_refills_after_a_reset() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;
    let ceiling = hotel_ops::domain::models::inventory::MAX_STOCK_QUANTITY;
    let id = stock(&app, &token, "Soap", ceiling, 0).await;

    let (status, _) = app
        .put(&format!("/inventory/{id}"), &token, json!({ "quantity": 0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    stock(&app, &token, "Soap", ceiling, 0).await;

    let today = chrono::Utc::now().date_naive();
    let (status, body) = app
        .get(&format!("/inventory/snapshot/{today}"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["quantity"], 2 * ceiling);
}

#[tokio::test]
async fn malformed_bodies_use_the_fail_envelope() {
    let app = TestApp::spawn().await;
    let token = app.login("storekeeper").await;

    let (status, body) = app
        .post(
            "/inventory",
            &token,
            json!({ "item": "Soap", "quantity": "5", "action": "add" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/inventory")
        .header("authorization", format!("Bearer {token}"))
        .body(axum::body::Body::from(movement("Soap", 5, "add").to_string()))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    let (_, body) = app.get("/inventory", &token).await;
    assert_eq!(body["results"], 0);
}
