mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::TestApp;

fn report(room: &str, status: &str, date_time: &str) -> Value {
    json!({
        "room": room,
        "category": "Housekeeping",
        "status": status,
        "dateTime": date_time,
    })
}

#[tokio::test]
async fn submit_defaults_remarks_and_normalizes_date_time() {
    let app = TestApp::spawn().await;
    let token = app.login("housekeeper").await;

    let (status, body) = app
        .post(
            "/submit-status-report",
            &token,
            report("204", "vacant_ready", "2024-05-01T09:30"),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["remarks"], "");
    assert_eq!(body["data"]["status"], "vacant_ready");
    assert_eq!(body["data"]["dateTime"], "2024-05-01T09:30:00.000Z");
}

#[tokio::test]
async fn unknown_status_and_missing_fields_are_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login("housekeeper").await;

    let (status, body) = app
        .post(
            "/submit-status-report",
            &token,
            report("204", "sparkling", "2024-05-01T09:30"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("out_of_order"));

    let (status, body) = app
        .post(
            "/submit-status-report",
            &token,
            json!({ "room": "204", "status": "occupied" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing fields");

    let (status, _) = app
        .post(
            "/submit-status-report",
            &token,
            report("204", "occupied", "yesterday"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_is_newest_first_and_filterable() {
    let app = TestApp::spawn().await;
    let token = app.login("housekeeper").await;

    for (room, status, date_time) in [
        ("101", "occupied", "2024-05-01T08:00:00Z"),
        ("102", "departure", "2024-05-02T23:59:00Z"),
        ("103", "occupied", "2024-05-02T00:00:00Z"),
        ("104", "arrival", "2024-05-03T00:00:00Z"),
    ] {
        let (code, _) = app
            .post("/submit-status-report", &token, report(room, status, date_time))
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let rooms = |body: &Value| -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|report| report["room"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, body) = app.get("/status-reports", &token).await;
    assert_eq!(rooms(&body), ["104", "102", "103", "101"]);

    let (_, body) = app.get("/status-reports?date=2024-05-02", &token).await;
    assert_eq!(rooms(&body), ["102", "103"]);

    let (_, body) = app.get("/status-reports?status=occupied", &token).await;
    assert_eq!(rooms(&body), ["103", "101"]);

    let (status, _) = app.get("/status-reports?status=nope", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_validates_status_and_missing_ids_are_not_found() {
    let app = TestApp::spawn().await;
    let token = app.login("housekeeper").await;

    let (_, body) = app
        .post(
            "/submit-status-report",
            &token,
            report("204", "occupied", "2024-05-01T09:30:00Z"),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(
            &format!("/status-reports/{id}"),
            &token,
            json!({ "status": "out_of_order", "remarks": "Leaking tap" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "out_of_order");
    assert_eq!(body["data"]["remarks"], "Leaking tap");
    assert_eq!(body["data"]["room"], "204");

    let (status, _) = app
        .put(&format!("/status-reports/{id}"), &token, json!({ "status": "broken" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete(&format!("/status-reports/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/status-reports/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/status-reports/missing", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
