//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use flowcast_core::db::Database;
use flowcast_core::models::{NewTransaction, TransactionType};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn setup_test_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), None, ServerConfig::default());
    (app, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Seed a monthly charge series ending a few days before now, so the
/// wall-clock-based detection endpoint sees it as recent
fn seed_monthly_series(db: &Database, account_id: i64, description: &str, amount_cents: i64) {
    let end = Utc::now().date_naive() - Duration::days(5);
    for i in 0..5i64 {
        let tx = NewTransaction {
            date: end - Duration::days(30 * (4 - i)),
            amount_cents,
            counterparty: None,
            description: description.to_string(),
            transaction_type: TransactionType::Debit,
            category_id: None,
        };
        db.insert_transaction(account_id, &tx).unwrap().unwrap();
    }
}

// ========== Account API Tests ==========

#[tokio::test]
async fn test_list_accounts_empty() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_and_get_account() {
    let (app, _db) = setup_test_app();

    let body = serde_json::json!({
        "name": "Joint checking",
        "account_type": "checking"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/accounts")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["name"], "Joint checking");
    let id = json["id"].as_i64().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/accounts/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_account_rejects_blank_name() {
    let (app, _db) = setup_test_app();

    let body = serde_json::json!({ "name": "   " });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/accounts")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_account_not_found() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/accounts/99999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Transaction API Tests ==========

#[tokio::test]
async fn test_create_transaction_and_duplicate() {
    let (app, db) = setup_test_app();
    let account_id = db.upsert_account("Checking", None).unwrap();

    let body = serde_json::json!({
        "account_id": account_id,
        "date": "2024-06-01",
        "amount_cents": -1499,
        "description": "NETFLIX.COM",
        "transaction_type": "debit"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transactions")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["duplicate"], false);

    // Same payload again is flagged as a duplicate
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transactions")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["duplicate"], true);
}

// ========== Detection API Tests ==========

#[tokio::test]
async fn test_detect_endpoint_finds_patterns() {
    let (app, db) = setup_test_app();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/accounts/{}/recurring/detect", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["patterns"][0]["merchant_pattern"], "NETFLIX.COM");
    assert_eq!(json["patterns"][0]["frequency"], "monthly");
}

#[tokio::test]
async fn test_detect_endpoint_unknown_account() {
    let (app, _db) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/accounts/404/recurring/detect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_detect_force_resets_overrides() {
    let (app, db) = setup_test_app();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);

    // First detection, then user renames the pattern
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/accounts/{}/recurring/detect", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let id = json["patterns"][0]["id"].as_i64().unwrap();

    let body = serde_json::json!({ "display_name": "Family Netflix" });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/recurring/{}", id))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["display_name"], "Family Netflix");

    // Merge re-detection keeps the rename
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/accounts/{}/recurring/detect", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["patterns"][0]["display_name"], "Family Netflix");

    // Force re-detection discards it
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/accounts/{}/recurring/detect?force=true",
                    account_id
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["patterns"][0]["display_name"], "NETFLIX.COM");
}

// ========== Recurring Read Path Tests ==========

#[tokio::test]
async fn test_recurring_list_summary_and_upcoming() {
    let (app, db) = setup_test_app();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);
    seed_monthly_series(&db, account_id, "CITY GYM", -2500);

    // Detect via API
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/accounts/{}/recurring/detect", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // List
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/recurring?account_id={}", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    // Frequency filter
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/recurring?frequency=monthly")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    // Summary
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/recurring/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["total_patterns"], 2);
    assert_eq!(json["active_patterns"], 2);
    assert_eq!(json["monthly_debit_cents"], 1499 + 2500);

    // Upcoming: both monthly patterns charge within ~25-55 days of now
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recurring/upcoming?days=60")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_deactivation_hides_from_forecast() {
    let (app, db) = setup_test_app();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/accounts/{}/recurring/detect", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let id = json["patterns"][0]["id"].as_i64().unwrap();

    // Soft delete
    let body = serde_json::json!({ "is_active": false });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/recurring/{}", id))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recurring/upcoming?days=60")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_forecast_endpoint() {
    let (app, db) = setup_test_app();
    let account_id = db.upsert_account("Checking", None).unwrap();
    seed_monthly_series(&db, account_id, "NETFLIX.COM", -1499);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/accounts/{}/recurring/detect", account_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/forecast")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    // Shape is stable even when the next charge falls outside this month
    assert!(json["expected_debit_cents"].as_i64().unwrap() >= 0);
    assert!(json["month_start"].is_string());
    assert!(json["items"].is_array());
}
