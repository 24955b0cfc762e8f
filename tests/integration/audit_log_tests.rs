//! Audit log endpoint integration tests
//!
//! Exercises `GET /api/audit-logs` end to end: validation, filtering,
//! pagination metadata and store failures.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Duration;
use rstest::rstest;
use serde_json::Value;

use crate::common::{
    at, staff, AuditEntryFactory, AuditFixtures, MockAuditLogStore, MockError, TestApp,
    MOCK_DEFAULT_LIMIT,
};

async fn mock_app() -> (TestApp, MockAuditLogStore) {
    let store = MockAuditLogStore::new();
    let app = TestApp::with_store(Arc::new(store.clone())).await;
    (app, store)
}

fn ids(json: &Value) -> Vec<i64> {
    json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|e| e["id"].as_i64().expect("entry id"))
        .collect()
}

#[tokio::test]
async fn test_no_parameters_returns_default_page_unfiltered() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let response = app.get("/api/audit-logs").await;
    response.assert_ok();

    let json: Value = response.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["limit"], 100);
    assert_eq!(json["pagination"]["offset"], 0);
    assert_eq!(json["pagination"]["hasMore"], false);
}

#[tokio::test]
async fn test_entries_are_newest_first() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let json: Value = app.get("/api/audit-logs").await.json();
    let timestamps: Vec<String> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["timestamp"].as_str().unwrap().to_string())
        .collect();

    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted);
}

#[tokio::test]
async fn test_entry_shape() {
    let app = TestApp::new().await;
    app.seed(vec![AuditFixtures::order_void()]).await;

    let json: Value = app.get("/api/audit-logs").await.json();
    let entry = &json["data"][0];

    assert_eq!(entry["staff_id"], staff::CASHIER);
    assert_eq!(entry["entity_type"], "order");
    assert_eq!(entry["entity_id"], "1042");
    assert_eq!(entry["action_type"], "delete");
    assert_eq!(entry["payload"]["reason"], "customer left");
    assert!(entry["timestamp"]
        .as_str()
        .unwrap()
        .starts_with("2024-01-02T12:40:00"));
}

#[tokio::test]
async fn test_round_trip_by_entity_type() {
    let app = TestApp::new().await;
    let n = 12;
    app.seed(AuditEntryFactory::new("menu_item").create_many(n)).await;
    app.seed(AuditEntryFactory::new("inventory").create_many(4)).await;

    let response = app
        .get(&format!("/api/audit-logs?entity_type=menu_item&limit={}", n + 10))
        .await;
    response.assert_ok();

    let json: Value = response.json();
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), n);
    assert!(data.iter().all(|e| e["entity_type"] == "menu_item"));
    assert_eq!(json["pagination"]["total"], n as u64);
    assert_eq!(json["pagination"]["hasMore"], false);
}

#[tokio::test]
async fn test_filters_are_combined() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let response = app
        .get(&format!(
            "/api/audit-logs?staff_id={}&entity_type=inventory&action_type=update",
            staff::KITCHEN
        ))
        .await;
    let json: Value = response.json();

    assert_eq!(json["pagination"]["total"], 2);
    for entry in json["data"].as_array().unwrap() {
        assert_eq!(entry["staff_id"], staff::KITCHEN);
        assert_eq!(entry["entity_type"], "inventory");
    }
}

#[tokio::test]
async fn test_entity_id_filter_is_exact() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let json: Value = app.get("/api/audit-logs?entity_id=bun").await.json();
    assert_eq!(json["pagination"]["total"], 0);

    let json: Value = app.get("/api/audit-logs?entity_id=buns").await.json();
    assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_single_day_range_covers_whole_day() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    // Inventory entries sit at 06:00, 07:00 and 23:00 on 2024-01-03
    let json: Value = app
        .get("/api/audit-logs?start_date=2024-01-03&end_date=2024-01-03")
        .await
        .json();

    assert_eq!(json["pagination"]["total"], 3);
    assert!(json["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["entity_type"] == "inventory"));
}

#[tokio::test]
async fn test_day_boundaries_are_inclusive_to_the_millisecond() {
    let app = TestApp::new().await;
    let midnight = at(2024, 3, 10, 0, 0);
    let entries = AuditEntryFactory::new("order")
        .starting_at(midnight - Duration::milliseconds(1))
        .every(Duration::milliseconds(1))
        .create_many(3);
    // 23:59:59.999 on the 9th, 00:00:00.000 and 00:00:00.001 on the 10th
    app.seed(entries).await;

    let json: Value = app.get("/api/audit-logs?start_date=2024-03-10").await.json();
    assert_eq!(json["pagination"]["total"], 2);

    let json: Value = app.get("/api/audit-logs?end_date=2024-03-09").await.json();
    assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_date_time_input_uses_its_calendar_day() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    // 15:30 on the 3rd still covers the 06:00 entry of that day
    let json: Value = app
        .get("/api/audit-logs?start_date=2024-01-03T15:30:00Z")
        .await
        .json();
    assert_eq!(json["pagination"]["total"], 3);
}

#[tokio::test]
async fn test_last_partial_page() {
    let app = TestApp::new().await;
    app.seed(AuditEntryFactory::new("order").create_many(25)).await;

    let json: Value = app.get("/api/audit-logs?limit=10&offset=20").await.json();

    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["pagination"]["total"], 25);
    assert_eq!(json["pagination"]["limit"], 10);
    assert_eq!(json["pagination"]["offset"], 20);
    assert_eq!(json["pagination"]["hasMore"], false);
}

#[tokio::test]
async fn test_pages_do_not_overlap() {
    let app = TestApp::new().await;
    app.seed(AuditEntryFactory::new("order").create_many(25)).await;

    let first: Value = app.get("/api/audit-logs?limit=10").await.json();
    let second: Value = app.get("/api/audit-logs?limit=10&offset=10").await.json();

    assert_eq!(first["pagination"]["hasMore"], true);
    assert_eq!(second["pagination"]["hasMore"], true);

    let first_ids = ids(&first);
    let second_ids = ids(&second);
    assert_eq!(first_ids.len(), 10);
    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
}

#[tokio::test]
async fn test_offset_past_end_returns_empty_page() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let json: Value = app.get("/api/audit-logs?offset=50").await.json();

    assert!(json["data"].as_array().unwrap().is_empty());
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["hasMore"], false);
}

#[tokio::test]
async fn test_configured_default_page_size() {
    let mut config = crate::common::test_config();
    config.audit.default_page_size = 2;
    let app = TestApp::with_config(config).await;
    app.seed(AuditFixtures::all()).await;

    let json: Value = app.get("/api/audit-logs").await.json();

    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["hasMore"], true);
}

#[rstest]
#[case("1001")]
#[case("5000")]
#[case("18446744073709551616")]
#[tokio::test]
async fn test_large_limit_is_clamped(#[case] limit: &str) {
    let (app, store) = mock_app().await;
    store.extend(AuditEntryFactory::new("order").create_many(3));

    let response = app.get(&format!("/api/audit-logs?limit={}", limit)).await;
    response.assert_ok();

    let json: Value = response.json();
    assert_eq!(json["pagination"]["limit"], 1000);
}

#[tokio::test]
async fn test_absent_limit_uses_store_default() {
    let (app, store) = mock_app().await;
    store.extend(AuditEntryFactory::new("order").create_many(MOCK_DEFAULT_LIMIT as usize + 5));

    let json: Value = app.get("/api/audit-logs").await.json();

    assert_eq!(json["pagination"]["limit"], MOCK_DEFAULT_LIMIT);
    assert_eq!(
        json["data"].as_array().unwrap().len(),
        MOCK_DEFAULT_LIMIT as usize
    );
    assert_eq!(json["pagination"]["hasMore"], true);
}

#[rstest]
#[case("limit=0", "limit")]
#[case("limit=-3", "limit")]
#[case("limit=many", "limit")]
#[case("offset=-1", "offset")]
#[case("offset=later", "offset")]
#[case("staff_id=abc", "staff_id")]
#[case("start_date=not-a-date", "start_date")]
#[case("end_date=2024-02-31", "end_date")]
#[tokio::test]
async fn test_invalid_parameter_is_rejected_before_store(
    #[case] query: &str,
    #[case] field: &str,
) {
    let (app, store) = mock_app().await;

    let response = app.get(&format!("/api/audit-logs?{}", query)).await;
    response.assert_bad_request();

    let json: Value = response.json();
    assert_eq!(
        json,
        serde_json::json!({ "error": format!("Invalid {} parameter", field) })
    );
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_staff_id_error_reported_first() {
    let (app, store) = mock_app().await;

    let response = app
        .get("/api/audit-logs?offset=-1&limit=0&end_date=x&start_date=y&staff_id=abc")
        .await;

    response.assert_bad_request();
    let json: Value = response.json();
    assert_eq!(json["error"], "Invalid staff_id parameter");
    assert_eq!(store.query_count(), 0);
}

#[tokio::test]
async fn test_validation_order_after_staff_id() {
    let (app, _store) = mock_app().await;

    let json: Value = app
        .get("/api/audit-logs?offset=-1&limit=0&end_date=x&start_date=y")
        .await
        .json();
    assert_eq!(json["error"], "Invalid start_date parameter");

    let json: Value = app
        .get("/api/audit-logs?offset=-1&limit=0&end_date=x")
        .await
        .json();
    assert_eq!(json["error"], "Invalid end_date parameter");

    let json: Value = app.get("/api/audit-logs?offset=-1&limit=0").await.json();
    assert_eq!(json["error"], "Invalid limit parameter");
}

#[tokio::test]
async fn test_store_failure_returns_server_error() {
    let (app, store) = mock_app().await;
    store.set_error_mode(MockError::ConnectionRefused);

    let response = app.get("/api/audit-logs?entity_type=order").await;
    response.assert_server_error();

    let json: Value = response.json();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Failed to retrieve audit logs");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_closed_database_returns_server_error() {
    let app = TestApp::new().await;
    app.state.db.close().await;

    let response = app.get("/api/audit-logs").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

#[rstest]
#[case("start_date=%2B10000-01-01", "start_date")]
#[case("end_date=%2B10000-01-01", "end_date")]
#[case("end_date=%2B262142-12-31", "end_date")]
#[tokio::test]
async fn test_dates_beyond_year_9999_are_rejected(#[case] query: &str, #[case] field: &str) {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let response = app.get(&format!("/api/audit-logs?{}", query)).await;
    response.assert_bad_request();

    let json: Value = response.json();
    assert_eq!(json["error"], format!("Invalid {} parameter", field));
}

#[tokio::test]
async fn test_last_four_digit_day_includes_everything() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    let json: Value = app
        .get("/api/audit-logs?start_date=0000-01-01&end_date=9999-12-31")
        .await
        .json();
    assert_eq!(json["pagination"]["total"], 5);
}

#[tokio::test]
async fn test_padded_entity_id_matches_exactly() {
    let app = TestApp::new().await;
    app.seed(AuditFixtures::all()).await;

    // Order fixture is stored with entity_id "1042"
    let json: Value = app.get("/api/audit-logs?entity_id=%201042%20").await.json();
    assert_eq!(json["pagination"]["total"], 0);

    let json: Value = app.get("/api/audit-logs?entity_id=1042").await.json();
    assert_eq!(json["pagination"]["total"], 1);
}
