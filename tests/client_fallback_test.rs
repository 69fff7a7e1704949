use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Europe::Madrid;
use httpmock::prelude::*;
use reservation_hours::adapters::AvailabilityClient;
use reservation_hours::core::loader::default_weekly_rules;
use reservation_hours::{RulesSource, SlotCheck};
use serde_json::json;
use std::time::Duration;

fn now() -> DateTime<Utc> {
    "2026-10-20T10:00:00Z".parse().unwrap()
}

fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()
}

fn client(base_url: &str) -> AvailabilityClient {
    AvailabilityClient::new(base_url, Madrid, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_remote_slots_are_used_when_service_answers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/slots")
                .query_param("date", "2026-10-24")
                .query_param("now", "2026-10-20T10:00:00Z");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "date": "2026-10-24",
                    "slots": [{ "time": "20:00", "shift": "dinner", "available": true }],
                    "totalSlots": 1,
                    "availableSlots": 1,
                    "source": "store"
                }
            }));
        })
        .await;

    let reply = client(&server.base_url()).slots(saturday(), now()).await;
    mock.assert_async().await;

    assert!(!reply.degraded);
    assert_eq!(reply.data.total_slots, 1);
    assert_eq!(reply.data.source, RulesSource::Store);
}

#[tokio::test]
async fn test_server_error_falls_back_to_mirror() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/slots");
            then.status(500).body("boom");
        })
        .await;

    let reply = client(&server.base_url()).slots(saturday(), now()).await;

    assert!(reply.degraded);
    assert_eq!(reply.data.source, RulesSource::BuiltinDefault);
    assert_eq!(reply.data.total_slots, 20);
    assert_eq!(reply.data.available_slots, 18);
}

#[tokio::test]
async fn test_unsuccessful_envelope_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/validate");
            then.status(200)
                .json_body(json!({ "success": false, "error": "store offline" }));
        })
        .await;

    let time = NaiveTime::from_hms_opt(18, 15, 0).unwrap();
    let reply = client(&server.base_url()).validate(saturday(), time, now()).await;

    assert!(reply.degraded);
    assert_eq!(
        reply.data,
        SlotCheck::rejected("closed between lunch and dinner service")
    );
}

#[tokio::test]
async fn test_unreachable_service_serves_default_hours() {
    // nothing listens on the discard port
    let reply = client("http://127.0.0.1:9").hours().await;

    assert!(reply.degraded);
    assert_eq!(reply.data.rules, default_weekly_rules());
    assert_eq!(reply.data.source, RulesSource::BuiltinDefault);
    assert!(reply.data.diagnostic.is_some());
}

#[tokio::test]
async fn test_date_status_fallback_keeps_date() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/date-status");
            then.status(503);
        })
        .await;

    let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
    let reply = client(&server.base_url()).date_status(sunday, now()).await;

    assert!(reply.degraded);
    assert_eq!(reply.data.date, sunday);
    assert!(reply.data.status.disabled);
    assert_eq!(
        reply.data.status.reason.as_deref(),
        Some("restaurant closed on Sundays")
    );
}
