use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Madrid;
use reservation_hours::adapters::MemoryStore;
use reservation_hours::core::loader::default_weekly_rules;
use reservation_hours::{AvailabilityEngine, DayRule, RulesSource, Shift, ShiftRule, SlotCheck};
use std::time::Duration;

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Madrid
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn engine_with(rows: Vec<DayRule>, text: Option<&str>) -> AvailabilityEngine<MemoryStore> {
    AvailabilityEngine::new(
        MemoryStore::new(rows, text.map(str::to_string)),
        Madrid,
        Duration::from_secs(2),
    )
}

// 2026-10-20 is a Tuesday
const TUESDAY: u8 = 2;

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
}

#[tokio::test]
async fn test_same_day_lead_time_scenario() {
    let row = DayRule::dinner_only(
        TUESDAY,
        ShiftRule::enabled(t(19, 0), t(23, 0), t(19, 30), 15),
        15,
    );
    let engine = engine_with(vec![row], None);

    let result = engine.available_slots(tuesday(), local(2026, 10, 20, 19, 10)).await;

    let summary: Vec<(String, bool)> = result
        .slots
        .iter()
        .map(|slot| (slot.label(), slot.available))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("19:00".to_string(), false),
            ("19:15".to_string(), false),
            ("19:30".to_string(), true),
        ]
    );
    assert_eq!(result.total(), 3);
    assert_eq!(result.available_count(), 1);
}

#[tokio::test]
async fn test_misconfigured_dinner_opening_in_gap() {
    let row = DayRule::dinner_only(
        TUESDAY,
        ShiftRule::enabled(t(16, 30), t(23, 0), t(19, 0), 30),
        15,
    );
    let engine = engine_with(vec![row], None);
    let future_tuesday = NaiveDate::from_ymd_opt(2026, 10, 27).unwrap();

    let result = engine
        .available_slots(future_tuesday, local(2026, 10, 20, 12, 0))
        .await;

    let at = |h, m| result.slots.iter().find(|s| s.time == t(h, m)).unwrap();
    assert!(!at(17, 0).available);
    assert_eq!(
        at(17, 0).reason.as_deref(),
        Some("closed between lunch and dinner service")
    );
    assert!(at(19, 0).available);
    assert!(at(18, 30).available);
    assert!(!at(16, 45).available);
    assert!(!at(16, 30).available);
}

#[tokio::test]
async fn test_free_text_fallback_scenario() {
    let engine = engine_with(Vec::new(), Some("Tue-Sun: 18:00 - 23:00"));
    let loaded = engine.weekly_hours().await;

    assert_eq!(loaded.source, RulesSource::HoursText);
    assert!(loaded.rules.day(1).unwrap().is_closed());
    for day in [0, 2, 3, 4, 5, 6] {
        let rule = loaded.rules.day(day).unwrap();
        assert!(rule.dinner.enabled, "day {day} should serve dinner");
        assert!(!rule.lunch.enabled);
        assert_eq!(rule.dinner.open, t(18, 0));
        assert_eq!(rule.dinner.close, t(23, 0));
        assert_eq!(rule.dinner.last_reservation, t(22, 30));
    }

    // the fallback week still honours the kitchen gap
    let result = engine
        .available_slots(NaiveDate::from_ymd_opt(2026, 10, 22).unwrap(), local(2026, 10, 20, 12, 0))
        .await;
    let open: Vec<String> = result
        .slots
        .iter()
        .filter(|s| s.available)
        .map(|s| s.label())
        .collect();
    assert_eq!(open.first().map(String::as_str), Some("18:30"));
    assert_eq!(open.last().map(String::as_str), Some("22:30"));
}

#[tokio::test]
async fn test_everything_down_scenario() {
    let engine = AvailabilityEngine::new(MemoryStore::unreachable(), Madrid, Duration::from_secs(2));
    let loaded = engine.weekly_hours().await;

    assert_eq!(loaded.source, RulesSource::BuiltinDefault);
    assert_eq!(loaded.rules, default_weekly_rules());
    assert!(loaded.is_degraded());

    let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
    assert!(engine
        .available_slots(sunday, local(2026, 10, 20, 12, 0))
        .await
        .slots
        .is_empty());
}

#[tokio::test]
async fn test_garbled_text_does_not_produce_partial_week() {
    let engine = engine_with(Vec::new(), Some("Tue-Sun: 18:00 - 23:00; Mon closed"));
    let loaded = engine.weekly_hours().await;
    assert_eq!(loaded.source, RulesSource::BuiltinDefault);
    assert_eq!(loaded.rules, default_weekly_rules());
}

#[tokio::test]
async fn test_validation_follows_current_clock() {
    let row = DayRule::dinner_only(
        TUESDAY,
        ShiftRule::enabled(t(19, 0), t(23, 0), t(22, 0), 30),
        30,
    );
    let engine = engine_with(vec![row], None);

    // rendered at 18:00, submitted at 19:45
    let rendered = engine.available_slots(tuesday(), local(2026, 10, 20, 18, 0)).await;
    assert!(rendered.slots.iter().any(|s| s.time == t(20, 0) && s.available));

    assert_eq!(
        engine.validate(tuesday(), t(20, 0), local(2026, 10, 20, 19, 45)).await,
        SlotCheck::rejected("requires 30 minutes advance booking")
    );
    assert_eq!(
        engine.validate(tuesday(), t(20, 30), local(2026, 10, 20, 19, 45)).await,
        SlotCheck::accepted()
    );
}

#[tokio::test]
async fn test_lunch_and_dinner_never_overlap_and_are_sorted() {
    let mut row = DayRule::dinner_only(
        TUESDAY,
        ShiftRule::enabled(t(19, 0), t(23, 0), t(22, 0), 30),
        30,
    );
    row.lunch = ShiftRule::enabled(t(13, 0), t(16, 30), t(16, 0), 30);
    let engine = engine_with(vec![row], None);

    let result = engine
        .available_slots(NaiveDate::from_ymd_opt(2026, 10, 27).unwrap(), local(2026, 10, 20, 12, 0))
        .await;
    let times: Vec<NaiveTime> = result.slots.iter().map(|s| s.time).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);

    let last_lunch = result
        .slots
        .iter()
        .filter(|s| s.shift == Shift::Lunch)
        .map(|s| s.time)
        .max()
        .unwrap();
    let first_dinner = result
        .slots
        .iter()
        .filter(|s| s.shift == Shift::Dinner)
        .map(|s| s.time)
        .min()
        .unwrap();
    assert!(last_lunch < first_dinner);
}

#[tokio::test]
async fn test_today_is_judged_in_restaurant_zone() {
    let row = DayRule::dinner_only(
        TUESDAY,
        ShiftRule::enabled(t(19, 0), t(23, 0), t(22, 0), 30),
        30,
    );
    let engine = engine_with(vec![row], None);

    // 23:30 UTC on Monday is already 01:30 on Tuesday in Madrid
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
    let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    assert_eq!(
        engine.date_status(monday, now).await.reason.as_deref(),
        Some("date is in the past")
    );
    assert!(!engine.is_date_disabled(tuesday(), now).await);
}

#[tokio::test]
async fn test_long_lead_time_leaves_tomorrow_open() {
    let rows = (0..7)
        .map(|day| {
            DayRule::dinner_only(day, ShiftRule::enabled(t(19, 0), t(23, 0), t(22, 0), 2880), 15)
        })
        .collect();
    let engine = engine_with(rows, None);
    let now = local(2026, 10, 20, 12, 0);

    let tomorrow = engine
        .available_slots(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap(), now)
        .await;
    assert_eq!(tomorrow.total(), 13);
    assert_eq!(tomorrow.available_count(), 13);

    let today = engine.available_slots(tuesday(), now).await;
    assert_eq!(today.available_count(), 0);
    assert_eq!(
        engine.disabled_reason(tuesday(), now).await,
        "no bookable time slots remain today"
    );
}
