use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Madrid;
use proptest::prelude::*;
use reservation_hours::adapters::MemoryStore;
use reservation_hours::core::slots::in_gap_window;
use reservation_hours::{AvailabilityEngine, DayRule, ShiftRule};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Week {
    open: NaiveTime,
    last: NaiveTime,
    advance: u32,
    step: u32,
}

fn minutes(total: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(total / 60, total % 60, 0).unwrap()
}

fn week_strategy() -> impl Strategy<Value = Week> {
    (40u32..=84, 0u32..=12, 0u32..=180, prop_oneof![Just(15u32), Just(20), Just(30)]).prop_map(
        |(open_quarter, span, advance, step)| {
            let open = open_quarter * 15;
            let last = (open + span * 15).min(23 * 60);
            Week {
                open: minutes(open),
                last: minutes(last),
                advance,
                step,
            }
        },
    )
}

fn engine_for(week: &Week) -> AvailabilityEngine<MemoryStore> {
    let close = week.last + ChronoDuration::minutes(30);
    let rows = (0..7)
        .map(|day| {
            DayRule::dinner_only(
                day,
                ShiftRule::enabled(week.open, close, week.last, week.advance),
                week.step,
            )
        })
        .collect();
    AvailabilityEngine::new(MemoryStore::new(rows, None), Madrid, Duration::from_secs(2))
}

fn madrid_now(minute_of_day: u32) -> DateTime<Utc> {
    Madrid
        .with_ymd_and_hms(2026, 10, 20, minute_of_day / 60, minute_of_day % 60, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn date_at(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 20).unwrap() + ChronoDuration::days(offset)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn slots_stay_within_service_and_outside_gap(
        week in week_strategy(),
        offset in 0i64..7,
        now_minute in 0u32..1440,
    ) {
        let engine = engine_for(&week);
        let result = tokio_test::block_on(engine.available_slots(date_at(offset), madrid_now(now_minute)));

        for slot in &result.slots {
            prop_assert!(slot.time >= week.open && slot.time <= week.last);
            prop_assert!(!(slot.available && in_gap_window(slot.time)));
        }
    }

    #[test]
    fn available_slots_respect_lead_time(
        week in week_strategy(),
        offset in 0i64..3,
        now_minute in 0u32..1440,
    ) {
        let engine = engine_for(&week);
        let now = madrid_now(now_minute);
        let date = date_at(offset);
        let result = tokio_test::block_on(engine.available_slots(date, now));

        let earliest = now + ChronoDuration::minutes(i64::from(week.advance));
        for slot in result.slots.iter().filter(|s| !in_gap_window(s.time)) {
            if offset > 0 {
                prop_assert!(slot.available);
                continue;
            }
            let instant = Madrid
                .from_local_datetime(&date.and_time(slot.time))
                .earliest()
                .unwrap()
                .with_timezone(&Utc);
            prop_assert_eq!(slot.available, instant > earliest);
        }
    }

    #[test]
    fn validation_agrees_with_listing(
        week in week_strategy(),
        offset in -1i64..4,
        now_minute in 0u32..1440,
    ) {
        let engine = engine_for(&week);
        let now = madrid_now(now_minute);
        let date = date_at(offset);

        tokio_test::block_on(async {
            let listed = engine.available_slots(date, now).await;
            for slot in &listed.slots {
                let check = engine.validate(date, slot.time, now).await;
                prop_assert_eq!(check.valid, slot.available);
                prop_assert_eq!(&check.reason, &slot.reason);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn repeated_queries_are_identical(
        week in week_strategy(),
        offset in 0i64..7,
        now_minute in 0u32..1440,
    ) {
        let engine = engine_for(&week);
        let now = madrid_now(now_minute);
        let first = tokio_test::block_on(engine.available_slots(date_at(offset), now));
        let second = tokio_test::block_on(engine.available_slots(date_at(offset), now));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn past_dates_offer_nothing(
        week in week_strategy(),
        days_back in 1i64..30,
        now_minute in 0u32..1440,
    ) {
        let engine = engine_for(&week);
        let result = tokio_test::block_on(engine.available_slots(date_at(-days_back), madrid_now(now_minute)));
        prop_assert!(result.slots.iter().all(|s| !s.available));
    }
}
