use crate::core::clock::{DateKind, RestaurantClock};
use crate::core::loader::{ConfigLoader, LoadedRules, RulesSource};
use crate::core::slots::{check_time, day_slots, PAST_DATE_REASON};
use crate::domain::model::{minutes_of_day, DateStatus, Shift, SlotCheck, TimeSlot, WeeklyRules};
use crate::domain::ports::RulesStore;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const NO_SLOTS_LEFT_REASON: &str = "no bookable time slots remain today";

const WEEKDAY_NAMES: [&str; 7] = [
    "Sundays",
    "Mondays",
    "Tuesdays",
    "Wednesdays",
    "Thursdays",
    "Fridays",
    "Saturdays",
];

pub fn closed_day_reason(day_of_week: u8) -> String {
    let name = WEEKDAY_NAMES
        .get(usize::from(day_of_week))
        .copied()
        .unwrap_or("this day");
    format!("restaurant closed on {name}")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotOptions {
    /// Staff override: ignore the advance-booking lead time. Gap and past-date
    /// rules still apply.
    pub skip_advance_check: bool,
}

impl SlotOptions {
    pub fn staff() -> Self {
        Self {
            skip_advance_check: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub source: RulesSource,
}

impl AvailabilityResult {
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.available).count()
    }
}

/// Computes slots over the pure core for a week resolved by the loader.
pub(crate) fn slots_for(
    rules: &WeeklyRules,
    source: RulesSource,
    date: NaiveDate,
    clock: &RestaurantClock,
    options: SlotOptions,
) -> AvailabilityResult {
    AvailabilityResult {
        date,
        slots: day_slots(rules, date, clock, options.skip_advance_check),
        source,
    }
}

/// Past, closed weekday, then "nothing left today".
pub(crate) fn status_for(rules: &WeeklyRules, date: NaiveDate, clock: &RestaurantClock) -> DateStatus {
    let kind = clock.classify(date);
    if kind == DateKind::Past {
        return DateStatus::disabled(PAST_DATE_REASON);
    }
    let day = rules.for_date(date);
    if day.is_closed() {
        return DateStatus::disabled(closed_day_reason(day.day_of_week));
    }
    if kind == DateKind::Today && !day_slots(rules, date, clock, false).iter().any(|s| s.available) {
        return DateStatus::disabled(NO_SLOTS_LEFT_REASON);
    }
    DateStatus::enabled()
}

/// Reservation availability for one restaurant.
///
/// Each call resolves the weekly rules once and evaluates every date against a
/// single [`RestaurantClock`] built from the caller's `now`.
pub struct AvailabilityEngine<S> {
    loader: ConfigLoader<S>,
    tz: Tz,
    cancel: CancellationToken,
}

impl<S: RulesStore> AvailabilityEngine<S> {
    pub fn new(store: S, tz: Tz, fetch_timeout: Duration) -> Self {
        Self {
            loader: ConfigLoader::new(store, fetch_timeout),
            tz,
            cancel: CancellationToken::new(),
        }
    }

    /// Store fetches abort to the built-in week once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn clock(&self, now: DateTime<Utc>) -> RestaurantClock {
        RestaurantClock::new(self.tz, now)
    }

    pub async fn weekly_hours(&self) -> LoadedRules {
        self.loader.load_with_cancel(&self.cancel).await
    }

    pub async fn available_slots(&self, date: NaiveDate, now: DateTime<Utc>) -> AvailabilityResult {
        self.available_slots_with(date, now, SlotOptions::default())
            .await
    }

    pub async fn available_slots_with(
        &self,
        date: NaiveDate,
        now: DateTime<Utc>,
        options: SlotOptions,
    ) -> AvailabilityResult {
        let loaded = self.weekly_hours().await;
        let result = slots_for(&loaded.rules, loaded.source, date, &self.clock(now), options);
        tracing::debug!(
            %date,
            total = result.total(),
            available = result.available_count(),
            source = loaded.source.as_str(),
            "computed slots"
        );
        result
    }

    /// Re-derives the slots for `date` and checks `time` against them. Nothing
    /// rendered earlier is trusted.
    pub async fn validate(&self, date: NaiveDate, time: NaiveTime, now: DateTime<Utc>) -> SlotCheck {
        let result = self.available_slots(date, now).await;
        let check = check_time(&result.slots, time);
        if !check.valid {
            tracing::info!(
                %date,
                time = %time.format("%H:%M"),
                reason = check.reason.as_deref().unwrap_or_default(),
                "slot rejected"
            );
        }
        check
    }

    pub async fn date_status(&self, date: NaiveDate, now: DateTime<Utc>) -> DateStatus {
        let loaded = self.weekly_hours().await;
        status_for(&loaded.rules, date, &self.clock(now))
    }

    pub async fn is_date_disabled(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        self.date_status(date, now).await.disabled
    }

    /// Empty when the date can be booked.
    pub async fn disabled_reason(&self, date: NaiveDate, now: DateTime<Utc>) -> String {
        self.date_status(date, now).await.reason.unwrap_or_default()
    }

    /// Slots for several dates against one rules load and one clock.
    pub async fn bulk_slots(&self, dates: &[NaiveDate], now: DateTime<Utc>) -> Vec<AvailabilityResult> {
        let loaded = self.weekly_hours().await;
        let clock = self.clock(now);
        dates
            .iter()
            .map(|date| slots_for(&loaded.rules, loaded.source, *date, &clock, SlotOptions::default()))
            .collect()
    }

    /// The shift being served at `now`, if any. A shift is open on `[open, close)`.
    pub async fn open_shift_at(&self, now: DateTime<Utc>) -> Option<Shift> {
        let loaded = self.weekly_hours().await;
        let local = self.clock(now).now_local();
        let minutes = minutes_of_day(local.time());
        let day = loaded.rules.for_date(local.date_naive());

        Shift::ALL.into_iter().find(|shift| {
            let rule = day.shift(*shift);
            rule.enabled && minutes >= minutes_of_day(rule.open) && minutes < minutes_of_day(rule.close)
        })
    }

    pub async fn is_open_now(&self, now: DateTime<Utc>) -> bool {
        self.open_shift_at(now).await.is_some()
    }
}
