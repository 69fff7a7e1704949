use crate::core::availability::{slots_for, status_for, AvailabilityResult, SlotOptions};
use crate::core::clock::RestaurantClock;
use crate::core::loader::{default_weekly_rules, RulesSource};
use crate::core::slots::check_time;
use crate::domain::model::{DateStatus, SlotCheck, WeeklyRules};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// Offline stand-in for [`AvailabilityEngine`](crate::core::availability::AvailabilityEngine)
/// used by clients when the query surface cannot be reached.
///
/// Runs the same slot core against the built-in week, so a booking form keeps
/// working and never shows a slot the real engine would refuse for gap or
/// lead-time reasons.
#[derive(Debug, Clone)]
pub struct DegradedMirror {
    rules: WeeklyRules,
    tz: Tz,
}

impl DegradedMirror {
    pub fn new(tz: Tz) -> Self {
        Self {
            rules: default_weekly_rules(),
            tz,
        }
    }

    pub fn rules(&self) -> &WeeklyRules {
        &self.rules
    }

    pub fn available_slots(&self, date: NaiveDate, now: DateTime<Utc>) -> AvailabilityResult {
        self.available_slots_with(date, now, SlotOptions::default())
    }

    pub fn available_slots_with(
        &self,
        date: NaiveDate,
        now: DateTime<Utc>,
        options: SlotOptions,
    ) -> AvailabilityResult {
        let clock = RestaurantClock::new(self.tz, now);
        slots_for(&self.rules, RulesSource::BuiltinDefault, date, &clock, options)
    }

    pub fn validate(&self, date: NaiveDate, time: NaiveTime, now: DateTime<Utc>) -> SlotCheck {
        check_time(&self.available_slots(date, now).slots, time)
    }

    pub fn date_status(&self, date: NaiveDate, now: DateTime<Utc>) -> DateStatus {
        status_for(&self.rules, date, &RestaurantClock::new(self.tz, now))
    }
}
