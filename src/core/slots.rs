//! Slot stepping, the kitchen gap window and the advance-booking rule.
//!
//! This is the one implementation shared by the authoritative engine and the
//! degraded mirror; both only differ in the [`WeeklyRules`] they feed in.

use crate::core::clock::{DateKind, RestaurantClock};
use crate::domain::model::{
    minutes_of_day, time_from_minutes, Shift, ShiftPlan, SlotCheck, TimeSlot, WeeklyRules,
};
use chrono::{NaiveDate, NaiveTime};

/// Kitchen changeover between services, exclusive on both ends.
pub const GAP_START_MINUTES: u32 = 16 * 60;
pub const GAP_END_MINUTES: u32 = 18 * 60 + 30;

pub const GAP_REASON: &str = "closed between lunch and dinner service";
pub const PAST_DATE_REASON: &str = "date is in the past";
pub const NOT_FOUND_REASON: &str = "time slot not found in business hours";

pub fn advance_reason(advance_minutes: u32) -> String {
    format!("requires {advance_minutes} minutes advance booking")
}

pub fn in_gap_window(time: NaiveTime) -> bool {
    let minutes = minutes_of_day(time);
    minutes > GAP_START_MINUTES && minutes < GAP_END_MINUTES
}

/// Steps from `open` to `last_reservation` (inclusive) and decides each slot.
///
/// Precedence per slot: gap window, then past date, then advance booking.
/// The advance rule only applies to today and compares full instants against
/// `now + advance`. Future dates are open apart from the gap.
/// `skip_advance_check` drops only the advance rule.
pub fn generate(
    plan: &ShiftPlan,
    date: NaiveDate,
    clock: &RestaurantClock,
    skip_advance_check: bool,
) -> Vec<TimeSlot> {
    let kind = clock.classify(date);
    let minimum_bookable = clock.minimum_bookable(plan.advance_minutes);
    let step = plan.slot_minutes.max(1);
    let last = minutes_of_day(plan.last_reservation);

    let mut slots = Vec::new();
    let mut minutes = minutes_of_day(plan.open);
    while minutes <= last {
        let Some(time) = time_from_minutes(minutes) else {
            break;
        };

        let slot = if in_gap_window(time) {
            TimeSlot::blocked(time, plan.shift, GAP_REASON)
        } else if kind == DateKind::Past {
            TimeSlot::blocked(time, plan.shift, PAST_DATE_REASON)
        } else if kind == DateKind::Today
            && !skip_advance_check
            && clock.instant_of(date, time) <= minimum_bookable
        {
            TimeSlot::blocked(time, plan.shift, advance_reason(plan.advance_minutes))
        } else {
            TimeSlot::open(time, plan.shift)
        };
        slots.push(slot);

        minutes += step;
    }
    slots
}

/// All slots of `date` across enabled shifts, sorted by time. A closed day is empty.
pub fn day_slots(
    rules: &WeeklyRules,
    date: NaiveDate,
    clock: &RestaurantClock,
    skip_advance_check: bool,
) -> Vec<TimeSlot> {
    let day = rules.for_date(date);
    let mut slots: Vec<TimeSlot> = Shift::ALL
        .iter()
        .filter_map(|shift| day.plan(*shift))
        .flat_map(|plan| generate(&plan, date, clock, skip_advance_check))
        .collect();
    // stable: lunch stays ahead of dinner on identical times
    slots.sort_by_key(|slot| slot.time);
    slots
}

/// Looks up `time` in an already computed slot list.
pub fn check_time(slots: &[TimeSlot], time: NaiveTime) -> SlotCheck {
    match slots.iter().find(|slot| slot.time == time) {
        None => SlotCheck::rejected(NOT_FOUND_REASON),
        Some(slot) if slot.available => SlotCheck::accepted(),
        Some(slot) => SlotCheck::rejected(
            slot.reason
                .clone()
                .unwrap_or_else(|| "time slot not available".to_string()),
        ),
    }
}
