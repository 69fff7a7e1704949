use crate::utils::error::{EngineError, Result};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default stepping granularity when a row does not carry one.
pub const DEFAULT_SLOT_MINUTES: u32 = 15;
/// Default minimum lead time for same-day bookings.
pub const DEFAULT_ADVANCE_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Lunch,
    Dinner,
}

impl Shift {
    /// Generation order; lunch first so equal times keep lunch ahead after a stable sort.
    pub const ALL: [Shift; 2] = [Shift::Lunch, Shift::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Lunch => "lunch",
            Shift::Dinner => "dinner",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `HH:MM` on the wire; `HH:MM:SS` is accepted on input because Postgres `time`
/// columns come back with seconds.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time of day '{raw}'")))
    }
}

pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn time_from_minutes(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(minutes.checked_mul(60)?, 0)
}

/// Builds a wall-clock time for the embedded tables. Out-of-range input maps to midnight.
pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// One service window of a weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRule {
    pub enabled: bool,
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
    #[serde(with = "hhmm")]
    pub last_reservation: NaiveTime,
    pub advance_minutes: u32,
}

impl ShiftRule {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            open: NaiveTime::default(),
            close: NaiveTime::default(),
            last_reservation: NaiveTime::default(),
            advance_minutes: DEFAULT_ADVANCE_MINUTES,
        }
    }

    pub fn enabled(
        open: NaiveTime,
        close: NaiveTime,
        last_reservation: NaiveTime,
        advance_minutes: u32,
    ) -> Self {
        Self {
            enabled: true,
            open,
            close,
            last_reservation,
            advance_minutes,
        }
    }

    /// `open <= last_reservation <= close`. Disabled shifts are always consistent.
    pub fn is_consistent(&self) -> bool {
        !self.enabled || (self.open <= self.last_reservation && self.last_reservation <= self.close)
    }
}

/// Operating rules for one weekday (0 = Sunday ... 6 = Saturday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRule {
    pub day_of_week: u8,
    pub lunch: ShiftRule,
    pub dinner: ShiftRule,
    pub slot_duration_minutes: u32,
}

impl DayRule {
    pub fn closed(day_of_week: u8) -> Self {
        Self {
            day_of_week,
            lunch: ShiftRule::disabled(),
            dinner: ShiftRule::disabled(),
            slot_duration_minutes: DEFAULT_SLOT_MINUTES,
        }
    }

    pub fn dinner_only(day_of_week: u8, dinner: ShiftRule, slot_duration_minutes: u32) -> Self {
        Self {
            day_of_week,
            lunch: ShiftRule::disabled(),
            dinner,
            slot_duration_minutes,
        }
    }

    pub fn shift(&self, shift: Shift) -> &ShiftRule {
        match shift {
            Shift::Lunch => &self.lunch,
            Shift::Dinner => &self.dinner,
        }
    }

    fn shift_mut(&mut self, shift: Shift) -> &mut ShiftRule {
        match shift {
            Shift::Lunch => &mut self.lunch,
            Shift::Dinner => &mut self.dinner,
        }
    }

    pub fn is_closed(&self) -> bool {
        !self.lunch.enabled && !self.dinner.enabled
    }

    /// The generator input for `shift`, or `None` when that shift is not served.
    pub fn plan(&self, shift: Shift) -> Option<ShiftPlan> {
        let rule = self.shift(shift);
        if !rule.enabled {
            return None;
        }
        Some(ShiftPlan {
            shift,
            open: rule.open,
            last_reservation: rule.last_reservation,
            slot_minutes: self.slot_duration_minutes.max(1),
            advance_minutes: rule.advance_minutes,
        })
    }

    /// Disables shifts whose times contradict each other and repairs a zero step.
    fn sanitized(mut self) -> Self {
        if self.slot_duration_minutes == 0 {
            tracing::warn!(
                day_of_week = self.day_of_week,
                "slot duration of 0 minutes, using {DEFAULT_SLOT_MINUTES}"
            );
            self.slot_duration_minutes = DEFAULT_SLOT_MINUTES;
        }
        let day_of_week = self.day_of_week;
        for shift in Shift::ALL {
            let rule = self.shift_mut(shift);
            if !rule.is_consistent() {
                tracing::warn!(
                    day_of_week,
                    %shift,
                    open = %rule.open,
                    last_reservation = %rule.last_reservation,
                    close = %rule.close,
                    "shift times out of order, disabling shift"
                );
                rule.enabled = false;
            }
        }
        self
    }
}

/// Everything the slot generator needs to step through one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPlan {
    pub shift: Shift,
    pub open: NaiveTime,
    pub last_reservation: NaiveTime,
    pub slot_minutes: u32,
    pub advance_minutes: u32,
}

/// The resolved week: always seven days, indexed by `day_of_week`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayRule>", into = "Vec<DayRule>")]
pub struct WeeklyRules {
    days: Vec<DayRule>,
}

impl WeeklyRules {
    /// Builds the week from store rows. Duplicate or out-of-range weekdays are
    /// rejected; weekdays without a row are closed.
    pub fn from_rows(rows: Vec<DayRule>) -> Result<Self> {
        let mut slots: Vec<Option<DayRule>> = vec![None; 7];
        for row in rows {
            let index = usize::from(row.day_of_week);
            if index > 6 {
                return Err(EngineError::InvalidRulesError {
                    message: format!("day_of_week {} is outside 0..=6", row.day_of_week),
                });
            }
            if slots[index].is_some() {
                return Err(EngineError::InvalidRulesError {
                    message: format!("day_of_week {} appears more than once", row.day_of_week),
                });
            }
            slots[index] = Some(row.sanitized());
        }

        let days = slots
            .into_iter()
            .enumerate()
            .map(|(day, rule)| rule.unwrap_or_else(|| DayRule::closed(day as u8)))
            .collect();
        Ok(Self { days })
    }

    /// Builds all seven days from `rule_for(day_of_week)`.
    pub fn from_fn(rule_for: impl Fn(u8) -> DayRule) -> Self {
        let days = (0..7u8)
            .map(|day| {
                let mut rule = rule_for(day);
                rule.day_of_week = day;
                rule.sanitized()
            })
            .collect();
        Self { days }
    }

    pub fn day(&self, day_of_week: u8) -> Option<&DayRule> {
        self.days.get(usize::from(day_of_week))
    }

    pub fn for_date(&self, date: NaiveDate) -> &DayRule {
        use chrono::Datelike;
        // from_rows guarantees seven entries
        &self.days[date.weekday().num_days_from_sunday() as usize]
    }

    pub fn days(&self) -> &[DayRule] {
        &self.days
    }
}

impl TryFrom<Vec<DayRule>> for WeeklyRules {
    type Error = EngineError;

    fn try_from(rows: Vec<DayRule>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<WeeklyRules> for Vec<DayRule> {
    fn from(rules: WeeklyRules) -> Self {
        rules.days
    }
}

/// A candidate reservation start time. Built once per computation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub shift: Shift,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TimeSlot {
    pub fn open(time: NaiveTime, shift: Shift) -> Self {
        Self {
            time,
            shift,
            available: true,
            reason: None,
        }
    }

    pub fn blocked(time: NaiveTime, shift: Shift, reason: impl Into<String>) -> Self {
        Self {
            time,
            shift,
            available: false,
            reason: Some(reason.into()),
        }
    }

    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// Outcome of re-checking one requested time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCheck {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SlotCheck {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Whether a calendar day can be picked at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateStatus {
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DateStatus {
    pub fn enabled() -> Self {
        Self {
            disabled: false,
            reason: None,
        }
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            disabled: true,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dinner(open: (u32, u32), close: (u32, u32), last: (u32, u32)) -> ShiftRule {
        ShiftRule::enabled(hm(open.0, open.1), hm(close.0, close.1), hm(last.0, last.1), 30)
    }

    #[test]
    fn test_from_rows_fills_missing_days_as_closed() {
        let rules = WeeklyRules::from_rows(vec![DayRule::dinner_only(
            2,
            dinner((18, 0), (23, 0), (22, 30)),
            15,
        )])
        .unwrap();

        assert_eq!(rules.days().len(), 7);
        assert!(rules.day(0).unwrap().is_closed());
        assert!(!rules.day(2).unwrap().is_closed());
        assert_eq!(rules.day(6).unwrap().day_of_week, 6);
    }

    #[test]
    fn test_from_rows_rejects_duplicates_and_out_of_range() {
        let row = DayRule::dinner_only(3, dinner((18, 0), (23, 0), (22, 30)), 15);
        assert!(WeeklyRules::from_rows(vec![row.clone(), row]).is_err());
        assert!(WeeklyRules::from_rows(vec![DayRule::closed(7)]).is_err());
    }

    #[test]
    fn test_inconsistent_shift_is_disabled() {
        let rules = WeeklyRules::from_rows(vec![DayRule::dinner_only(
            1,
            dinner((20, 0), (23, 0), (19, 0)),
            0,
        )])
        .unwrap();

        let monday = rules.day(1).unwrap();
        assert!(!monday.dinner.enabled);
        assert_eq!(monday.slot_duration_minutes, DEFAULT_SLOT_MINUTES);
    }

    #[test]
    fn test_last_reservation_may_equal_close() {
        assert!(dinner((18, 0), (23, 0), (23, 0)).is_consistent());
        assert!(dinner((19, 0), (19, 0), (19, 0)).is_consistent());
    }

    #[test]
    fn test_time_slot_wire_format() {
        let slot = TimeSlot::blocked(hm(19, 15), Shift::Dinner, "requires 15 minutes advance booking");
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["time"], "19:15");
        assert_eq!(json["shift"], "dinner");
        assert_eq!(json["available"], false);

        let open = serde_json::to_value(TimeSlot::open(hm(13, 0), Shift::Lunch)).unwrap();
        assert!(open.get("reason").is_none());
    }

    #[test]
    fn test_weekly_rules_serde_accepts_seconds() {
        let json = serde_json::json!([{
            "dayOfWeek": 5,
            "lunch": {"enabled": false, "open": "00:00", "close": "00:00", "lastReservation": "00:00", "advanceMinutes": 30},
            "dinner": {"enabled": true, "open": "18:00:00", "close": "23:00:00", "lastReservation": "22:45:00", "advanceMinutes": 30},
            "slotDurationMinutes": 15
        }]);
        let rules: WeeklyRules = serde_json::from_value(json).unwrap();
        assert_eq!(rules.day(5).unwrap().dinner.last_reservation, hm(22, 45));

        let back = serde_json::to_value(&rules).unwrap();
        assert_eq!(back.as_array().unwrap().len(), 7);
        assert_eq!(back[5]["dinner"]["lastReservation"], "22:45");
    }
}
