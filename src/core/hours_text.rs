//! Parser for the free-text `hours_operation` column, the loader's second tier.
//!
//! Accepted shape: `<days>: HH:MM - HH:MM`, where `<days>` is a comma separated
//! list of single days or inclusive ranges such as `Tue-Sun` or `Fri-Mon`.
//! Anything else is an error; a partial schedule is never produced.

use crate::domain::model::{
    hm, DayRule, ShiftRule, WeeklyRules, DEFAULT_ADVANCE_MINUTES, DEFAULT_SLOT_MINUTES,
};
use crate::utils::error::{EngineError, Result};
use chrono::{NaiveTime, Timelike};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<days>[^:]+?)\s*:\s*(?P<open>\d{1,2}:\d{2})\s*[-–]\s*(?P<close>\d{1,2}:\d{2})\s*$",
        )
        .expect("static hours pattern")
    })
}

fn parse_error(input: &str, reason: impl Into<String>) -> EngineError {
    EngineError::HoursTextError {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn fold_accents(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' => 'a',
            'é' | 'è' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

/// Weekday index, 0 = Sunday.
fn day_index(token: &str) -> Option<u8> {
    let day = match fold_accents(token.trim()).trim_end_matches('.') {
        "sun" | "sunday" | "dom" | "domingo" => 0,
        "mon" | "monday" | "lun" | "lunes" => 1,
        "tue" | "tues" | "tuesday" | "mar" | "martes" => 2,
        "wed" | "wednesday" | "mie" | "miercoles" => 3,
        "thu" | "thur" | "thurs" | "thursday" | "jue" | "jueves" => 4,
        "fri" | "friday" | "vie" | "viernes" => 5,
        "sat" | "saturday" | "sab" | "sabado" => 6,
        _ => return None,
    };
    Some(day)
}

/// Expands `Mon,Wed-Fri` into the weekday set. Ranges wrap past Saturday.
fn day_set(input: &str, days: &str) -> Result<BTreeSet<u8>> {
    let mut set = BTreeSet::new();
    for part in days.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(parse_error(input, "empty day in list"));
        }
        let bounds: Vec<&str> = part.split(['-', '–']).collect();
        match bounds.as_slice() {
            [single] => {
                let day = day_index(single)
                    .ok_or_else(|| parse_error(input, format!("unknown day '{single}'")))?;
                set.insert(day);
            }
            [from, to] => {
                let start = day_index(from)
                    .ok_or_else(|| parse_error(input, format!("unknown day '{}'", from.trim())))?;
                let end = day_index(to)
                    .ok_or_else(|| parse_error(input, format!("unknown day '{}'", to.trim())))?;
                let mut day = start;
                loop {
                    set.insert(day);
                    if day == end {
                        break;
                    }
                    day = (day + 1) % 7;
                }
            }
            _ => return Err(parse_error(input, format!("malformed day range '{part}'"))),
        }
    }
    Ok(set)
}

fn parse_clock(input: &str, raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| parse_error(input, format!("invalid time '{raw}'")))
}

/// Parses the free-text hours into a dinner-only week.
///
/// Every listed day gets `open..close`, last reservation at `(close hour - 1):30`,
/// 15 minute slots and 30 minutes of advance booking. Unlisted days are closed.
pub fn parse_hours_operation(text: &str) -> Result<WeeklyRules> {
    let caps = line_pattern()
        .captures(text)
        .ok_or_else(|| parse_error(text, "expected '<days>: HH:MM - HH:MM'"))?;

    let days = day_set(text, &caps["days"])?;
    let open = parse_clock(text, &caps["open"])?;
    let close = parse_clock(text, &caps["close"])?;

    if close <= open {
        return Err(parse_error(text, "closing time must be after opening time"));
    }
    if close.hour() < 1 {
        return Err(parse_error(text, "closing time leaves no room for a last reservation"));
    }
    let last_reservation = hm(close.hour() - 1, 30);
    if last_reservation < open {
        return Err(parse_error(text, "derived last reservation falls before opening time"));
    }

    let dinner = ShiftRule::enabled(open, close, last_reservation, DEFAULT_ADVANCE_MINUTES);
    let rows = days
        .into_iter()
        .map(|day| DayRule::dinner_only(day, dinner.clone(), DEFAULT_SLOT_MINUTES))
        .collect();
    WeeklyRules::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_days(rules: &WeeklyRules) -> Vec<u8> {
        rules
            .days()
            .iter()
            .filter(|d| !d.is_closed())
            .map(|d| d.day_of_week)
            .collect()
    }

    #[test]
    fn test_tuesday_to_sunday() {
        let rules = parse_hours_operation("Tue-Sun: 18:00 - 23:00").unwrap();
        assert_eq!(open_days(&rules), vec![0, 2, 3, 4, 5, 6]);
        assert!(rules.day(1).unwrap().is_closed());

        let tuesday = rules.day(2).unwrap();
        assert!(!tuesday.lunch.enabled);
        assert_eq!(tuesday.dinner.open, hm(18, 0));
        assert_eq!(tuesday.dinner.close, hm(23, 0));
        assert_eq!(tuesday.dinner.last_reservation, hm(22, 30));
        assert_eq!(tuesday.dinner.advance_minutes, 30);
        assert_eq!(tuesday.slot_duration_minutes, 15);
    }

    #[test]
    fn test_lists_and_wrapping_ranges() {
        let rules = parse_hours_operation("Mon, Wed-Fri: 19:00-23:30").unwrap();
        assert_eq!(open_days(&rules), vec![1, 3, 4, 5]);

        let rules = parse_hours_operation("Fri-Mon: 19:00 - 23:00").unwrap();
        assert_eq!(open_days(&rules), vec![0, 1, 5, 6]);
    }

    #[test]
    fn test_spanish_day_names() {
        let rules = parse_hours_operation("Mar-Dom: 18:00 - 23:00").unwrap();
        assert_eq!(open_days(&rules), vec![0, 2, 3, 4, 5, 6]);

        let rules = parse_hours_operation("Miércoles, sáb: 20:00 - 23:00").unwrap();
        assert_eq!(open_days(&rules), vec![3, 6]);
    }

    #[test]
    fn test_rejects_anything_unparsable() {
        for text in [
            "",
            "closed for holidays",
            "Tue-Sun 18:00 - 23:00",
            "Tue-Xyz: 18:00 - 23:00",
            "Tue-Wed-Thu: 18:00 - 23:00",
            "Tue,,Wed: 18:00 - 23:00",
            "Tue-Sun: 18:00 - 25:00",
            "Tue-Sun: 23:00 - 18:00",
            "Tue-Sun: 22:45 - 23:00",
        ] {
            assert!(parse_hours_operation(text).is_err(), "accepted '{text}'");
        }
    }
}
