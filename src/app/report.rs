//! Human, JSON and CSV renderings for the command line.

use crate::api::service::SlotsPayload;
use crate::core::loader::LoadedRules;
use crate::domain::model::{Shift, ShiftRule};
use crate::utils::error::{EngineError, Result};
use serde::Serialize;
use std::fmt::Write as _;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
    Csv,
}

fn shift_cell(rule: &ShiftRule) -> String {
    if rule.enabled {
        format!(
            "{}-{} (last {}, {}m ahead)",
            rule.open.format("%H:%M"),
            rule.close.format("%H:%M"),
            rule.last_reservation.format("%H:%M"),
            rule.advance_minutes
        )
    } else {
        "-".to_string()
    }
}

#[derive(Serialize)]
struct HoursRow<'a> {
    day: &'a str,
    shift: Shift,
    enabled: bool,
    open: String,
    close: String,
    last_reservation: String,
    advance_minutes: u32,
    slot_minutes: u32,
}

pub fn render_hours(loaded: &LoadedRules, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(loaded)?),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for day in loaded.rules.days() {
                for shift in Shift::ALL {
                    let rule = day.shift(shift);
                    writer.serialize(HoursRow {
                        day: DAY_NAMES[usize::from(day.day_of_week) % 7],
                        shift,
                        enabled: rule.enabled,
                        open: rule.open.format("%H:%M").to_string(),
                        close: rule.close.format("%H:%M").to_string(),
                        last_reservation: rule.last_reservation.format("%H:%M").to_string(),
                        advance_minutes: rule.advance_minutes,
                        slot_minutes: day.slot_duration_minutes,
                    })?;
                }
            }
            finish_csv(writer)
        }
        Format::Table => {
            let mut out = String::new();
            let _ = writeln!(out, "Source: {}", loaded.source.as_str());
            if let Some(diagnostic) = &loaded.diagnostic {
                let _ = writeln!(out, "Note:   {diagnostic}");
            }
            let _ = writeln!(out, "{:<10} {:<36} {:<36} {}", "Day", "Lunch", "Dinner", "Slot");
            for day in loaded.rules.days() {
                let name = DAY_NAMES[usize::from(day.day_of_week) % 7];
                if day.is_closed() {
                    let _ = writeln!(out, "{name:<10} closed");
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:<10} {:<36} {:<36} {}m",
                    name,
                    shift_cell(&day.lunch),
                    shift_cell(&day.dinner),
                    day.slot_duration_minutes
                );
            }
            Ok(out)
        }
    }
}

#[derive(Serialize)]
struct SlotRow<'a> {
    date: String,
    time: String,
    shift: Shift,
    available: bool,
    reason: &'a str,
}

pub fn render_slots(days: &[SlotsPayload], format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(days)?),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for day in days {
                for slot in &day.slots {
                    writer.serialize(SlotRow {
                        date: day.date.to_string(),
                        time: slot.label(),
                        shift: slot.shift,
                        available: slot.available,
                        reason: slot.reason.as_deref().unwrap_or_default(),
                    })?;
                }
            }
            finish_csv(writer)
        }
        Format::Table => {
            let mut out = String::new();
            for day in days {
                let _ = writeln!(
                    out,
                    "{} ({} of {} available, {})",
                    day.date,
                    day.available_slots,
                    day.total_slots,
                    day.source.as_str()
                );
                if day.slots.is_empty() {
                    let _ = writeln!(out, "  closed");
                }
                for slot in &day.slots {
                    let mark = if slot.available { "✓" } else { "✗" };
                    let _ = writeln!(
                        out,
                        "  {} {} {:<6} {}",
                        mark,
                        slot.label(),
                        slot.shift.as_str(),
                        slot.reason.as_deref().unwrap_or_default()
                    );
                }
            }
            Ok(out)
        }
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| EngineError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| EngineError::ConfigError {
        message: format!("CSV output is not UTF-8: {e}"),
    })
}
