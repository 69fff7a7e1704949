//! Query operations behind both the HTTP routes and the Lambda handler.
//!
//! Every function parses raw string input first, so malformed dates and times
//! are rejected before any rules are loaded, and samples `now` exactly once.

use crate::core::availability::{AvailabilityEngine, AvailabilityResult};
use crate::core::loader::{LoadedRules, RulesSource};
use crate::domain::model::{DateStatus, Shift, SlotCheck, TimeSlot};
use crate::domain::ports::RulesStore;
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{parse_date, parse_instant, parse_time};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_BULK_DATES: usize = 62;

/// Slots of one date in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsPayload {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
    pub total_slots: usize,
    pub available_slots: usize,
    pub source: RulesSource,
}

impl From<AvailabilityResult> for SlotsPayload {
    fn from(result: AvailabilityResult) -> Self {
        Self {
            total_slots: result.total(),
            available_slots: result.available_count(),
            date: result.date,
            slots: result.slots,
            source: result.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStatusPayload {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub status: DateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenNowPayload {
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<Shift>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSlotsRequest {
    pub dates: Vec<String>,
    #[serde(default, alias = "currentDateTime")]
    pub now: Option<String>,
}

/// The caller's `now` override, or the current instant.
pub fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_instant("now", value),
        None => Ok(Utc::now()),
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::invalid_input(field, "", "parameter is required"))
}

pub async fn hours<S: RulesStore>(engine: &AvailabilityEngine<S>) -> LoadedRules {
    engine.weekly_hours().await
}

pub async fn slots<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    date: Option<&str>,
    now: Option<&str>,
) -> Result<SlotsPayload> {
    let date = parse_date("date", required("date", date)?)?;
    let now = resolve_now(now)?;
    Ok(engine.available_slots(date, now).await.into())
}

pub async fn validate<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    date: Option<&str>,
    time: Option<&str>,
    now: Option<&str>,
) -> Result<SlotCheck> {
    let date = parse_date("date", required("date", date)?)?;
    let time = parse_time("time", required("time", time)?)?;
    let now = resolve_now(now)?;
    Ok(engine.validate(date, time, now).await)
}

pub async fn date_status<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    date: Option<&str>,
    now: Option<&str>,
) -> Result<DateStatusPayload> {
    let date = parse_date("date", required("date", date)?)?;
    let now = resolve_now(now)?;
    Ok(DateStatusPayload {
        date,
        status: engine.date_status(date, now).await,
    })
}

pub async fn open_now<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    now: Option<&str>,
) -> Result<OpenNowPayload> {
    let now = resolve_now(now)?;
    let shift = engine.open_shift_at(now).await;
    Ok(OpenNowPayload {
        open: shift.is_some(),
        shift,
    })
}

pub async fn bulk_slots<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    request: &BulkSlotsRequest,
) -> Result<Vec<SlotsPayload>> {
    if request.dates.is_empty() {
        return Err(EngineError::invalid_input("dates", "", "at least one date is required"));
    }
    if request.dates.len() > MAX_BULK_DATES {
        return Err(EngineError::invalid_input(
            "dates",
            &request.dates.len().to_string(),
            format!("at most {MAX_BULK_DATES} dates per request"),
        ));
    }
    let dates = request
        .dates
        .iter()
        .map(|raw| parse_date("dates", raw.trim()))
        .collect::<Result<Vec<_>>>()?;
    let now = resolve_now(request.now.as_deref())?;

    Ok(engine
        .bulk_slots(&dates, now)
        .await
        .into_iter()
        .map(SlotsPayload::from)
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Hours,
    Slots,
    Validate,
    DateStatus,
    BulkSlots,
    OpenNow,
}

/// Event accepted by the serverless entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub action: Action,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub dates: Option<Vec<String>>,
    #[serde(default)]
    pub current_date_time: Option<String>,
}

async fn run_action<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    request: &ActionRequest,
) -> Result<serde_json::Value> {
    let now = request.current_date_time.as_deref();
    let date = request.date.as_deref();
    let value = match request.action {
        Action::Hours => serde_json::to_value(hours(engine).await)?,
        Action::Slots => serde_json::to_value(slots(engine, date, now).await?)?,
        Action::Validate => {
            serde_json::to_value(validate(engine, date, request.time.as_deref(), now).await?)?
        }
        Action::DateStatus => serde_json::to_value(date_status(engine, date, now).await?)?,
        Action::OpenNow => serde_json::to_value(open_now(engine, now).await?)?,
        Action::BulkSlots => {
            let bulk = BulkSlotsRequest {
                dates: request.dates.clone().unwrap_or_default(),
                now: request.current_date_time.clone(),
            };
            serde_json::to_value(bulk_slots(engine, &bulk).await?)?
        }
    };
    Ok(value)
}

/// Runs one action and wraps the outcome in the response envelope. Errors never
/// escape; they become `success: false`.
pub async fn dispatch<S: RulesStore>(
    engine: &AvailabilityEngine<S>,
    request: &ActionRequest,
) -> crate::api::response::ApiResponse<serde_json::Value> {
    use crate::api::response::ApiResponse;

    match run_action(engine, request).await {
        Ok(value) => ApiResponse::ok(value),
        Err(e) => {
            tracing::warn!(action = ?request.action, error = %e, "action rejected");
            ApiResponse::failure(e.to_string())
        }
    }
}
