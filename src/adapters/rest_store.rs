use crate::domain::model::{
    parse_time_of_day, DayRule, ShiftRule, DEFAULT_ADVANCE_MINUTES, DEFAULT_SLOT_MINUTES,
};
use crate::domain::ports::{RulesStore, StoreSettings};
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// One row of the `business_hours` table as PostgREST returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessHoursRow {
    pub day_of_week: i64,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_open: Option<bool>,
    pub is_closed: Option<bool>,
    pub last_reservation_time: Option<String>,
    pub advance_booking_minutes: Option<u32>,
    pub slot_duration_minutes: Option<u32>,
    pub lunch_enabled: Option<bool>,
    pub lunch_open_time: Option<String>,
    pub lunch_close_time: Option<String>,
    pub lunch_last_reservation_time: Option<String>,
    pub lunch_advance_booking_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RestaurantRow {
    hours_operation: Option<String>,
}

fn row_error(day: i64, message: impl std::fmt::Display) -> EngineError {
    EngineError::InvalidRulesError {
        message: format!("business_hours row for day {day}: {message}"),
    }
}

fn shift_from_columns(
    day: i64,
    label: &str,
    enabled: bool,
    open: Option<&str>,
    close: Option<&str>,
    last: Option<&str>,
    advance: Option<u32>,
) -> Result<ShiftRule> {
    if !enabled {
        return Ok(ShiftRule::disabled());
    }
    let time = |column: &str, raw: Option<&str>| {
        let raw = raw.ok_or_else(|| row_error(day, format!("{label} {column} is missing")))?;
        parse_time_of_day(raw)
            .ok_or_else(|| row_error(day, format!("{label} {column} '{raw}' is not a time")))
    };
    Ok(ShiftRule::enabled(
        time("open time", open)?,
        time("close time", close)?,
        time("last reservation time", last)?,
        advance.unwrap_or(DEFAULT_ADVANCE_MINUTES),
    ))
}

impl TryFrom<BusinessHoursRow> for DayRule {
    type Error = EngineError;

    fn try_from(row: BusinessHoursRow) -> Result<Self> {
        let day = row.day_of_week;
        let day_of_week = u8::try_from(day)
            .ok()
            .filter(|d| *d <= 6)
            .ok_or_else(|| row_error(day, "day_of_week must be within 0..=6"))?;

        let dinner_enabled = row
            .is_open
            .or(row.is_closed.map(|closed| !closed))
            .unwrap_or(false);
        let dinner = shift_from_columns(
            day,
            "dinner",
            dinner_enabled,
            row.open_time.as_deref(),
            row.close_time.as_deref(),
            row.last_reservation_time.as_deref(),
            row.advance_booking_minutes,
        )?;
        let lunch = shift_from_columns(
            day,
            "lunch",
            row.lunch_enabled.unwrap_or(false),
            row.lunch_open_time.as_deref(),
            row.lunch_close_time.as_deref(),
            row.lunch_last_reservation_time.as_deref(),
            row.lunch_advance_booking_minutes,
        )?;

        Ok(DayRule {
            day_of_week,
            lunch,
            dinner,
            slot_duration_minutes: row
                .slot_duration_minutes
                .filter(|minutes| *minutes > 0)
                .unwrap_or(DEFAULT_SLOT_MINUTES),
        })
    }
}

/// [`RulesStore`] over a PostgREST endpoint such as Supabase's `/rest/v1`.
pub struct RestStore {
    settings: StoreSettings,
    client: Client,
}

impl RestStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: StoreSettings, client: Client) -> Self {
        Self { settings, client }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.settings.endpoint.trim_end_matches('/'), table)
    }

    fn authorized(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.settings.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }
        if let Some(schema) = &self.settings.schema {
            request = request.header("Accept-Profile", schema);
        }
        request.header("Accept", "application/json")
    }

    async fn get_rows<T: DeserializeOwned>(&self, table: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let url = self.table_url(table);
        tracing::debug!("Querying store: {}", url);

        let response = self
            .authorized(self.client.get(&url).query(query))
            .send()
            .await?;
        tracing::debug!("Store response status: {}", response.status());

        if !response.status().is_success() {
            return Err(EngineError::StoreStatusError {
                status: response.status().as_u16(),
                endpoint: url,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RulesStore for RestStore {
    async fn fetch_day_rules(&self) -> Result<Vec<DayRule>> {
        let rows: Vec<BusinessHoursRow> = self
            .get_rows(
                &self.settings.hours_table,
                &[("select", "*"), ("order", "day_of_week.asc")],
            )
            .await?;
        tracing::debug!("Fetched {} business hours rows", rows.len());
        rows.into_iter().map(DayRule::try_from).collect()
    }

    async fn fetch_hours_text(&self) -> Result<Option<String>> {
        let rows: Vec<RestaurantRow> = self
            .get_rows(
                &self.settings.restaurants_table,
                &[("select", "hours_operation"), ("limit", "1")],
            )
            .await?;
        Ok(rows.into_iter().next().and_then(|row| row.hours_operation))
    }
}
