use crate::api::response::ApiResponse;
use crate::api::service::{DateStatusPayload, SlotsPayload};
use crate::core::degraded::DegradedMirror;
use crate::core::loader::{LoadedRules, RulesSource};
use crate::domain::model::SlotCheck;
use crate::utils::error::{EngineError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// An answer from the availability service, or from the local mirror when the
/// service could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientReply<T> {
    pub data: T,
    pub degraded: bool,
}

impl<T> ClientReply<T> {
    fn remote(data: T) -> Self {
        Self {
            data,
            degraded: false,
        }
    }

    fn local(data: T) -> Self {
        Self {
            data,
            degraded: true,
        }
    }
}

/// Booking-form side of the query surface.
///
/// Transport failures, non-2xx statuses and `success: false` envelopes never
/// reach the caller; the [`DegradedMirror`] answers instead and the reply is
/// flagged as degraded.
pub struct AvailabilityClient {
    base_url: String,
    client: Client,
    mirror: DegradedMirror,
}

impl AvailabilityClient {
    pub fn new(base_url: impl Into<String>, tz: Tz, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            mirror: DegradedMirror::new(tz),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(EngineError::StoreStatusError {
                status: response.status().as_u16(),
                endpoint: url,
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        match envelope {
            ApiResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            ApiResponse { error, .. } => Err(EngineError::RemoteError {
                message: error.unwrap_or_else(|| "response carried no data".to_string()),
            }),
        }
    }

    fn fallback<T>(&self, operation: &str, error: &EngineError, local: impl FnOnce() -> T) -> ClientReply<T> {
        tracing::warn!(
            operation,
            error = %error,
            "availability service unavailable, answering from local defaults"
        );
        ClientReply::local(local())
    }

    pub async fn hours(&self) -> ClientReply<LoadedRules> {
        match self.fetch("/api/hours", &[]).await {
            Ok(loaded) => ClientReply::remote(loaded),
            Err(e) => self.fallback("hours", &e, || LoadedRules {
                rules: self.mirror.rules().clone(),
                source: RulesSource::BuiltinDefault,
                diagnostic: Some(e.to_string()),
            }),
        }
    }

    pub async fn slots(&self, date: NaiveDate, now: DateTime<Utc>) -> ClientReply<SlotsPayload> {
        let query = [("date", date.to_string()), ("now", wire_instant(now))];
        match self.fetch("/api/slots", &query).await {
            Ok(payload) => ClientReply::remote(payload),
            Err(e) => self.fallback("slots", &e, || self.mirror.available_slots(date, now).into()),
        }
    }

    pub async fn validate(&self, date: NaiveDate, time: NaiveTime, now: DateTime<Utc>) -> ClientReply<SlotCheck> {
        let query = [
            ("date", date.to_string()),
            ("time", time.format("%H:%M").to_string()),
            ("now", wire_instant(now)),
        ];
        match self.fetch("/api/validate", &query).await {
            Ok(check) => ClientReply::remote(check),
            Err(e) => self.fallback("validate", &e, || self.mirror.validate(date, time, now)),
        }
    }

    pub async fn date_status(&self, date: NaiveDate, now: DateTime<Utc>) -> ClientReply<DateStatusPayload> {
        let query = [("date", date.to_string()), ("now", wire_instant(now))];
        match self.fetch("/api/date-status", &query).await {
            Ok(payload) => ClientReply::remote(payload),
            Err(e) => self.fallback("date-status", &e, || DateStatusPayload {
                date,
                status: self.mirror.date_status(date, now),
            }),
        }
    }
}

fn wire_instant(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}
