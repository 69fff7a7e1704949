use crate::utils::error::{EngineError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"))
}

fn time_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}:\d{2}$").expect("static time pattern"))
}

/// Parses a `YYYY-MM-DD` calendar date. Anything else is rejected before any
/// availability computation runs.
pub fn parse_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    if !date_shape().is_match(value) {
        return Err(EngineError::invalid_input(
            field_name,
            value,
            "date must be in YYYY-MM-DD format",
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| EngineError::invalid_input(field_name, value, e.to_string()))
}

/// Parses a 24-hour `HH:MM` time.
pub fn parse_time(field_name: &str, value: &str) -> Result<NaiveTime> {
    if !time_shape().is_match(value) {
        return Err(EngineError::invalid_input(
            field_name,
            value,
            "time must be in HH:MM format",
        ));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| EngineError::invalid_input(field_name, value, e.to_string()))
}

pub fn parse_instant(field_name: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EngineError::invalid_input(field_name, value, e.to_string()))
}

pub fn parse_timezone(field_name: &str, value: &str) -> Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|_| EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "not a valid IANA timezone name".to_string(),
        })
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EngineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EngineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date", "2026-10-19").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
        assert!(parse_date("date", "2026-2-1").is_err());
        assert!(parse_date("date", "2026-02-30").is_err());
        assert!(parse_date("date", "19/10/2026").is_err());
        assert!(parse_date("date", "").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("time", "19:30").unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap()
        );
        assert!(parse_time("time", "7:30").is_err());
        assert!(parse_time("time", "19:30:00").is_err());
        assert!(parse_time("time", "24:00").is_err());
    }

    #[test]
    fn test_parse_instant_and_timezone() {
        let instant = parse_instant("now", "2026-10-19T19:10:00+02:00").unwrap();
        assert_eq!(instant.to_rfc3339(), "2026-10-19T17:10:00+00:00");
        assert!(parse_instant("now", "yesterday").is_err());

        assert_eq!(parse_timezone("tz", "Europe/Madrid").unwrap(), Tz::Europe__Madrid);
        assert!(parse_timezone("tz", "Mars/Olympus").is_err());
    }

    #[test]
    fn test_invalid_input_is_input_category() {
        let err = parse_date("date", "tomorrow").unwrap_err();
        assert_eq!(
            err.category(),
            crate::utils::error::ErrorCategory::Input
        );
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("store.endpoint", "https://example.supabase.co/rest/v1").is_ok());
        assert!(validate_url("store.endpoint", "http://localhost:54321").is_ok());
        assert!(validate_url("store.endpoint", "").is_err());
        assert!(validate_url("store.endpoint", "invalid-url").is_err());
        assert!(validate_url("store.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("fetch.timeout_ms", 3000, 1, 60_000).is_ok());
        assert!(validate_range("fetch.timeout_ms", 0, 1, 60_000).is_err());
    }
}
