use crate::config::toml_config::DEFAULT_TIMEZONE;
use crate::domain::ports::{ConfigProvider, StoreSettings};
use crate::utils::error::Result;
use crate::utils::validation::{parse_timezone, validate_range, validate_url, Validate};
use std::env;
use std::time::Duration;

/// Serverless settings, read from the function's environment.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub timezone: String,
    pub store_endpoint: Option<String>,
    pub store_api_key: Option<String>,
    pub store_schema: Option<String>,
    pub fetch_timeout_ms: u64,
    pub log_level: String,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            timezone: non_empty_var("RESTAURANT_TIMEZONE")
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            store_endpoint: non_empty_var("STORE_ENDPOINT"),
            store_api_key: non_empty_var("STORE_API_KEY"),
            store_schema: non_empty_var("STORE_SCHEMA"),
            fetch_timeout_ms: non_empty_var("FETCH_TIMEOUT_MS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3000),
            log_level: non_empty_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl ConfigProvider for LambdaConfig {
    fn timezone(&self) -> &str {
        &self.timezone
    }

    fn store(&self) -> Option<StoreSettings> {
        self.store_endpoint.as_ref().map(|endpoint| StoreSettings {
            endpoint: endpoint.clone(),
            api_key: self.store_api_key.clone(),
            schema: self.store_schema.clone(),
            hours_table: "business_hours".to_string(),
            restaurants_table: "restaurants".to_string(),
        })
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        parse_timezone("RESTAURANT_TIMEZONE", &self.timezone)?;
        if let Some(endpoint) = &self.store_endpoint {
            validate_url("STORE_ENDPOINT", endpoint)?;
        }
        validate_range("FETCH_TIMEOUT_MS", self.fetch_timeout_ms, 1, 60_000)?;

        tracing::info!("Lambda configuration validation passed");
        Ok(())
    }
}
