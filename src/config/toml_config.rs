use crate::domain::ports::{ConfigProvider, StoreSettings};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{
    parse_timezone, validate_non_empty_string, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEZONE: &str = "Europe/Madrid";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub restaurant: RestaurantConfig,
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantConfig {
    #[serde(default = "default_restaurant_name")]
    pub name: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub schema: Option<String>,
    #[serde(default = "default_hours_table")]
    pub hours_table: String,
    #[serde(default = "default_restaurants_table")]
    pub restaurants_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Allowed browser origins; empty allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_restaurant_name() -> String {
    "restaurant".to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_hours_table() -> String {
    "business_hours".to_string()
}

fn default_restaurants_table() -> String {
    "restaurants".to_string()
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            name: default_restaurant_name(),
            timezone: default_timezone(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EngineError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EngineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay verbatim.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static env pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("restaurant.name", &self.restaurant.name)?;
        parse_timezone("restaurant.timezone", &self.restaurant.timezone)?;

        if let Some(store) = &self.store {
            validate_url("store.endpoint", &store.endpoint)?;
            validate_non_empty_string("store.hours_table", &store.hours_table)?;
            validate_non_empty_string("store.restaurants_table", &store.restaurants_table)?;
            if let Some(key) = &store.api_key {
                if key.contains("${") {
                    return Err(EngineError::MissingConfigError {
                        field: format!("store.api_key ({key})"),
                    });
                }
            }
        }

        validate_range("fetch.timeout_ms", self.fetch.timeout_ms, 1, 60_000)?;
        validate_range("server.request_timeout_secs", self.server.request_timeout_secs, 1, 300)?;
        validate_non_empty_string("server.host", &self.server.host)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(EngineError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn timezone(&self) -> &str {
        &self.restaurant.timezone
    }

    fn store(&self) -> Option<StoreSettings> {
        self.store.as_ref().map(|store| StoreSettings {
            endpoint: store.endpoint.clone(),
            api_key: store.api_key.clone(),
            schema: store.schema.clone(),
            hours_table: store.hours_table.clone(),
            restaurants_table: store.restaurants_table.clone(),
        })
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch.timeout_ms)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
