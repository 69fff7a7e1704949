use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Store request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV rendering error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Store returned HTTP {status} for {endpoint}")]
    StoreStatusError { status: u16, endpoint: String },

    #[error("Availability service error: {message}")]
    RemoteError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidInputError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid business hours: {message}")]
    InvalidRulesError { message: String },

    #[error("Cannot parse hours of operation '{input}': {reason}")]
    HoursTextError { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Store,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EngineError {
    pub fn invalid_input(field: &str, value: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInputError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidInputError { .. } => ErrorCategory::Input,
            EngineError::ConfigError { .. }
            | EngineError::ConfigValidationError { .. }
            | EngineError::InvalidConfigValueError { .. }
            | EngineError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EngineError::HttpError(_)
            | EngineError::StoreStatusError { .. }
            | EngineError::RemoteError { .. }
            | EngineError::InvalidRulesError { .. }
            | EngineError::HoursTextError { .. } => ErrorCategory::Store,
            EngineError::IoError(_)
            | EngineError::SerializationError(_)
            | EngineError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            // the loader absorbs store failures, so these only surface from direct store calls
            ErrorCategory::Store => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EngineError::InvalidInputError { .. } => {
                "Use YYYY-MM-DD for dates, 24-hour HH:MM for times and RFC 3339 for instants"
            }
            EngineError::ConfigError { .. }
            | EngineError::ConfigValidationError { .. }
            | EngineError::InvalidConfigValueError { .. }
            | EngineError::MissingConfigError { .. } => {
                "Check the TOML configuration file and the command line overrides"
            }
            EngineError::HttpError(_)
            | EngineError::StoreStatusError { .. }
            | EngineError::RemoteError { .. } => {
                "Check that the store endpoint is reachable and the API key is valid"
            }
            EngineError::InvalidRulesError { .. } | EngineError::HoursTextError { .. } => {
                "Fix the business hours rows or the hours_operation text in the store"
            }
            EngineError::IoError(_)
            | EngineError::SerializationError(_)
            | EngineError::CsvError(_) => "Retry the command; report it if the problem persists",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Invalid request: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Store => format!("Business hours store problem: {}", self),
            ErrorCategory::System => format!("Unexpected failure: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
