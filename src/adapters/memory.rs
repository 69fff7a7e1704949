use crate::domain::model::DayRule;
use crate::domain::ports::RulesStore;
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Fixed store contents, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<DayRule>,
    hours_text: Option<String>,
    reachable: bool,
    delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new(rows: Vec<DayRule>, hours_text: Option<String>) -> Self {
        Self {
            rows,
            hours_text,
            reachable: true,
            delay: None,
        }
    }

    /// A store whose every call fails, as if the network were down.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::default()
        }
    }

    /// Delays every call, to exercise timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn respond<T>(&self, value: T) -> Result<T> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if !self.reachable {
            return Err(EngineError::StoreStatusError {
                status: 503,
                endpoint: "memory".to_string(),
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl RulesStore for MemoryStore {
    async fn fetch_day_rules(&self) -> Result<Vec<DayRule>> {
        self.respond(self.rows.clone()).await
    }

    async fn fetch_hours_text(&self) -> Result<Option<String>> {
        self.respond(self.hours_text.clone()).await
    }
}
