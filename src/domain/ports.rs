use crate::domain::model::DayRule;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The authoritative configuration store behind the loader's first two tiers.
#[async_trait]
pub trait RulesStore: Send + Sync {
    /// Structured weekly rows. An empty vector means "no rows configured".
    async fn fetch_day_rules(&self) -> Result<Vec<DayRule>>;

    /// Free-text hours of operation, e.g. `"Tue-Sun: 18:00 - 23:00"`.
    async fn fetch_hours_text(&self) -> Result<Option<String>>;
}

#[async_trait]
impl<T: RulesStore + ?Sized> RulesStore for Arc<T> {
    async fn fetch_day_rules(&self) -> Result<Vec<DayRule>> {
        (**self).fetch_day_rules().await
    }

    async fn fetch_hours_text(&self) -> Result<Option<String>> {
        (**self).fetch_hours_text().await
    }
}

pub type SharedStore = Arc<dyn RulesStore>;

/// Connection details for a PostgREST-style store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub schema: Option<String>,
    pub hours_table: String,
    pub restaurants_table: String,
}

pub trait ConfigProvider: Send + Sync {
    fn timezone(&self) -> &str;
    fn store(&self) -> Option<StoreSettings>;
    fn fetch_timeout(&self) -> Duration;
}
