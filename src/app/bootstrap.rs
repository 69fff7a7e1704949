use crate::adapters::{MemoryStore, RestStore};
use crate::core::availability::AvailabilityEngine;
use crate::domain::model::DayRule;
use crate::domain::ports::{ConfigProvider, SharedStore};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::parse_timezone;
use std::path::Path;
use std::sync::Arc;

/// The store named by the configuration, or an empty one that resolves to the
/// built-in week.
pub fn build_store<C: ConfigProvider + ?Sized>(config: &C) -> SharedStore {
    match config.store() {
        Some(settings) => {
            tracing::info!(endpoint = %settings.endpoint, "using business hours store");
            Arc::new(RestStore::new(settings))
        }
        None => {
            tracing::info!("no business hours store configured, using built-in hours");
            Arc::new(MemoryStore::new(Vec::new(), None))
        }
    }
}

pub fn build_engine<C: ConfigProvider + ?Sized>(config: &C) -> Result<AvailabilityEngine<SharedStore>> {
    engine_with_store(config, build_store(config))
}

pub fn engine_with_store<C: ConfigProvider + ?Sized>(
    config: &C,
    store: SharedStore,
) -> Result<AvailabilityEngine<SharedStore>> {
    let tz = parse_timezone("timezone", config.timezone())?;
    Ok(AvailabilityEngine::new(store, tz, config.fetch_timeout()))
}

/// Reads a JSON array of day rules into an offline store.
pub fn load_rules_file<P: AsRef<Path>>(path: P) -> Result<MemoryStore> {
    let content = std::fs::read_to_string(&path).map_err(EngineError::IoError)?;
    let rows: Vec<DayRule> = serde_json::from_str(&content)?;
    tracing::debug!(rows = rows.len(), path = %path.as_ref().display(), "loaded rules file");
    Ok(MemoryStore::new(rows, None))
}
