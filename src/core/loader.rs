use crate::core::hours_text::parse_hours_operation;
use crate::domain::model::{hm, DayRule, ShiftRule, WeeklyRules};
use crate::domain::ports::RulesStore;
use crate::utils::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RulesSource {
    Store,
    HoursText,
    BuiltinDefault,
}

impl RulesSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulesSource::Store => "store",
            RulesSource::HoursText => "hours-text",
            RulesSource::BuiltinDefault => "builtin-default",
        }
    }
}

/// The resolved week plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedRules {
    pub rules: WeeklyRules,
    pub source: RulesSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl LoadedRules {
    pub fn is_degraded(&self) -> bool {
        self.source != RulesSource::Store
    }
}

/// Built-in week used when nothing else can be read: Sunday closed,
/// Monday to Saturday dinner 18:00-23:00 with the last table at 22:45.
pub fn default_weekly_rules() -> WeeklyRules {
    let dinner = ShiftRule::enabled(hm(18, 0), hm(23, 0), hm(22, 45), 30);
    WeeklyRules::from_fn(|day| match day {
        0 => DayRule::closed(day),
        _ => DayRule::dinner_only(day, dinner.clone(), 15),
    })
}

/// Three-tier resolution of the weekly rules.
///
/// 1. structured rows from the store
/// 2. the free-text hours of operation
/// 3. [`default_weekly_rules`]
///
/// Failures never escape: each one drops to the next tier and is reported in
/// [`LoadedRules::diagnostic`].
pub struct ConfigLoader<S> {
    store: S,
    fetch_timeout: Duration,
}

impl<S: RulesStore> ConfigLoader<S> {
    pub fn new(store: S, fetch_timeout: Duration) -> Self {
        Self {
            store,
            fetch_timeout,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load_weekly_rules(&self) -> LoadedRules {
        self.load_with_cancel(&CancellationToken::new()).await
    }

    /// Resolves the week, giving up on the store once `token` fires or the fetch
    /// timeout elapses.
    pub async fn load_with_cancel(&self, token: &CancellationToken) -> LoadedRules {
        let fetched = tokio::select! {
            _ = token.cancelled() => Err("configuration fetch cancelled".to_string()),
            outcome = tokio::time::timeout(self.fetch_timeout, self.fetch_tiers()) => {
                outcome.map_err(|_| {
                    format!("configuration fetch timed out after {}ms", self.fetch_timeout.as_millis())
                })
            }
        };

        let loaded = match fetched {
            Ok(Ok(loaded)) => loaded,
            Ok(Err(diagnostic)) | Err(diagnostic) => LoadedRules {
                rules: default_weekly_rules(),
                source: RulesSource::BuiltinDefault,
                diagnostic: Some(diagnostic),
            },
        };

        if loaded.is_degraded() {
            tracing::warn!(
                source = loaded.source.as_str(),
                diagnostic = loaded.diagnostic.as_deref().unwrap_or_default(),
                "business hours resolved in degraded mode"
            );
        } else {
            tracing::debug!("business hours loaded from store");
        }
        loaded
    }

    /// Tiers one and two. `Err` carries the accumulated diagnostic for tier three.
    async fn fetch_tiers(&self) -> std::result::Result<LoadedRules, String> {
        let structured = match self.structured_rules().await {
            Ok(rules) => {
                return Ok(LoadedRules {
                    rules,
                    source: RulesSource::Store,
                    diagnostic: None,
                })
            }
            Err(e) => e.to_string(),
        };
        tracing::debug!(reason = %structured, "structured hours unusable, trying hours text");

        match self.text_rules().await {
            Ok(rules) => Ok(LoadedRules {
                rules,
                source: RulesSource::HoursText,
                diagnostic: Some(structured),
            }),
            Err(e) => Err(format!("{structured}; {e}")),
        }
    }

    async fn structured_rules(&self) -> Result<WeeklyRules> {
        let rows = self.store.fetch_day_rules().await?;
        if rows.is_empty() {
            return Err(EngineError::InvalidRulesError {
                message: "store returned no business hours rows".to_string(),
            });
        }
        WeeklyRules::from_rows(rows)
    }

    async fn text_rules(&self) -> Result<WeeklyRules> {
        match self.store.fetch_hours_text().await? {
            Some(text) if !text.trim().is_empty() => parse_hours_operation(&text),
            _ => Err(EngineError::InvalidRulesError {
                message: "no hours of operation text configured".to_string(),
            }),
        }
    }
}
