pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LambdaConfig, TomlConfig};

pub use core::availability::{AvailabilityEngine, AvailabilityResult, SlotOptions};
pub use core::degraded::DegradedMirror;
pub use core::loader::{ConfigLoader, LoadedRules, RulesSource};
pub use domain::model::{DateStatus, DayRule, Shift, ShiftRule, SlotCheck, TimeSlot, WeeklyRules};
pub use utils::error::{EngineError, Result};
