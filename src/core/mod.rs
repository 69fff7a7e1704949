pub mod availability;
pub mod clock;
pub mod degraded;
pub mod hours_text;
pub mod loader;
pub mod slots;

pub use crate::domain::model::{DateStatus, SlotCheck, TimeSlot, WeeklyRules};
pub use crate::domain::ports::{ConfigProvider, RulesStore};
pub use crate::utils::error::Result;
