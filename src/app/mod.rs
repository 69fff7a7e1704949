pub mod bootstrap;
pub mod report;

pub use bootstrap::{build_engine, build_store, engine_with_store, load_rules_file};
