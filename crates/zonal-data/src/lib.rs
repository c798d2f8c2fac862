//! Rule source and run configuration loading for the zonal rule engine.

pub mod loader;
pub mod run_config;

pub use loader::{ConfigError, Format, LoadError, find_rule_file, load_rule_document, load_rules};
pub use run_config::RunConfig;
