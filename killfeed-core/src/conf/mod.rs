mod discover;
mod error;
mod loader;
mod parse;
pub mod types;
pub(crate) mod validation;


pub use error::ConfigError;
pub use loader::{ENTRYPOINT_FILE, load_config, load_runtime_config};
pub use types::RuntimeConfig;
pub use validation::{
    Origin, Severity, ValidatedConfig, ValidationIssue, ValidationReport, validate_config,
};
