use crate::conf::types::RuntimeConfig;
use crate::conf::validation::report::ValidationReport;

pub struct ValidatedConfig {
    pub config: RuntimeConfig,
    /// Warnings that did not block loading.
    pub report: ValidationReport,
}
