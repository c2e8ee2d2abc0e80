use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where in the configuration tree an issue was found.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Origin {
    pub file: PathBuf,
    pub section: String,
}

impl Origin {
    pub fn new(file: impl Into<PathBuf>, section: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            section: section.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    pub origin: Origin,
    pub help: Option<String>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

#[derive(Serialize)]
struct ValidationReportJson<'a> {
    errors: &'a [ValidationIssue],
    warnings: &'a [ValidationIssue],
}

impl ValidationReport {
    pub fn has_violations(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    pub(crate) fn error(&mut self, message: String, origin: &Origin, help: Option<String>) {
        self.errors.push(ValidationIssue {
            severity: Severity::Error,
            message,
            origin: origin.clone(),
            help,
        });
    }

    pub(crate) fn warning(&mut self, message: String, origin: &Origin, help: Option<String>) {
        self.warnings.push(ValidationIssue {
            severity: Severity::Warning,
            message,
            origin: origin.clone(),
            help,
        });
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        let json = ValidationReportJson {
            errors: &self.errors,
            warnings: &self.warnings,
        };

        serde_json::to_string_pretty(&json)
    }

    pub fn render_plain(&self) {
        for issue in self.errors.iter().chain(self.warnings.iter()) {
            let severity = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };

            println!(
                "{}:{}: {}: {}",
                issue.origin.file.display(),
                issue.origin.section,
                severity,
                issue.message
            );

            if let Some(help) = &issue.help {
                println!("  help: {}", help);
            }
        }
    }

    pub fn render_pretty(&self) {
        let errors = self.errors.len();
        let warnings = self.warnings.len();

        if errors > 0 {
            println!(
                "configuration validation failed ({} errors, {} warnings)\n",
                errors, warnings
            );
        } else if warnings > 0 {
            println!("configuration is valid with {} warnings\n", warnings);
        }

        let mut by_file = BTreeMap::new();
        for issue in self.errors.iter().chain(self.warnings.iter()) {
            by_file
                .entry(&issue.origin.file)
                .or_insert(Vec::new())
                .push(issue);
        }

        for (file, issues) in by_file {
            println!("{}", file.display());

            for issue in issues {
                match issue.severity {
                    Severity::Error => {
                        println!("  {}: {}", "error".red().bold(), issue.message);
                    }
                    Severity::Warning => {
                        println!("  {}: {}", "warning".yellow().bold(), issue.message);
                    }
                }
                println!("    in {}", issue.origin.section.dimmed());

                if let Some(help) = &issue.help {
                    println!("    {}: {}", "help".cyan(), help);
                }

                println!();
            }
        }
    }
}

/// Engine Validation
impl ValidationReport {
    pub fn zero_days(&mut self, field: &str, origin: &Origin) {
        self.error(format!("{field} must be at least 1 day"), origin, None);
    }

    pub fn zero_value(&mut self, field: &str, origin: &Origin) {
        self.error(format!("{field} must be greater than zero"), origin, None);
    }

    pub fn invalid_delimiter(&mut self, delimiter: &str, origin: &Origin) {
        self.error(
            format!("delimiter must be exactly one character: {delimiter:?}"),
            origin,
            Some("Killfeed records use \";\".".to_string()),
        );
    }

    pub fn backfill_shorter_than_lookback(&mut self, backfill: u32, lookback: u32, origin: &Origin) {
        self.warning(
            format!("backfill_days ({backfill}) is shorter than lookback_days ({lookback})"),
            origin,
            Some("A backfill would scan less history than a regular run.".to_string()),
        );
    }
}

/// Discovery Validation
impl ValidationReport {
    pub fn map_range_inverted(&mut self, min: u8, max: u8, origin: &Origin) {
        self.error(
            format!("map_min ({min}) is greater than map_max ({max})"),
            origin,
            None,
        );
    }

    pub fn map_bound_not_a_digit(&mut self, field: &str, value: u8, origin: &Origin) {
        self.error(
            format!("{field} must be a single digit (0-9): {value}"),
            origin,
            None,
        );
    }

    pub fn empty_map_prefix(&mut self, origin: &Origin) {
        self.error("map_prefix must not be empty".to_string(), origin, None);
    }
}

/// Server Validation
impl ValidationReport {
    pub fn server_has_no_roots(&mut self, id: &str, origin: &Origin) {
        self.error(
            format!("server {id} has no log roots"),
            origin,
            Some("Add at least one entry to `roots`.".to_string()),
        );
    }

    pub fn empty_server_id(&mut self, origin: &Origin) {
        self.error(
            "server has no id and no hostname ending in digits".to_string(),
            origin,
            Some("Set `id`, or a `hostname` such as `eu-7020.example.net`.".to_string()),
        );
    }

    pub fn duplicate_canonical_id(&mut self, id: &str, canonical: &str, origin: &Origin) {
        self.error(
            format!("server {id} resolves to canonical id {canonical}, which is already in use"),
            origin,
            None,
        );
    }

    pub fn unresolved_server_identity(&mut self, id: &str, origin: &Origin) {
        self.warning(
            format!("server id {id} cannot be resolved to a numeric id"),
            origin,
            Some("Set `hostname` or add the id to identity.known_servers.".to_string()),
        );
    }
}
