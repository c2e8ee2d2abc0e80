use crate::conf::{ConfigError, load_runtime_config, validate_config};
use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate configuration and exit
    Check {
        /// Path to config directory
        #[arg(long, default_value = "config")]
        config: PathBuf,

        /// Output the report as JSON
        #[arg(long, conflicts_with = "plain")]
        json: bool,

        /// Output without colors, one issue per line
        #[arg(long)]
        plain: bool,
    },
}

/// Returns whether the configuration is free of errors.
pub fn check(path: PathBuf, json: bool, plain: bool) -> Result<bool> {
    let cfg = match load_runtime_config(&path) {
        Ok(cfg) => cfg,
        Err(err) => {
            print_config_error(&err);
            return Ok(false);
        }
    };
    let report = validate_config(&cfg);

    if json {
        println!("{}", report.render_json()?);
    } else if plain {
        report.render_plain();
    } else {
        report.render_pretty();
    }

    if report.errors.is_empty() && !json {
        println!("✔ Config loaded successfully");
        println!("✔ {} servers", cfg.servers.len());
        println!(
            "✔ {} known server migrations",
            cfg.identity.known_servers.len()
        );
        println!("✔ store at {}", cfg.store.path.display());
    }

    Ok(report.errors.is_empty())
}

fn print_config_error(err: &ConfigError) {
    eprintln!("{err}");
    if let Some(hint) = config_error_hint(err) {
        eprintln!();
        eprintln!("{hint}");
    }
}

pub fn config_error_hint(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::ReadFile { .. } => Some(
            "The config directory must contain a killfeed.hcl entry file.\n\
             \n\
             Example:\n\
             \n\
             engine {\n\
             \x20 lookback_days = 1\n\
             }\n\
             \n\
             include {\n\
             \x20 servers = \"servers/*.hcl\"\n\
             }",
        ),
        ConfigError::Parse { .. } => Some(
            "Server files list their servers as objects:\n\
             \n\
             servers = [\n\
             \x20 {\n\
             \x20   id    = \"7020\"\n\
             \x20   roots = [\"/deathlogs\"]\n\
             \x20 },\n\
             ]",
        ),
        _ => None,
    }
}
