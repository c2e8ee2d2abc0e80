use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use killfeed_core::cli;
use killfeed_core::cli::config::ConfigCmd;
use killfeed_core::cli::run::ModeArg;
use killfeed_core::conf::{ConfigError, RuntimeConfig, load_config};
use killfeed_core::logging::init_logging;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(
    name = "killfeed",
    version,
    about = "Killfeed: incremental game server kill log ingestion"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// Ingest new kill events from every configured server (default)
    Run {
        /// Path to the config directory
        #[arg(long, default_value = "config")]
        config: PathBuf,

        /// Only ingest this server
        #[arg(long)]
        server: Option<String>,

        #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
        mode: ModeArg,
    },

    /// Forget a server's read positions so its logs are read again
    Reset {
        #[arg(long)]
        server: String,

        #[arg(long, default_value = "config")]
        config: PathBuf,

        /// Also clear the backfill marker, forcing a historical backfill
        #[arg(long)]
        backfill: bool,
    },

    /// Show how a raw server id resolves to its canonical id
    Resolve {
        raw: String,

        #[arg(long)]
        hostname: Option<String>,

        /// Merge `identity.known_servers` from this config directory
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let args = Cli::parse();

    let outcome = match args.command {
        Some(Command::Config {
            cmd: ConfigCmd::Check {
                config,
                json,
                plain,
            },
        }) => cli::config::check(config, json, plain),

        Some(Command::Resolve {
            raw,
            hostname,
            config,
        }) => cli::resolve::resolve(&raw, hostname.as_deref(), config.as_deref()).map(|_| true),

        Some(Command::Reset {
            server,
            config,
            backfill,
        }) => with_config(&config, |cfg| async move {
            cli::reset::reset(&cfg, &server, backfill).await?;
            Ok::<_, anyhow::Error>(true)
        }),

        Some(Command::Run {
            config,
            server,
            mode,
        }) => run(config, server, mode),

        None => run(PathBuf::from("config"), None, ModeArg::Auto),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("killfeed error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(config: PathBuf, server: Option<String>, mode: ModeArg) -> Result<bool> {
    with_config(&config, |cfg| async move {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        ctrlc::set_handler(move || {
            tracing::warn!("interrupt received, stopping after the current file");
            let _ = cancel_tx.send(true);
        })
        .context("failed to install interrupt handler")?;

        let runs = cli::run::run(cfg, server, mode, cancel_rx).await?;
        Ok::<_, anyhow::Error>(runs.iter().all(|r| r.result.is_ok()))
    })
}

/// Load and validate config, start logging, then drive `f` on a fresh runtime.
fn with_config<F, Fut>(path: &Path, f: F) -> Result<bool>
where
    F: FnOnce(RuntimeConfig) -> Fut,
    Fut: std::future::Future<Output = Result<bool>>,
{
    let validated = match load_config(path) {
        Ok(validated) => validated,
        Err(ConfigError::Validation { report }) => {
            report.render_pretty();
            return Ok(false);
        }
        Err(e) => {
            if let Some(hint) = cli::config::config_error_hint(&e) {
                eprintln!("{hint}\n");
            }
            return Err(e)
                .with_context(|| format!("failed to load config from {}", path.display()));
        }
    };
    let _guard = init_logging(&validated.config.logging);

    for warning in &validated.report.warnings {
        tracing::warn!(
            file = %warning.origin.file.display(),
            section = %warning.origin.section,
            "{}",
            warning.message
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(f(validated.config))
}
