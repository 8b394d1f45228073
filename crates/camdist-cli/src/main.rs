mod commands;
mod hexdump;
mod interrupt;
mod launcher;
mod prompter;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use camdist::config::CONFIG_FILE;
use camdist::{Config, DEFAULT_BASELINE, Platform};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use interrupt::Interrupt;

const ISSUES_URL: &str = "https://github.com/searayeah/dota-camera-distance/issues";
const EXIT_COUNTDOWN_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "camdist", version)]
#[command(about = "Camera distance patcher for the Dota 2 client library")]
struct Cli {
    /// Config file
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Configure, patch the installed client library, and launch the game (default)
    Run {
        /// Distance to write, overriding the config
        #[arg(short, long)]
        distance: Option<f32>,

        /// Platform profile to use instead of the current OS
        #[arg(long)]
        platform: Option<Platform>,

        /// Do not launch the game after patching
        #[arg(long)]
        no_launch: bool,

        /// Exit immediately instead of counting down
        #[arg(long)]
        no_wait: bool,
    },
    /// Patch a file with an explicit anchor
    Patch {
        /// Image to patch
        #[arg(short, long)]
        file: PathBuf,

        /// Anchor hex string, e.g. "00 00 AE 42 00 00 96 44 00 00 C8 44"
        #[arg(short, long)]
        anchor: String,

        /// Distance to write
        #[arg(short, long)]
        distance: f32,

        /// Value the field holds in the anchor
        #[arg(short, long, default_value_t = DEFAULT_BASELINE)]
        baseline: f32,

        /// Treat anchor advisories as errors
        #[arg(long)]
        strict: bool,
    },
    /// Report anchor matches in a file without modifying it
    Scan {
        /// Image to scan
        #[arg(short, long)]
        file: PathBuf,

        /// Anchor hex string
        #[arg(short, long)]
        anchor: String,

        /// Value the field holds in the anchor
        #[arg(short, long, default_value_t = DEFAULT_BASELINE)]
        baseline: f32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the field encoding of a value
    Encode {
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config, cli.verbose);

    let command = cli.command.unwrap_or(Command::Run {
        distance: None,
        platform: None,
        no_launch: false,
        no_wait: false,
    });

    match command {
        Command::Run {
            distance,
            platform,
            no_launch,
            no_wait,
        } => {
            let interrupt = Interrupt::install()?;
            let options = commands::run::RunOptions {
                config_path: cli.config,
                distance,
                platform,
                launch: !no_launch,
            };

            let result = commands::run::run(&options, &interrupt);
            if let Err(e) = &result {
                error!("Program crashed: {:#}", e);
                error!(
                    "If nothing helps or there's a bug, report it at {}",
                    ISSUES_URL
                );
            }
            if !no_wait {
                exit_countdown(&interrupt);
            }
            result
        }
        Command::Patch {
            file,
            anchor,
            distance,
            baseline,
            strict,
        } => commands::patch::run(&file, &anchor, distance, baseline, strict),
        Command::Scan {
            file,
            anchor,
            baseline,
            json,
        } => commands::scan::run(&file, &anchor, baseline, json),
        Command::Encode { value } => commands::encode::run(value),
    }
}

fn init_logging(config_path: &Path, verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let configured = Config::load(config_path)
        .ok()
        .map(|c| c.camera.logging_level);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            verbose,
            rust_log.as_deref(),
            configured.as_deref(),
        ))
        .with_target(false)
        .init();
}

/// `--verbose` wins, then `RUST_LOG`, then the configured level.
fn log_filter(verbose: bool, rust_log: Option<&str>, configured: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("camdist=debug");
    }
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }

    let level = configured.map_or_else(|| "info".to_string(), level_name);
    EnvFilter::try_new(format!("camdist={}", level))
        .unwrap_or_else(|_| EnvFilter::new("camdist=info"))
}

/// Accepts the level names older configs used ("WARNING", "CRITICAL").
fn level_name(configured: &str) -> String {
    match configured.trim().to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

fn exit_countdown(interrupt: &Interrupt) {
    for remaining in (1..=EXIT_COUNTDOWN_SECS).rev() {
        info!("Exit in: {}", remaining);
        if interrupt.sleep(Duration::from_secs(1)) {
            break;
        }
    }
}
