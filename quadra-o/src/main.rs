/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use quadra_o::config::{ConfigOverrides, CoordinatorConfig};
use quadra_o::coordinator::Coordinator;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Quadra-O integration coordinator.
///
/// Example:
///   quadra-o --listen 0.0.0.0:12345 --window-secs 30 \
///            --config coordinator.yaml
#[derive(Debug, Parser)]
#[command(
    name = "quadra-o",
    about = "Quadra-O coordinator – splits 1/ln(x) integration jobs across workers",
    long_about = None,
)]
struct Cli {
    /// `host:port` to accept worker connections on.
    #[arg(short = 'l', long = "listen")]
    listen: Option<String>,

    /// Seconds additional workers may join after the job is submitted.
    #[arg(short = 'w', long = "window-secs")]
    window_secs: Option<u64>,

    /// Give up on a worker's partial result after this many seconds.
    #[arg(short = 't', long = "result-timeout-secs")]
    result_timeout_secs: Option<u64>,

    /// Path to the YAML coordinator configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            registration_window_secs: self.window_secs,
            result_timeout_secs: self.result_timeout_secs,
        }
    }
}

fn load_config(cli: &Cli) -> Result<CoordinatorConfig> {
    let base = match &cli.config {
        Some(path) => CoordinatorConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, using built-in defaults");
            CoordinatorConfig::default()
        }
    };
    base.apply_overrides(&cli.overrides())
        .context("Invalid command-line settings")
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Quadra-O starting up...");

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    info!(
        listen         = %config.listen,
        window_secs    = config.registration_window.as_secs(),
        result_timeout = ?config.result_timeout,
        "Configuration"
    );

    let report = match Coordinator::new(config).run().await {
        Ok(r) => r,
        Err(e) => {
            error!("Integration job aborted: {:#}", anyhow::Error::new(e));
            process::exit(1);
        }
    };

    if !report.is_complete() {
        warn!(
            missing = report.failures.len(),
            "Reporting a partial sum, some workers did not contribute"
        );
    }
    print!("{report}");
}
