/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::io;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use quadra_n::client::{run_worker, RetryPolicy, WorkerOptions, DEFAULT_SERVER};
use quadra_n::prompt::{ask_is_submitter, FixedJobSource, JobSource, PromptJobSource};
use quadra_o::job::{IntegrationJob, Method};

// ── CLI argument definition ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Role {
    /// Supplies the job, then computes a share like every other worker.
    Submitter,
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    Rectangle,
    Trapezoidal,
}

impl From<MethodArg> for Method {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Rectangle => Method::Rectangle,
            MethodArg::Trapezoidal => Method::Trapezoidal,
        }
    }
}

/// Quadra-N integration worker.
///
/// Example:
///   quadra-n --role submitter --lower 2 --upper 10 --step 0.01 --method rectangle
///   quadra-n --role worker --server 192.168.0.10:12345
#[derive(Debug, Parser)]
#[command(
    name = "quadra-n",
    about = "Quadra-N worker – integrates one sub-interval of 1/ln(x) for Quadra-O",
    long_about = None,
)]
struct Cli {
    /// Coordinator `host:port`.
    #[arg(short = 's', long = "server", default_value = DEFAULT_SERVER)]
    server: String,

    /// Whether this worker submits the job.  Asked interactively when absent.
    #[arg(short = 'r', long = "role", value_enum)]
    role: Option<Role>,

    /// Lower integration limit (>= 2).  Submitter only.
    #[arg(long = "lower", requires_all = ["upper", "step"])]
    lower: Option<f64>,

    /// Upper integration limit.  Submitter only.
    #[arg(long = "upper", requires = "lower")]
    upper: Option<f64>,

    /// Integration step.  Submitter only.
    #[arg(long = "step", requires = "lower")]
    step: Option<f64>,

    /// Quadrature rule.  Submitter only.
    #[arg(short = 'm', long = "method", value_enum, default_value_t = MethodArg::Rectangle)]
    method: MethodArg,

    /// Connection attempts before giving up.
    #[arg(long = "connect-attempts", default_value_t = 5)]
    connect_attempts: u32,

    /// Seconds between connection attempts.
    #[arg(long = "retry-delay-secs", default_value_t = 2)]
    retry_delay_secs: u64,
}

impl Cli {
    fn job_source(&self) -> Box<dyn JobSource> {
        let prompt = PromptJobSource::stdio();
        match (self.lower, self.upper, self.step) {
            (Some(lower_bound), Some(upper_bound), Some(step)) => {
                let candidate = IntegrationJob {
                    lower_bound,
                    upper_bound,
                    step,
                    method: self.method.into(),
                };
                Box::new(FixedJobSource::new(candidate, prompt))
            }
            _ => Box::new(prompt),
        }
    }
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

    let cli = Cli::parse();

    let is_submitter = match cli.role {
        Some(role) => role == Role::Submitter,
        None => match ask_is_submitter(&mut io::stdin().lock(), &mut io::stdout()) {
            Ok(answer) => answer,
            Err(e) => {
                error!("Failed to read the worker role: {}", e);
                process::exit(1);
            }
        },
    };

    let options = WorkerOptions {
        server: cli.server.clone(),
        retry: RetryPolicy {
            attempts: cli.connect_attempts,
            delay: Duration::from_secs(cli.retry_delay_secs),
        },
    };

    info!(
        server       = %options.server,
        submitter    = is_submitter,
        attempts     = options.retry.attempts,
        "Quadra-N starting up..."
    );

    let source = is_submitter.then(|| cli.job_source());
    match run_worker(&options, source).await {
        Ok(outcome) => {
            println!(
                "Received range: {}\nPartial result: {}",
                outcome.assignment, outcome.partial
            );
        }
        Err(e) => {
            error!("Worker failed: {:#}", anyhow::Error::new(e));
            process::exit(1);
        }
    }
}
