//! Splitr balance report
//!
//! Reads a JSON snapshot of users, groups, expenses and settlements, runs
//! the balance engine over it and prints the result as JSON.
//!
//! Usage: `splitr-report <snapshot.json> [user-id]`

mod report;
mod snapshot;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use splitr_shared::types::UserId;
use splitr_shared::{AppConfig, AppError};

use crate::report::build_report;
use crate::snapshot::Snapshot;

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return exit_code(&err);
        }
    };

    init_tracing(&config);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("report failed: {err:#}");
            err.downcast_ref::<AppError>()
                .map_or(ExitCode::FAILURE, exit_code)
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    // Logs go to stderr; stdout carries the report
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| AppError::Validation("usage: splitr-report <snapshot.json> [user-id]".to_string()))?;
    let subject = args
        .next()
        .map(|raw| {
            raw.parse::<UserId>()
                .map_err(|e| AppError::Validation(format!("invalid user id {raw}: {e}")))
        })
        .transpose()?;

    let mut snapshot =
        Snapshot::from_path(&path).with_context(|| format!("reading {}", path.display()))?;
    let dropped = snapshot.retain_valid(config.ledger.split_tolerance);
    info!(
        path = %path.display(),
        users = snapshot.users.len(),
        groups = snapshot.groups.len(),
        dropped,
        "snapshot loaded"
    );

    let report = build_report(&snapshot, subject, config, Utc::now())?;
    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");
    Ok(())
}

fn exit_code(err: &AppError) -> ExitCode {
    u8::try_from(err.exit_code()).map_or(ExitCode::FAILURE, ExitCode::from)
}
