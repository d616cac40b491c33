//! # Matchday Bot
//!
//! A scheduled posting bot. Each invocation picks one topic from a fixed
//! rotation, gathers facts for it, generates a short post with an LLM and
//! publishes it to X.
//!
//! ## Features
//!
//! - Topic rotation keyed on the current time (league results, crypto
//!   headlines, club history and league roundups)
//! - Real match results from football-data.org and headlines from newsapi.org
//! - Generation with Google Gemini, one escalated retry for short output, and a
//!   Perplexity fallback
//! - Length and formatting policy applied to every post before publishing
//! - OAuth 1.0a signed posting to the X API v2
//!
//! ## Usage
//!
//! ```sh
//! matchday_bot                    # credentials from the environment or .env
//! matchday_bot --topic PL --dry-run
//! ```
//!
//! ## Architecture
//!
//! One run is a straight pipeline:
//! 1. **Selection**: rotation slot for the current tick, unless overridden
//! 2. **Facts**: fetch the latest result or headline for fact-backed topics
//! 3. **Generation**: primary, escalated primary, then fallback
//! 4. **Publishing**: post the validated text and report the result as JSON
//!
//! Exit status is `0` on success, `1` when the run fails and `2` for invalid
//! configuration.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod bot;
mod cli;
mod config;
mod error;
mod models;
mod oauth;
mod orchestrator;
mod policy;
mod prompt;
mod providers;
mod publish;
mod rotation;
mod sources;
mod utils;

use bot::NewsBot;
use cli::Cli;
use config::BotConfig;
use rotation::tick_now;
use utils::local_today;

#[tokio::main]
#[instrument]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("matchday_bot starting up");

    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    debug!(
        topic = ?args.topic,
        rotation = ?args.rotation,
        dry_run = args.dry_run,
        "Parsed CLI arguments"
    );
    let check_auth = args.check_auth;

    let bot = match BotConfig::from_cli(args).and_then(NewsBot::new) {
        Ok(bot) => bot,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    if check_auth {
        match bot.verify_credentials().await {
            Ok(username) => info!(%username, "X credentials OK"),
            Err(e) => {
                error!(error = %e, "X credential check failed");
                return ExitCode::FAILURE;
            }
        }
    }

    let tick = tick_now();
    let outcome = bot.run(tick, local_today()).await;
    let elapsed_ms = start_time.elapsed().as_millis() as u64;

    match outcome {
        Ok(report) => {
            match serde_json::to_string(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => error!(error = %e, "Failed to serialize run report"),
            }
            info!(
                topic = %report.topic,
                provider = report.provider,
                tweet_id = ?report.tweet_id,
                elapsed_ms,
                "Run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, tick, elapsed_ms, "Run failed");
            ExitCode::FAILURE
        }
    }
}
