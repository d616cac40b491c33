//! Command-line interface definitions for Matchday Bot.
//!
//! Every option can also come from an environment variable (or a `.env` file,
//! loaded before parsing), which is how a scheduler normally configures the
//! bot. Missing required credentials stop the process before anything runs.

use crate::models::Topic;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Matchday Bot application.
///
/// # Examples
///
/// ```sh
/// # Everything from the environment / .env
/// matchday_bot
///
/// # Generate a Serie A post without publishing it
/// matchday_bot --topic SA --dry-run
///
/// # Use a custom rotation table
/// matchday_bot --rotation ./rotation.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Google Generative Language API key (primary provider)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = crate::providers::gemini::DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Perplexity API key (fallback provider; fallback always fails without it)
    #[arg(long, env = "PERPLEXITY_API_KEY", hide_env_values = true)]
    pub perplexity_api_key: Option<String>,

    /// Perplexity model name
    #[arg(long, env = "PERPLEXITY_MODEL", default_value = crate::providers::perplexity::DEFAULT_MODEL)]
    pub perplexity_model: String,

    /// X API consumer key
    #[arg(long, env = "X_API_KEY", hide_env_values = true)]
    pub x_api_key: String,

    /// X API consumer secret
    #[arg(long, env = "X_API_KEY_SECRET", hide_env_values = true)]
    pub x_api_key_secret: String,

    /// X user access token
    #[arg(long, env = "X_ACCESS_TOKEN", hide_env_values = true)]
    pub x_access_token: String,

    /// X user access token secret
    #[arg(long, env = "X_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub x_access_token_secret: String,

    /// football-data.org API key
    #[arg(long, env = "FOOTBALL_DATA_API_KEY", hide_env_values = true)]
    pub football_data_api_key: String,

    /// newsapi.org API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: String,

    /// Maximum characters per post
    #[arg(long, env = "POST_MAX_LEN", default_value_t = 280)]
    pub max_len: usize,

    /// Minimum characters for posts built on fetched facts
    #[arg(long, env = "POST_MIN_LEN", default_value_t = 100)]
    pub min_len: usize,

    /// Timeout for every outbound HTTP call, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,

    /// YAML file with the topic rotation table
    #[arg(long, env = "TOPIC_ROTATION")]
    pub rotation: Option<PathBuf>,

    /// Force a topic: a league code (PL, PD, BL1, SA, FL1, IRL), roundup:<code>,
    /// crypto, on-this-day or throwback
    #[arg(long, env = "BOT_TOPIC")]
    pub topic: Option<Topic>,

    /// Replacement subject text for club-history prompts
    #[arg(long, env = "LIVERPOOL_NEWS_PROMPT")]
    pub history_prompt: Option<String>,

    /// Accept fallback output below the minimum length
    #[arg(long)]
    pub lenient_fallback: bool,

    /// Generate and validate the post, but do not publish it
    #[arg(long, env = "BOT_DRY_RUN")]
    pub dry_run: bool,

    /// Verify the X credentials before running
    #[arg(long)]
    pub check_auth: bool,
}
