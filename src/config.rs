//! Validated runtime configuration.
//!
//! [`BotConfig`] is built once at startup from the parsed [`Cli`] and then
//! handed to each component; nothing reads the environment after this point.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::Topic;
use crate::oauth::OAuthCredentials;
use crate::orchestrator::FallbackValidation;
use crate::policy::LengthLimits;
use crate::rotation::Rotation;
use crate::utils::mask_secret;
use std::time::Duration;
use tracing::debug;

/// Base URLs of every remote API. Overridden in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub gemini: String,
    pub perplexity: String,
    pub football_data: String,
    pub news_api: String,
    pub x_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini: crate::providers::gemini::DEFAULT_BASE_URL.to_string(),
            perplexity: crate::providers::perplexity::DEFAULT_BASE_URL.to_string(),
            football_data: crate::sources::football::DEFAULT_BASE_URL.to_string(),
            news_api: crate::sources::news::DEFAULT_BASE_URL.to_string(),
            x_api: crate::publish::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub google_api_key: String,
    pub gemini_model: String,
    pub perplexity_api_key: Option<String>,
    pub perplexity_model: String,
    pub x_credentials: OAuthCredentials,
    pub football_data_api_key: String,
    pub news_api_key: String,
    pub limits: LengthLimits,
    pub timeout: Duration,
    pub rotation: Rotation,
    pub topic_override: Option<Topic>,
    pub history_prompt: Option<String>,
    pub fallback_validation: FallbackValidation,
    pub dry_run: bool,
    pub endpoints: Endpoints,
}

impl BotConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let rotation = match &cli.rotation {
            Some(path) => Rotation::from_yaml_file(path)?,
            None => Rotation::default(),
        };

        let config = Self {
            google_api_key: cli.google_api_key,
            gemini_model: cli.gemini_model,
            perplexity_api_key: cli.perplexity_api_key.filter(|k| !k.trim().is_empty()),
            perplexity_model: cli.perplexity_model,
            x_credentials: OAuthCredentials {
                consumer_key: cli.x_api_key,
                consumer_secret: cli.x_api_key_secret,
                token: cli.x_access_token,
                token_secret: cli.x_access_token_secret,
            },
            football_data_api_key: cli.football_data_api_key,
            news_api_key: cli.news_api_key,
            limits: LengthLimits {
                max_len: cli.max_len,
                min_len: cli.min_len,
            },
            timeout: Duration::from_secs(cli.timeout_secs),
            rotation,
            topic_override: cli.topic,
            history_prompt: cli.history_prompt,
            fallback_validation: if cli.lenient_fallback {
                FallbackValidation::MaxLenOnly
            } else {
                FallbackValidation::Strict
            },
            dry_run: cli.dry_run,
            endpoints: Endpoints::default(),
        };
        config.validate()?;
        config.log_credentials();
        Ok(config)
    }

    /// Semantic checks clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("GOOGLE_API_KEY", &self.google_api_key),
            ("GEMINI_MODEL", &self.gemini_model),
            ("PERPLEXITY_MODEL", &self.perplexity_model),
            ("X_API_KEY", &self.x_credentials.consumer_key),
            ("X_API_KEY_SECRET", &self.x_credentials.consumer_secret),
            ("X_ACCESS_TOKEN", &self.x_credentials.token),
            ("X_ACCESS_TOKEN_SECRET", &self.x_credentials.token_secret),
            ("FOOTBALL_DATA_API_KEY", &self.football_data_api_key),
            ("NEWS_API_KEY", &self.news_api_key),
        ];
        if let Some(&(name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::BlankValue(name));
        }

        if self.limits.max_len < 4 {
            return Err(ConfigError::MaxLenTooSmall(self.limits.max_len));
        }
        if self.limits.min_len >= self.limits.max_len {
            return Err(ConfigError::MinLenNotBelowMax {
                min: self.limits.min_len,
                max: self.limits.max_len,
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    fn log_credentials(&self) {
        debug!(
            google_api_key = %mask_secret(&self.google_api_key),
            perplexity_configured = self.perplexity_api_key.is_some(),
            x_api_key = %mask_secret(&self.x_credentials.consumer_key),
            x_access_token_present = !self.x_credentials.token.is_empty(),
            football_data_configured = !self.football_data_api_key.is_empty(),
            news_api_configured = !self.news_api_key.is_empty(),
            "Credentials loaded"
        );
    }
}
