//! Text-generation backends.
//!
//! Every backend implements [`GenerationProvider`]: map a [`Prompt`] onto the
//! backend's request schema, send it once, and return the first textual
//! candidate untouched. Normalization belongs to [`crate::policy`] and retry
//! decisions to [`crate::orchestrator`].
//!
//! | Provider | Module | Role |
//! |----------|--------|------|
//! | Gemini | [`gemini`] | primary |
//! | Perplexity | [`perplexity`] | fallback |

use crate::error::{ProviderError, ProviderErrorKind};
use crate::prompt::Prompt;
use crate::utils::truncate_for_log;

pub mod gemini;
pub mod perplexity;

pub use gemini::GeminiProvider;
pub use perplexity::PerplexityProvider;

/// A backend that turns a prompt into raw text.
pub trait GenerationProvider {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Send `prompt` and return the first candidate's text, unprocessed.
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError>;
}

/// Turn a non-success HTTP response into a [`ProviderError`].
pub(crate) async fn status_error(provider: &'static str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::new(
        provider,
        ProviderErrorKind::Status {
            status,
            body: truncate_for_log(&body, 500),
        },
    )
}

pub(crate) fn transport_error(provider: &'static str, err: reqwest::Error) -> ProviderError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    ProviderError::new(provider, ProviderErrorKind::Transport(message))
}
