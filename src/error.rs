//! Error types for every stage of a bot run.
//!
//! Recoverable failures ([`ProviderError`], [`PolicyError`]) never leave the
//! [`crate::orchestrator`]; everything else is terminal for the run and is
//! wrapped in [`BotError`] with enough context to diagnose without re-running.

use thiserror::Error;

/// Startup-fatal configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be blank")]
    BlankValue(&'static str),
    #[error("max length must be at least 4 characters (got {0})")]
    MaxLenTooSmall(usize),
    #[error("min length {min} must be smaller than max length {max}")]
    MinLenNotBelowMax { min: usize, max: usize },
    #[error("timeout must be at least one second")]
    ZeroTimeout,
    #[error("topic rotation must list at least one topic")]
    EmptyRotation,
    #[error("failed to read rotation file {path}: {source}")]
    RotationRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rotation: {0}")]
    RotationParse(#[from] serde_yaml::Error),
    #[error("unknown topic '{0}' (expected a league code, roundup:<code>, crypto, on-this-day or throwback)")]
    UnknownTopic(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure to obtain the supporting facts for a fact-backed topic.
#[derive(Debug, Error)]
pub enum FactFetchError {
    #[error("{source_name} request failed: {message}")]
    Transport {
        source_name: &'static str,
        message: String,
    },
    #[error("{source_name} API error (status {status}): {body}")]
    Status {
        source_name: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode {source_name} response: {message}")]
    Decode {
        source_name: &'static str,
        message: String,
    },
    #[error("{0}")]
    NotFound(String),
}

/// What went wrong inside a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderErrorKind {
    #[error("API key not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("API error (status {status}): {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("no candidates returned")]
    NoCandidates,
}

/// A generation backend failed to return text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider}: {kind}")]
pub struct ProviderError {
    pub provider: &'static str,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: &'static str, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/// Generated text that the content policy refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("empty response")]
    EmptyResponse,
    #[error("response too short ({len} < {min} characters)")]
    TooShort { len: usize, min: usize },
}

/// The last reason an attempt failed, whichever stage produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Both providers were exhausted without producing acceptable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation failed for {topic} (last provider: {provider}): {reason}")]
pub struct GenerationError {
    pub topic: String,
    pub provider: &'static str,
    pub reason: AttemptFailure,
}

/// Posting the validated text failed.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("X authentication failed (status {status}): {message}")]
    Auth { status: u16, message: String },
    #[error("X request failed: {0}")]
    Transport(String),
    #[error("X API rejected the post (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("failed to sign request: {0}")]
    Signing(String),
}

/// Terminal failure of a run.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to fetch facts for {topic}: {source}")]
    FactFetch {
        topic: String,
        #[source]
        source: FactFetchError,
    },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("failed to post to X for {topic}: {source}")]
    Publish {
        topic: String,
        #[source]
        source: PublishError,
    },
}
