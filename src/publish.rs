//! Posting to X (API v2).
//!
//! [`XPublisher`] signs every request with OAuth 1.0a user-context
//! credentials (see [`crate::oauth`]).
//!
//! | Call | Endpoint | Success |
//! |------|----------|---------|
//! | [`XPublisher::post`] | `POST /2/tweets` | `201 Created` |
//! | [`XPublisher::verify_credentials`] | `GET /2/users/me` | `200 OK` |

use crate::error::PublishError;
use crate::models::PostedTweet;
use crate::oauth::{OAuthCredentials, authorization_header};
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

#[derive(Debug, Serialize)]
struct TweetRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: Option<TweetData>,
    #[serde(default)]
    errors: Vec<ApiError>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    data: Option<MeData>,
}

#[derive(Debug, Deserialize)]
struct MeData {
    id: String,
    username: String,
}

impl TweetResponse {
    /// Best human-readable rejection message, falling back to the raw body.
    fn rejection_message(&self, raw: &str) -> String {
        self.errors
            .iter()
            .find_map(|e| e.message.clone().or_else(|| e.detail.clone()))
            .or_else(|| self.detail.clone())
            .unwrap_or_else(|| truncate_for_log(raw, 500))
    }
}

#[derive(Debug, Clone)]
pub struct XPublisher {
    client: Client,
    credentials: OAuthCredentials,
    base_url: String,
}

impl XPublisher {
    pub fn new(client: Client, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> Result<Url, PublishError> {
        Url::parse(&format!("{}{}", self.base_url.trim_end_matches('/'), path))
            .map_err(|e| PublishError::Transport(e.to_string()))
    }

    /// Post `text` and return the identifier X assigned to it.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn post(&self, text: &str) -> Result<PostedTweet, PublishError> {
        let url = self.url("/2/tweets")?;
        let auth = authorization_header(&self.credentials, "POST", &url)?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&TweetRequest { text })
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), body = %truncate_for_log(&raw, 300), "X responded");

        let parsed: Option<TweetResponse> = serde_json::from_str(&raw).ok();

        if status == StatusCode::UNAUTHORIZED || (status == StatusCode::FORBIDDEN && is_auth_problem(&raw)) {
            let message = parsed
                .as_ref()
                .map(|p| p.rejection_message(&raw))
                .unwrap_or_else(|| truncate_for_log(&raw, 500));
            error!(status = status.as_u16(), %message, "X rejected credentials");
            return Err(PublishError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        if status != StatusCode::CREATED {
            let message = parsed
                .as_ref()
                .map(|p| p.rejection_message(&raw))
                .unwrap_or_else(|| truncate_for_log(&raw, 500));
            error!(status = status.as_u16(), %message, "X rejected the post");
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let data = parsed.and_then(|p| p.data).ok_or_else(|| PublishError::Rejected {
            status: status.as_u16(),
            message: format!("missing tweet data in response: {}", truncate_for_log(&raw, 300)),
        })?;

        info!(id = %data.id, "Posted to X");
        Ok(PostedTweet {
            id: data.id,
            text: data.text,
        })
    }

    /// Check the credentials and return the authenticated username.
    #[instrument(level = "info", skip_all)]
    pub async fn verify_credentials(&self) -> Result<String, PublishError> {
        let url = self.url("/2/users/me")?;
        let auth = authorization_header(&self.credentials, "GET", &url)?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PublishError::Auth {
                status: status.as_u16(),
                message: truncate_for_log(&raw, 500),
            });
        }

        let me = serde_json::from_str::<MeResponse>(&raw)
            .ok()
            .and_then(|r| r.data)
            .ok_or_else(|| PublishError::Auth {
                status: status.as_u16(),
                message: format!("unexpected response: {}", truncate_for_log(&raw, 300)),
            })?;

        info!(user_id = %me.id, username = %me.username, "X credentials verified");
        Ok(me.username)
    }
}

/// A 403 is only an auth failure when X says so; duplicate-content and
/// policy rejections also use 403.
fn is_auth_problem(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.contains("unsupported authentication") || lower.contains("oauth") || lower.contains("not permitted to perform")
}
