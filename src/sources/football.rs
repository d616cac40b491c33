//! Finished match results from [football-data.org](https://www.football-data.org).
//!
//! Requests the last few finished matches of a competition and keeps the most
//! recent one that carries a full-time score.

use super::status_error;
use crate::error::FactFetchError;
use crate::models::{League, MatchResult};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.football-data.org";

const NAME: &str = "football-data.org";

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct ApiMatch {
    homeTeam: ApiTeam,
    awayTeam: ApiTeam,
    utcDate: String,
    score: ApiScore,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    name: Option<String>,
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct ApiScore {
    fullTime: ApiFullTime,
}

#[derive(Debug, Deserialize)]
struct ApiFullTime {
    home: Option<u32>,
    away: Option<u32>,
}

impl ApiMatch {
    /// `None` unless every field needed for a post is present.
    fn into_result(self) -> Option<MatchResult> {
        Some(MatchResult {
            home_team: self.homeTeam.name?,
            away_team: self.awayTeam.name?,
            home_score: self.score.fullTime.home?,
            away_score: self.score.fullTime.away?,
            date: parse_match_date(&self.utcDate)?,
        })
    }
}

fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

#[derive(Debug, Clone)]
pub struct FootballData {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FootballData {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Most recent finished match of `league`.
    #[instrument(level = "info", skip_all, fields(league = league.code()))]
    pub async fn latest_result(&self, league: League) -> Result<MatchResult, FactFetchError> {
        let url = Url::parse_with_params(
            &format!(
                "{}/v4/competitions/{}/matches",
                self.base_url.trim_end_matches('/'),
                league.code()
            ),
            &[("status", "FINISHED"), ("limit", "5")],
        )
        .map_err(|e| FactFetchError::Transport {
            source_name: NAME,
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .header("X-Auth-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| FactFetchError::Transport {
                source_name: NAME,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(status_error(NAME, response).await);
        }

        let body: MatchesResponse = response.json().await.map_err(|e| FactFetchError::Decode {
            source_name: NAME,
            message: e.to_string(),
        })?;
        debug!(count = body.matches.len(), "Received finished matches");

        let result = body
            .matches
            .into_iter()
            .rev()
            .find_map(ApiMatch::into_result)
            .ok_or_else(|| {
                FactFetchError::NotFound(format!(
                    "no finished {} matches found",
                    league.display_name()
                ))
            })?;

        info!(
            home = %result.home_team,
            away = %result.away_team,
            score = %format!("{}-{}", result.home_score, result.away_score),
            date = %result.date,
            "Fetched latest result"
        );
        Ok(result)
    }
}
