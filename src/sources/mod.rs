//! External fact sources.
//!
//! Fact-backed topics need real data before prompting. Each source returns a
//! single [`FactRecord`] or fails; nothing is ever synthesized in its place.
//!
//! | Source | Module | Topic |
//! |--------|--------|-------|
//! | football-data.org v4 | [`football`] | [`Topic::LeagueResult`] |
//! | newsapi.org v2 | [`news`] | [`Topic::Headlines`] |

use crate::error::FactFetchError;
use crate::models::{FactRecord, Topic};
use tracing::{info, instrument};

pub mod football;
pub mod news;

pub use football::FootballData;
pub use news::NewsApi;

/// Both fact sources, dispatched by topic.
#[derive(Debug, Clone)]
pub struct FactSources {
    pub football: FootballData,
    pub news: NewsApi,
}

impl FactSources {
    /// Fetch the facts `topic` needs, or `None` for topics without facts.
    #[instrument(level = "info", skip_all, fields(%topic))]
    pub async fn fetch(&self, topic: &Topic) -> Result<Option<FactRecord>, FactFetchError> {
        let fact = match topic {
            Topic::LeagueResult { league } => {
                Some(FactRecord::Match(self.football.latest_result(*league).await?))
            }
            Topic::Headlines { category } => {
                Some(FactRecord::Headline(self.news.latest_headline(category.query()).await?))
            }
            Topic::ClubHistory { .. } | Topic::LeagueRoundup { .. } => None,
        };
        info!(has_fact = fact.is_some(), "Facts ready");
        Ok(fact)
    }
}

/// Read a failed response into a [`FactFetchError::Status`].
pub(crate) async fn status_error(source_name: &'static str, response: reqwest::Response) -> FactFetchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    FactFetchError::Status {
        source_name,
        status,
        body: crate::utils::truncate_for_log(&body, 500),
    }
}
