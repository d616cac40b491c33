//! One complete run: select a topic, gather facts, generate, publish.
//!
//! Every step awaits the previous one; a run makes at most one fact fetch,
//! three generation calls and one post.

use crate::config::BotConfig;
use crate::error::{BotError, ConfigError, PublishError};
use crate::models::{RunReport, Topic};
use crate::orchestrator::{FallbackValidation, Orchestrator};
use crate::policy::LengthLimits;
use crate::prompt::PromptBuilder;
use crate::providers::{GeminiProvider, PerplexityProvider};
use crate::publish::XPublisher;
use crate::rotation::Rotation;
use crate::sources::{FactSources, FootballData, NewsApi};
use chrono::NaiveDate;
use itertools::Itertools;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

pub struct NewsBot {
    sources: FactSources,
    gemini: GeminiProvider,
    perplexity: PerplexityProvider,
    publisher: XPublisher,
    rotation: Rotation,
    topic_override: Option<Topic>,
    history_prompt: Option<String>,
    limits: LengthLimits,
    fallback_validation: FallbackValidation,
    dry_run: bool,
}

impl NewsBot {
    /// Wire every client from `config`. All of them share one HTTP client and
    /// its timeout.
    pub fn new(config: BotConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let endpoints = &config.endpoints;
        let sources = FactSources {
            football: FootballData::new(client.clone(), config.football_data_api_key)
                .with_base_url(&endpoints.football_data),
            news: NewsApi::new(client.clone(), config.news_api_key).with_base_url(&endpoints.news_api),
        };
        let gemini = GeminiProvider::new(client.clone(), config.google_api_key, config.gemini_model)
            .with_base_url(&endpoints.gemini);
        let perplexity =
            PerplexityProvider::new(client.clone(), config.perplexity_api_key, config.perplexity_model)
                .with_base_url(&endpoints.perplexity);
        let publisher = XPublisher::new(client, config.x_credentials).with_base_url(&endpoints.x_api);

        if !perplexity.is_configured() {
            info!("PERPLEXITY_API_KEY not set; fallback generation will fail");
        }
        debug!(
            rotation = %config.rotation.topics().iter().join(", "),
            topic_override = ?config.topic_override,
            "Topic selection ready"
        );

        Ok(Self {
            sources,
            gemini,
            perplexity,
            publisher,
            rotation: config.rotation,
            topic_override: config.topic_override,
            history_prompt: config.history_prompt,
            limits: config.limits,
            fallback_validation: config.fallback_validation,
            dry_run: config.dry_run,
        })
    }

    /// The override if one was given, otherwise the rotation slot for `tick`.
    pub fn topic_for(&self, tick: u64) -> Topic {
        self.topic_override.unwrap_or_else(|| self.rotation.select(tick))
    }

    #[instrument(level = "info", skip(self), fields(dry_run = self.dry_run))]
    pub async fn run(&self, tick: u64, today: NaiveDate) -> Result<RunReport, BotError> {
        let topic = self.topic_for(tick);
        info!(%topic, "Selected topic");

        let fact = self.sources.fetch(&topic).await.map_err(|source| {
            error!(%topic, error = %source, "Fact fetch failed; aborting run");
            BotError::FactFetch {
                topic: topic.to_string(),
                source,
            }
        })?;

        let builder = PromptBuilder::new(self.limits, today, tick).with_history_override(self.history_prompt.clone());
        let generated = Orchestrator::new(&builder, self.gemini.clone(), self.perplexity.clone())
            .with_fallback_validation(self.fallback_validation)
            .run(&topic, fact.as_ref())
            .await?;

        let tweet_id = if self.dry_run {
            info!(text = %generated.text, "Dry run; not posting");
            None
        } else {
            let posted = self.publisher.post(&generated.text).await.map_err(|source| BotError::Publish {
                topic: topic.to_string(),
                source,
            })?;
            Some(posted.id)
        };

        Ok(RunReport {
            topic,
            text: generated.text,
            provider: generated.provider,
            escalated: generated.escalated,
            dry_run: self.dry_run,
            tweet_id,
        })
    }

    pub async fn verify_credentials(&self) -> Result<String, PublishError> {
        self.publisher.verify_credentials().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use crate::models::League;
    use crate::oauth::OAuthCredentials;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GEMINI_PATH: &str = "/v1beta/models/gemini-flash-latest:generateContent";

    fn config(uri: &str, topic: Option<Topic>, dry_run: bool) -> BotConfig {
        BotConfig {
            google_api_key: "g".to_string(),
            gemini_model: "gemini-flash-latest".to_string(),
            perplexity_api_key: Some("p".to_string()),
            perplexity_model: "sonar-pro".to_string(),
            x_credentials: OAuthCredentials {
                consumer_key: "ck".to_string(),
                consumer_secret: "cs".to_string(),
                token: "t".to_string(),
                token_secret: "ts".to_string(),
            },
            football_data_api_key: "fd".to_string(),
            news_api_key: "na".to_string(),
            limits: LengthLimits::default(),
            timeout: Duration::from_secs(5),
            rotation: Rotation::default(),
            topic_override: topic,
            history_prompt: None,
            fallback_validation: FallbackValidation::Strict,
            dry_run,
            endpoints: Endpoints {
                gemini: uri.to_string(),
                perplexity: uri.to_string(),
                football_data: uri.to_string(),
                news_api: uri.to_string(),
                x_api: uri.to_string(),
            },
        }
    }

    fn gemini_reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    async fn mount_pl_result(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v4/competitions/PL/matches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": [{
                    "homeTeam": { "name": "Liverpool FC" },
                    "awayTeam": { "name": "Everton FC" },
                    "utcDate": "2025-04-02T19:00:00Z",
                    "status": "FINISHED",
                    "score": { "fullTime": { "home": 2, "away": 1 } }
                }]
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()
    }

    fn long_post() -> String {
        "Liverpool edge Everton 2-1 at Anfield in a fierce Merseyside derby, \
         with a late winner sealing three huge points in the title race. #LFC #PremierLeague"
            .to_string()
    }

    #[tokio::test]
    async fn test_result_topic_posts_gemini_text() {
        let server = MockServer::start().await;
        mount_pl_result(&server).await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(gemini_reply(&format!("\"{}\"", long_post())))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": { "id": "42", "text": long_post() }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bot = NewsBot::new(config(
            &server.uri(),
            Some(Topic::LeagueResult {
                league: League::PremierLeague,
            }),
            false,
        ))
        .unwrap();
        let report = bot.run(0, today()).await.unwrap();

        assert_eq!(report.text, long_post());
        assert_eq!(report.provider, "gemini");
        assert!(!report.escalated);
        assert_eq!(report.tweet_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_fact_fetch_failure_aborts_before_generation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex("^/v4/competitions/.*/matches$"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(gemini_reply("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let bot = NewsBot::new(config(
            &server.uri(),
            Some(Topic::LeagueResult {
                league: League::SerieA,
            }),
            false,
        ))
        .unwrap();
        let err = bot.run(0, today()).await.unwrap_err();

        assert!(matches!(err, BotError::FactFetch { .. }));
        assert!(err.to_string().contains("Serie A"));
    }

    #[tokio::test]
    async fn test_dry_run_skips_publishing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(gemini_reply("On this day in 2005, Liverpool won in Istanbul. #LFC"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let bot = NewsBot::new(config(
            &server.uri(),
            Some(Topic::ClubHistory {
                theme: crate::models::HistoryTheme::OnThisDay,
            }),
            true,
        ))
        .unwrap();
        let report = bot.run(7, today()).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.tweet_id, None);
        assert_eq!(report.text, "On this day in 2005, Liverpool won in Istanbul. #LFC");
    }

    #[tokio::test]
    async fn test_publish_rejection_is_publish_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(gemini_reply("Matchday roundup: big games across the Bundesliga this weekend. #Bundesliga"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "detail": "You are not allowed to create a Tweet with duplicate content."
            })))
            .mount(&server)
            .await;

        let bot = NewsBot::new(config(
            &server.uri(),
            Some(Topic::LeagueRoundup {
                league: League::Bundesliga,
            }),
            false,
        ))
        .unwrap();
        let err = bot.run(0, today()).await.unwrap_err();

        assert!(matches!(
            err,
            BotError::Publish {
                source: PublishError::Rejected { status: 403, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rotation_used_without_override() {
        let bot = NewsBot::new(config("http://127.0.0.1:1", None, true)).unwrap();
        assert_eq!(
            bot.topic_for(1),
            Topic::LeagueResult {
                league: League::LaLiga
            }
        );
        assert_eq!(
            bot.topic_for(6),
            Topic::Headlines {
                category: crate::models::NewsCategory::Crypto
            }
        );

        let forced = NewsBot::new(config(
            "http://127.0.0.1:1",
            Some(Topic::ClubHistory {
                theme: crate::models::HistoryTheme::Throwback,
            }),
            true,
        ))
        .unwrap();
        assert_eq!(
            forced.topic_for(1),
            Topic::ClubHistory {
                theme: crate::models::HistoryTheme::Throwback
            }
        );
    }
}
