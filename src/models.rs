//! Data models shared across the pipeline.
//!
//! - [`Topic`]: what a run posts about, chosen once per run
//! - [`FactRecord`]: real-world data fetched before prompting
//! - [`PostedTweet`] and [`RunReport`]: what a run produced
//!
//! Topics serialize with a `kind` tag so a rotation table can be written as
//! YAML:
//!
//! ```yaml
//! topics:
//!   - kind: league_result
//!     league: PL
//!   - kind: headlines
//!     category: crypto
//!   - kind: club_history
//!     theme: on_this_day
//! ```

use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A football competition as known to football-data.org.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    #[serde(rename = "PL")]
    PremierLeague,
    #[serde(rename = "PD")]
    LaLiga,
    #[serde(rename = "BL1")]
    Bundesliga,
    #[serde(rename = "SA")]
    SerieA,
    #[serde(rename = "FL1")]
    Ligue1,
    #[serde(rename = "IRL")]
    IrishPremierDivision,
}

impl League {
    pub const ALL: [League; 6] = [
        League::PremierLeague,
        League::LaLiga,
        League::Bundesliga,
        League::SerieA,
        League::Ligue1,
        League::IrishPremierDivision,
    ];

    /// Competition code used in football-data.org URLs.
    pub fn code(self) -> &'static str {
        match self {
            League::PremierLeague => "PL",
            League::LaLiga => "PD",
            League::Bundesliga => "BL1",
            League::SerieA => "SA",
            League::Ligue1 => "FL1",
            League::IrishPremierDivision => "IRL",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            League::PremierLeague => "Premier League",
            League::LaLiga => "La Liga",
            League::Bundesliga => "Bundesliga",
            League::SerieA => "Serie A",
            League::Ligue1 => "Ligue 1",
            League::IrishPremierDivision => "Irish Premier Division",
        }
    }

    /// Hashtag text without the leading `#`.
    pub fn hashtag(self) -> &'static str {
        match self {
            League::PremierLeague => "PremierLeague",
            League::LaLiga => "LaLiga",
            League::Bundesliga => "Bundesliga",
            League::SerieA => "SerieA",
            League::Ligue1 => "Ligue1",
            League::IrishPremierDivision => "IrishPremierDivision",
        }
    }
}

impl FromStr for League {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        League::ALL
            .into_iter()
            .find(|league| league.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownTopic(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Crypto,
}

impl NewsCategory {
    /// Query string sent to the headline source.
    pub fn query(self) -> &'static str {
        match self {
            NewsCategory::Crypto => "crypto",
        }
    }
}

/// Flavor of a Liverpool FC history post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTheme {
    /// "On this day" post anchored to today's date.
    OnThisDay,
    /// Nostalgic post about one subject picked from a fixed list.
    Throwback,
}

/// The content category a run posts about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topic {
    LeagueResult { league: League },
    Headlines { category: NewsCategory },
    ClubHistory { theme: HistoryTheme },
    LeagueRoundup { league: League },
}

impl Topic {
    /// Whether the topic needs a [`FactRecord`] before prompting.
    pub fn is_fact_backed(&self) -> bool {
        matches!(self, Topic::LeagueResult { .. } | Topic::Headlines { .. })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::LeagueResult { league } => write!(f, "{} result", league.display_name()),
            Topic::Headlines { category } => match category {
                NewsCategory::Crypto => write!(f, "crypto headlines"),
            },
            Topic::ClubHistory { theme } => match theme {
                HistoryTheme::OnThisDay => write!(f, "Liverpool FC on this day"),
                HistoryTheme::Throwback => write!(f, "Liverpool FC throwback"),
            },
            Topic::LeagueRoundup { league } => write!(f, "{} roundup", league.display_name()),
        }
    }
}

/// Parses the `--topic` spellings: `PL`, `roundup:PL`, `crypto`,
/// `on-this-day`, `throwback`.
impl FromStr for Topic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "crypto" => Ok(Topic::Headlines {
                category: NewsCategory::Crypto,
            }),
            "on-this-day" => Ok(Topic::ClubHistory {
                theme: HistoryTheme::OnThisDay,
            }),
            "throwback" => Ok(Topic::ClubHistory {
                theme: HistoryTheme::Throwback,
            }),
            other => match other.strip_prefix("roundup:") {
                Some(code) => code
                    .parse()
                    .map(|league| Topic::LeagueRoundup { league })
                    .map_err(|_| ConfigError::UnknownTopic(s.to_string())),
                None => other
                    .parse()
                    .map(|league| Topic::LeagueResult { league })
                    .map_err(|_| ConfigError::UnknownTopic(s.to_string())),
            },
        }
    }
}

/// A finished match with its full-time score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub date: NaiveDate,
}

/// A news article headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub description: Option<String>,
    pub source_name: String,
}

/// Supporting facts for a prompt, always obtained from an external source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactRecord {
    Match(MatchResult),
    Headline(Headline),
}

/// A post accepted by the X API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedTweet {
    pub id: String,
    pub text: String,
}

/// Summary of one run, printed to stdout as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub topic: Topic,
    pub text: String,
    pub provider: &'static str,
    pub escalated: bool,
    pub dry_run: bool,
    pub tweet_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_codes_parse_case_insensitively() {
        assert_eq!("pl".parse::<League>().unwrap(), League::PremierLeague);
        assert_eq!("BL1".parse::<League>().unwrap(), League::Bundesliga);
        assert_eq!(" irl ".parse::<League>().unwrap(), League::IrishPremierDivision);
        assert!("XYZ".parse::<League>().is_err());
    }

    #[test]
    fn test_topic_parse_spellings() {
        assert_eq!(
            "SA".parse::<Topic>().unwrap(),
            Topic::LeagueResult {
                league: League::SerieA
            }
        );
        assert_eq!(
            "roundup:PL".parse::<Topic>().unwrap(),
            Topic::LeagueRoundup {
                league: League::PremierLeague
            }
        );
        assert_eq!(
            "Crypto".parse::<Topic>().unwrap(),
            Topic::Headlines {
                category: NewsCategory::Crypto
            }
        );
        assert_eq!(
            "on-this-day".parse::<Topic>().unwrap(),
            Topic::ClubHistory {
                theme: HistoryTheme::OnThisDay
            }
        );
        assert!(matches!(
            "roundup:nope".parse::<Topic>(),
            Err(ConfigError::UnknownTopic(_))
        ));
        assert!("weather".parse::<Topic>().is_err());
    }

    #[test]
    fn test_fact_backed_topics() {
        assert!(
            Topic::LeagueResult {
                league: League::LaLiga
            }
            .is_fact_backed()
        );
        assert!(
            Topic::Headlines {
                category: NewsCategory::Crypto
            }
            .is_fact_backed()
        );
        assert!(
            !Topic::ClubHistory {
                theme: HistoryTheme::Throwback
            }
            .is_fact_backed()
        );
        assert!(
            !Topic::LeagueRoundup {
                league: League::PremierLeague
            }
            .is_fact_backed()
        );
    }

    #[test]
    fn test_topic_yaml_shape() {
        let yaml = "kind: league_result\nleague: FL1\n";
        let topic: Topic = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            topic,
            Topic::LeagueResult {
                league: League::Ligue1
            }
        );

        let json = serde_json::to_string(&Topic::ClubHistory {
            theme: HistoryTheme::OnThisDay,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"club_history","theme":"on_this_day"}"#);
    }

    #[test]
    fn test_run_report_json() {
        let report = RunReport {
            topic: Topic::LeagueResult {
                league: League::SerieA,
            },
            text: "Inter 2-0 Milan #SerieA".to_string(),
            provider: "gemini",
            escalated: false,
            dry_run: true,
            tweet_id: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["topic"]["kind"], "league_result");
        assert_eq!(value["topic"]["league"], "SA");
        assert_eq!(value["provider"], "gemini");
        assert!(value["tweet_id"].is_null());
    }

    #[test]
    fn test_topic_display() {
        assert_eq!(
            Topic::LeagueResult {
                league: League::PremierLeague
            }
            .to_string(),
            "Premier League result"
        );
        assert_eq!(
            Topic::Headlines {
                category: NewsCategory::Crypto
            }
            .to_string(),
            "crypto headlines"
        );
    }
}
