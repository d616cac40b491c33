//! Topic rotation: which category a run posts about.
//!
//! A [`Rotation`] is a declarative, non-empty table of topics indexed by a
//! tick. Production passes the current Unix time in seconds; tests pass any
//! integer, so selection never depends on the wall clock.

use crate::error::ConfigError;
use crate::models::{League, NewsCategory, Topic};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument};

/// On-disk shape of a rotation file.
#[derive(Debug, Deserialize)]
struct RotationFile {
    topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    topics: Vec<Topic>,
}

impl Rotation {
    /// Build a rotation, rejecting an empty table.
    pub fn new(topics: Vec<Topic>) -> Result<Self, ConfigError> {
        if topics.is_empty() {
            return Err(ConfigError::EmptyRotation);
        }
        Ok(Self { topics })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: RotationFile = serde_yaml::from_str(yaml)?;
        Self::new(file.topics)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::RotationRead {
            path: path.display().to_string(),
            source,
        })?;
        let rotation = Self::from_yaml_str(&yaml)?;
        info!(count = rotation.len(), "Loaded topic rotation");
        Ok(rotation)
    }

    /// Pick the topic for `tick`.
    pub fn select(&self, tick: u64) -> Topic {
        let index = (tick % self.topics.len() as u64) as usize;
        let topic = self.topics[index];
        debug!(tick, index, %topic, "Selected topic");
        topic
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

/// Six league results followed by crypto headlines.
impl Default for Rotation {
    fn default() -> Self {
        let topics = League::ALL
            .into_iter()
            .map(|league| Topic::LeagueResult { league })
            .chain(std::iter::once(Topic::Headlines {
                category: NewsCategory::Crypto,
            }))
            .collect();
        Self { topics }
    }
}

/// Current Unix time in seconds, the production tick.
pub fn tick_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryTheme;

    #[test]
    fn test_default_rotation_cycle() {
        let rotation = Rotation::default();
        assert_eq!(rotation.len(), 7);
        assert_eq!(
            rotation.select(0),
            Topic::LeagueResult {
                league: League::PremierLeague
            }
        );
        assert_eq!(
            rotation.select(5),
            Topic::LeagueResult {
                league: League::IrishPremierDivision
            }
        );
        assert_eq!(
            rotation.select(6),
            Topic::Headlines {
                category: NewsCategory::Crypto
            }
        );
        assert_eq!(rotation.select(7), rotation.select(0));
    }

    #[test]
    fn test_select_is_deterministic_for_large_ticks() {
        let rotation = Rotation::default();
        let tick = 1_760_870_000u64;
        assert_eq!(rotation.select(tick), rotation.select(tick));
        assert_eq!(rotation.select(tick), rotation.select(tick + 7));
    }

    #[test]
    fn test_empty_rotation_rejected() {
        assert!(matches!(Rotation::new(vec![]), Err(ConfigError::EmptyRotation)));
        assert!(matches!(
            Rotation::from_yaml_str("topics: []\n"),
            Err(ConfigError::EmptyRotation)
        ));
    }

    #[test]
    fn test_rotation_from_yaml() {
        let yaml = r#"
topics:
  - kind: club_history
    theme: on_this_day
  - kind: league_roundup
    league: PL
  - kind: headlines
    category: crypto
"#;
        let rotation = Rotation::from_yaml_str(yaml).unwrap();
        assert_eq!(rotation.len(), 3);
        assert_eq!(
            rotation.select(0),
            Topic::ClubHistory {
                theme: HistoryTheme::OnThisDay
            }
        );
        assert_eq!(
            rotation.select(4),
            Topic::LeagueRoundup {
                league: League::PremierLeague
            }
        );
    }

    #[test]
    fn test_rotation_yaml_rejects_unknown_kind() {
        let yaml = "topics:\n  - kind: weather\n";
        assert!(matches!(
            Rotation::from_yaml_str(yaml),
            Err(ConfigError::RotationParse(_))
        ));
    }

    #[test]
    fn test_missing_rotation_file() {
        let err = Rotation::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::RotationRead { .. }));
    }
}
