//! Prompt construction.
//!
//! A [`PromptBuilder`] turns a [`Topic`] and optional [`FactRecord`] into a
//! [`Prompt`]: a system persona, an instruction with explicit length, hashtag
//! and tone constraints, and sampling parameters. The builder captures the
//! run's date and tick up front, so building is a pure function.

use crate::models::{FactRecord, HistoryTheme, League, NewsCategory, Topic};
use crate::policy::LengthLimits;
use chrono::NaiveDate;
use itertools::Itertools;
use std::fmt::Write;

/// Subjects for [`HistoryTheme::Throwback`] posts, indexed by tick.
const THROWBACK_SUBJECTS: [&str; 10] = [
    "legendary players like Steven Gerrard, Kenny Dalglish, or Ian Rush",
    "historic European Cup victories in the 1970s and 1980s",
    "memorable Premier League moments and title wins",
    "Anfield atmosphere and famous stadium moments",
    "classic derby matches against Everton or Manchester United",
    "the Bill Shankly and Bob Paisley management eras",
    "the Champions League victories in 2005 and 2019",
    "FA Cup finals and memorable cup runs",
    "record-breaking performances and club milestones",
    "famous Liverpool chants and supporter culture",
];

/// Everything a provider needs for one generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Persona and tone guidance, sent as the system message.
    pub system: String,
    /// The instruction itself.
    pub text: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_len: usize,
    /// Minimum characters demanded, only for fact-backed topics.
    pub min_len: Option<usize>,
    pub escalated: bool,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    limits: LengthLimits,
    history_override: Option<String>,
    today: NaiveDate,
    tick: u64,
}

impl PromptBuilder {
    pub fn new(limits: LengthLimits, today: NaiveDate, tick: u64) -> Self {
        Self {
            limits,
            history_override: None,
            today,
            tick,
        }
    }

    /// Replace the subject paragraph of club-history prompts.
    pub fn with_history_override(mut self, text: Option<String>) -> Self {
        self.history_override = text.filter(|t| !t.trim().is_empty());
        self
    }

    /// Minimum length enforced for `topic`, if any.
    pub fn min_len_for(&self, topic: &Topic) -> Option<usize> {
        topic.is_fact_backed().then_some(self.limits.min_len)
    }

    pub fn build(&self, topic: &Topic, fact: Option<&FactRecord>, escalation: bool) -> Prompt {
        let min_len = self.min_len_for(topic);
        let mut text = self.subject(topic, escalation);

        if let Some(fact) = fact {
            text.push_str("\n\n");
            text.push_str(&fact_lines(fact));
        }

        text.push_str("\n\n");
        text.push_str(&self.requirements(topic, min_len, escalation));

        let (temperature, max_output_tokens) = match topic {
            Topic::LeagueResult { .. } => (0.8, 200),
            Topic::Headlines { .. } => (0.7, 200),
            Topic::ClubHistory { .. } => (0.8, 150),
            Topic::LeagueRoundup { .. } => (0.7, 150),
        };

        Prompt {
            system: persona(topic).to_string(),
            text,
            temperature,
            max_output_tokens,
            max_len: self.limits.max_len,
            min_len,
            escalated: escalation,
        }
    }

    fn subject(&self, topic: &Topic, escalation: bool) -> String {
        match topic {
            Topic::LeagueResult { league } => {
                if escalation {
                    format!(
                        "Write a complete, detailed post about the latest {} football result. \
                         Be detailed and informative: mention key facts, context, and impact.",
                        league.display_name()
                    )
                } else {
                    format!(
                        "Write a complete, engaging post about the latest {} football result. \
                         Make it informative, mentioning key moments or context if possible.",
                        league.display_name()
                    )
                }
            }
            Topic::Headlines { category } => match category {
                NewsCategory::Crypto => {
                    if escalation {
                        "Write a detailed, informative post about this crypto news headline. \
                         Explain what happened and why it matters to the market."
                            .to_string()
                    } else {
                        "Write an engaging, informative post about this crypto news headline and summary."
                            .to_string()
                    }
                }
            },
            Topic::ClubHistory { theme } => {
                if let Some(custom) = &self.history_override {
                    return custom.trim().to_string();
                }
                let date = self.today.format("%B %-d");
                match theme {
                    HistoryTheme::OnThisDay => format!(
                        "Write an engaging \"on this day\" style post about Liverpool FC history for {date}. \
                         Pick one: a match, signing or achievement on this date, a legendary player, \
                         a historic victory, a club record, a memorable quote, an Anfield moment, \
                         European, league or FA Cup glory, or a derby against Everton or Manchester United. \
                         Make it feel timely for today's date if possible."
                    ),
                    HistoryTheme::Throwback => {
                        let subject =
                            THROWBACK_SUBJECTS[(self.tick % THROWBACK_SUBJECTS.len() as u64) as usize];
                        format!(
                            "Write a nostalgic, celebratory post about Liverpool FC focusing on {subject}."
                        )
                    }
                }
            }
            Topic::LeagueRoundup { league } => format!(
                "Write a concise, engaging post with the latest {} news as of {}. \
                 Focus on recent matches, transfers, injuries, standings, or major headlines, \
                 and mention specific teams, players, or results if possible.",
                league.display_name(),
                self.today.format("%B %-d, %Y")
            ),
        }
    }

    fn requirements(&self, topic: &Topic, min_len: Option<usize>, escalation: bool) -> String {
        let mut out = String::from("Requirements:\n");
        if let Some(min) = min_len {
            if escalation {
                let _ = writeln!(
                    out,
                    "- It MUST be at least {min} characters long. Short or generic posts will be rejected."
                );
            } else {
                let _ = writeln!(out, "- At least {min} characters long.");
            }
        }
        let _ = writeln!(out, "- Under {} characters.", self.limits.max_len);
        let _ = writeln!(out, "- Include hashtags like {}.", hashtag_line(topic));
        let _ = writeln!(out, "- Tone: {}.", tone(topic));
        if escalation {
            let _ = writeln!(out, "- Avoid generic statements; be specific.");
        }
        out.push_str("- Output only the post text, with no surrounding quotes, markdown, or commentary.");
        out
    }
}

fn fact_lines(fact: &FactRecord) -> String {
    match fact {
        FactRecord::Match(m) => format!(
            "Match: {} {} - {} {}\nDate: {}",
            m.home_team,
            m.home_score,
            m.away_score,
            m.away_team,
            m.date.format("%Y-%m-%d")
        ),
        FactRecord::Headline(h) => {
            let mut lines = format!("Title: {}", h.title);
            if let Some(description) = h.description.as_deref().filter(|d| !d.trim().is_empty()) {
                let _ = write!(lines, "\nDescription: {description}");
            }
            let _ = write!(lines, "\nSource: {}", h.source_name);
            lines
        }
    }
}

fn hashtags(topic: &Topic) -> Vec<&'static str> {
    match topic {
        Topic::LeagueResult { league } => vec![league.hashtag(), "Football", "FootballNews"],
        Topic::LeagueRoundup { league } => match league {
            League::PremierLeague => vec!["PremierLeague", "EPL", "Football"],
            other => vec![other.hashtag(), "Football"],
        },
        Topic::Headlines { category } => match category {
            NewsCategory::Crypto => vec!["Crypto", "Blockchain", "CryptoNews"],
        },
        Topic::ClubHistory { theme } => match theme {
            HistoryTheme::OnThisDay => vec!["LFC", "Liverpool", "OnThisDay", "YNWA"],
            HistoryTheme::Throwback => vec!["LFC", "Liverpool", "YNWA", "History"],
        },
    }
}

fn hashtag_line(topic: &Topic) -> String {
    hashtags(topic).iter().map(|tag| format!("#{tag}")).join(" ")
}

fn tone(topic: &Topic) -> &'static str {
    match topic {
        Topic::LeagueResult { .. } | Topic::LeagueRoundup { .. } => {
            "engaging for football fans, with emojis where appropriate"
        }
        Topic::Headlines { .. } => "informative and engaging, with emojis where appropriate",
        Topic::ClubHistory { .. } => {
            "authentic and factual, like a passionate fan sharing a great memory"
        }
    }
}

fn persona(topic: &Topic) -> &'static str {
    match topic {
        Topic::LeagueResult { .. } | Topic::LeagueRoundup { .. } => {
            "You are an expert football writer for X (Twitter). Write engaging, informative posts."
        }
        Topic::Headlines { .. } => {
            "You are an expert crypto writer for X (Twitter). Write engaging, informative posts."
        }
        Topic::ClubHistory { .. } => {
            "You are a passionate Liverpool FC supporter and club historian writing for X (Twitter)."
        }
    }
}
