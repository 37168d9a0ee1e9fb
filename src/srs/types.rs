use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-item mastery tier. Serialized as its numeric value (0/1/2) so the
/// API matches what the study clients already store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MasteryLevel {
    Unlearned,
    Learning,
    Known,
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> u8 {
        match level {
            MasteryLevel::Unlearned => 0,
            MasteryLevel::Learning => 1,
            MasteryLevel::Known => 2,
        }
    }
}

impl TryFrom<u8> for MasteryLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MasteryLevel::Unlearned),
            1 => Ok(MasteryLevel::Learning),
            2 => Ok(MasteryLevel::Known),
            other => Err(format!("invalid mastery level: {other}")),
        }
    }
}

/// Which grouping/ordering strategy drives recommendations and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    #[default]
    Stat,
    Jlpt,
}

/// The core mutable entity: one row per (user, kanji).
///
/// `test_streak` stays in [-3, 7]; only the transition functions in
/// `srs::mastery` (and the explicit study-page upsert) may change a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub user_id: String,
    pub kanji_id: String,
    pub mastery_level: MasteryLevel,
    pub test_streak: i32,
    pub last_tested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionFormat {
    WriteIn,
    MultipleChoice,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestion {
    pub kanji_id: String,
    pub character: String,
    pub mastery_level: MasteryLevel,
    pub format: QuestionFormat,
    /// Shuffled options for multiple-choice questions; empty for write-in.
    pub choices: Vec<String>,
    pub correct_answer: String,
    /// Same-group characters the user already knows; at most two, and only
    /// attached to learning-level questions.
    pub hints: Vec<String>,
}

/// Outcome of review-batch selection. A too-small pool is a first-class
/// result, not an error: callers render a "come back later" state.
#[derive(Debug, Clone)]
pub enum ReviewBatch {
    Ready(Vec<TestQuestion>),
    Insufficient { available: usize },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabQuestion {
    pub kanji_id: String,
    pub word_prompt: String,
    pub blanked_word: String,
    pub correct_answer: String,
    pub meaning: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryCandidate {
    pub kanji_id: String,
    pub character: String,
    pub reading: String,
    pub jlpt_level: Option<u8>,
    /// Same-group characters already at Known level for this user.
    pub known_peers: Vec<String>,
    pub usefulness_score: f64,
}

#[derive(Debug, Clone)]
pub enum DiscoveryOutcome {
    Ready(Vec<DiscoveryCandidate>),
    Empty { track: Track, level: u8 },
}

/// Per-group per-user counts, scoped by the active track.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub reading: String,
    pub usefulness_score: f64,
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
}

impl GroupStats {
    pub fn unlearned(&self) -> usize {
        self.total.saturating_sub(self.mastered + self.learning)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupScore {
    pub reading: String,
    pub usefulness_score: f64,
    pub priority_score: f64,
    pub completion_pct: f64,
}

/// Whole-collection progress counts for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub mastered: usize,
    pub learning: usize,
    pub unlearned: usize,
    pub total: usize,
}

/// Per-jlpt-level per-user counts used by the level computation.
#[derive(Debug, Clone)]
pub struct LevelStats {
    pub level: u8,
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
}
