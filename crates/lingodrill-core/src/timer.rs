//! Countdown limits for timed tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::StudyMode;

/// The kinds of timed test, each with its own per-question allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    VocabularyChoice,
    VocabularyWrite,
    Grammar,
}

impl TestKind {
    pub fn seconds_per_question(self) -> u32 {
        match self {
            TestKind::VocabularyChoice => 20,
            TestKind::VocabularyWrite => 30,
            TestKind::Grammar => 45,
        }
    }

    pub fn mode(self) -> StudyMode {
        match self {
            TestKind::VocabularyChoice => StudyMode::MultipleChoice,
            TestKind::VocabularyWrite => StudyMode::Write,
            TestKind::Grammar => StudyMode::Grammar,
        }
    }

    /// Countdown start for a test of `question_count` questions.
    pub fn time_limit(self, question_count: usize) -> u32 {
        let count = u32::try_from(question_count).unwrap_or(u32::MAX);
        count.saturating_mul(self.seconds_per_question())
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::VocabularyChoice => write!(f, "vocabulary-choice"),
            TestKind::VocabularyWrite => write!(f, "vocabulary-write"),
            TestKind::Grammar => write!(f, "grammar"),
        }
    }
}

impl FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vocabulary-choice" | "vocabulary" | "choice" => Ok(TestKind::VocabularyChoice),
            "vocabulary-write" | "write" => Ok(TestKind::VocabularyWrite),
            "grammar" => Ok(TestKind::Grammar),
            other => Err(format!("unknown test kind: {other}")),
        }
    }
}

/// Render seconds as `m:ss`.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
