//! Session results with JSON persistence and a running history.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::grade::{self, FeedbackTier};
use crate::model::{Direction, StudyMode};
use crate::persistence::{load_blob, save_blob, storage_key};
use crate::session::Session;
use crate::traits::KeyValueStore;

/// The outcome of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: StudyMode,
    pub direction: Direction,
    pub score: u32,
    /// Every question in the session, answered or not.
    pub total: u32,
    /// Questions that received a verdict.
    pub answered: u32,
    pub percentage: u32,
    pub grade: u8,
    pub tier: FeedbackTier,
    pub correct_ids: BTreeSet<String>,
    pub wrong_ids: BTreeSet<String>,
    pub skipped_ids: BTreeSet<String>,
    pub timed_out: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        let total = u32::try_from(session.len()).unwrap_or(u32::MAX);
        let percentage = grade::percentage(session.score(), total);
        Self {
            session_id: session.id(),
            mode: session.mode(),
            direction: session.direction(),
            score: session.score(),
            total,
            answered: u32::try_from(session.answered_count()).unwrap_or(u32::MAX),
            percentage,
            grade: grade::grade(percentage),
            tier: FeedbackTier::from_percentage(percentage),
            correct_ids: session.correct_ids().clone(),
            wrong_ids: session.wrong_ids().clone(),
            skipped_ids: session.skipped_ids().clone(),
            timed_out: session.timed_out(),
            started_at: session.created_at(),
            finished_at: session.updated_at(),
        }
    }

    /// Questions the time ran out on.
    pub fn unanswered(&self) -> u32 {
        self.total.saturating_sub(self.answered)
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }

    /// Format the summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!(
            "**{}**: {}/{} correct ({}%), grade {}\n\n",
            self.mode, self.score, self.total, self.percentage, self.grade
        ));
        md.push_str(&format!("{}\n", self.tier.message()));
        if self.timed_out {
            md.push_str(&format!(
                "\nTime ran out with {} question(s) unanswered.\n",
                self.unanswered()
            ));
        }
        if !self.wrong_ids.is_empty() {
            md.push_str("\n### Review\n\n");
            for id in &self.wrong_ids {
                md.push_str(&format!("- {id}\n"));
            }
        }
        md
    }
}

/// Finished sessions kept in the key-value store.
#[derive(Clone)]
pub struct ResultHistory {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ResultHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: &str) -> Self {
        Self {
            store,
            key: storage_key(prefix, "test_results"),
        }
    }

    pub fn entries(&self) -> Result<Vec<SessionSummary>, StoreError> {
        Ok(load_blob(self.store.as_ref(), &self.key)?.unwrap_or_default())
    }

    pub fn record(&self, summary: SessionSummary) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        entries.push(summary);
        save_blob(self.store.as_ref(), &self.key, &entries)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries()?.len())
    }

    /// Mean percentage over all entries, rounded; 0 with no entries.
    pub fn average_percentage(&self) -> Result<u32, StoreError> {
        let entries = self.entries()?;
        if entries.is_empty() {
            return Ok(0);
        }
        let sum: u64 = entries.iter().map(|e| u64::from(e.percentage)).sum();
        let n = entries.len() as u64;
        Ok(((sum * 2 + n) / (n * 2)) as u32)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }
}
