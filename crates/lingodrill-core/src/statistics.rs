//! Aggregate statistics over the result history.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grade;
use crate::model::StudyMode;
use crate::report::SessionSummary;

/// Aggregate statistics across all recorded sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Per-mode statistics.
    pub per_mode: HashMap<StudyMode, ModeStats>,
    /// Question ids answered wrong or skipped, most frequent first.
    pub most_missed: Vec<MissedItem>,
}

/// Statistics for one study mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStats {
    pub mode: StudyMode,
    pub sessions: usize,
    pub average_percentage: u32,
    pub best_percentage: u32,
    /// Grade of the average percentage.
    pub average_grade: u8,
    /// Sessions that ended because the time ran out.
    pub timed_out: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedItem {
    pub question_id: String,
    pub misses: usize,
}

/// Compute aggregate statistics from recorded summaries.
pub fn compute_aggregate_stats(entries: &[SessionSummary], missed_limit: usize) -> AggregateStats {
    let mut by_mode: HashMap<StudyMode, Vec<&SessionSummary>> = HashMap::new();
    for entry in entries {
        by_mode.entry(entry.mode).or_default().push(entry);
    }

    let per_mode = by_mode
        .into_iter()
        .map(|(mode, group)| {
            let n = group.len() as u64;
            let sum: u64 = group.iter().map(|e| u64::from(e.percentage)).sum();
            let average = ((sum * 2 + n) / (n * 2)) as u32;
            let stats = ModeStats {
                mode,
                sessions: group.len(),
                average_percentage: average,
                best_percentage: group.iter().map(|e| e.percentage).max().unwrap_or(0),
                average_grade: grade::grade(average),
                timed_out: group.iter().filter(|e| e.timed_out).count(),
            };
            (mode, stats)
        })
        .collect();

    let mut misses: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        for id in entry.wrong_ids.iter().chain(&entry.skipped_ids) {
            *misses.entry(id.as_str()).or_default() += 1;
        }
    }
    let mut most_missed: Vec<MissedItem> = misses
        .into_iter()
        .map(|(id, count)| MissedItem {
            question_id: id.to_string(),
            misses: count,
        })
        .collect();
    most_missed.sort_by(|a, b| {
        b.misses
            .cmp(&a.misses)
            .then_with(|| a.question_id.cmp(&b.question_id))
    });
    most_missed.truncate(missed_limit);

    AggregateStats {
        per_mode,
        most_missed,
    }
}
