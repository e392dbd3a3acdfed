//! Percentage, 1–10 grade, and feedback tier for a finished session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `round(score / total * 100)`, rounding halves up. An empty session is 0%.
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score);
    let total = u64::from(total);
    ((score * 200 + total) / (total * 2)) as u32
}

/// Map a percentage to the 1–10 grade scale.
///
/// Only a perfect score earns a 10; every other band is ten points wide.
pub fn grade(percentage: u32) -> u8 {
    match percentage {
        p if p >= 100 => 10,
        90..=99 => 9,
        80..=89 => 8,
        70..=79 => 7,
        60..=69 => 6,
        50..=59 => 5,
        40..=49 => 4,
        30..=39 => 3,
        20..=29 => 2,
        _ => 1,
    }
}

/// Qualitative result band shown next to the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl FeedbackTier {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            p if p >= 90 => FeedbackTier::Excellent,
            p if p >= 70 => FeedbackTier::Good,
            p if p >= 50 => FeedbackTier::Fair,
            _ => FeedbackTier::NeedsImprovement,
        }
    }

    /// A short encouragement for the results screen.
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent! You know these by heart.",
            FeedbackTier::Good => "Well done! You know most of them.",
            FeedbackTier::Fair => "Not bad. Keep practising.",
            FeedbackTier::NeedsImprovement => "Room for improvement. Keep practising!",
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackTier::Excellent => write!(f, "excellent"),
            FeedbackTier::Good => write!(f, "good"),
            FeedbackTier::Fair => write!(f, "fair"),
            FeedbackTier::NeedsImprovement => write!(f, "needs improvement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries() {
        assert_eq!(grade(100), 10);
        assert_eq!(grade(99), 9);
        assert_eq!(grade(90), 9);
        assert_eq!(grade(89), 8);
        assert_eq!(grade(50), 5);
        assert_eq!(grade(20), 2);
        assert_eq!(grade(19), 1);
        assert_eq!(grade(0), 1);
    }

    #[test]
    fn grade_is_monotonic() {
        let grades: Vec<u8> = (0..=100).map(grade).collect();
        assert!(grades.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 200), 1); // 0.5
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn empty_session_is_zero_percent() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(grade(percentage(0, 0)), 1);
    }

    #[test]
    fn feedback_tiers() {
        assert_eq!(FeedbackTier::from_percentage(90), FeedbackTier::Excellent);
        assert_eq!(FeedbackTier::from_percentage(89), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_percentage(70), FeedbackTier::Good);
        assert_eq!(FeedbackTier::from_percentage(50), FeedbackTier::Fair);
        assert_eq!(
            FeedbackTier::from_percentage(49),
            FeedbackTier::NeedsImprovement
        );
    }
}
