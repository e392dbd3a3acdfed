//! The session scorer.
//!
//! A [`Session`] walks a fixed list of questions from `NotStarted` through
//! `InProgress` to `Completed`. Each question gets exactly one verdict
//! (correct, incorrect or skipped) and the logical state moves on at once.
//! The feedback for that verdict stays pending until [`Session::settle`] is
//! called; while it is pending the session is paused and refuses further
//! answers, which turns a double submission into a no-op.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LearningSettings;
use crate::error::InvalidSession;
use crate::grade;
use crate::model::{Direction, Question, StudyMode};
use crate::normalize::{self, LeniencyFlags};

/// The configuration a session was created with. Never re-read mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub leniency: LeniencyFlags,
    pub skip_enabled: bool,
    pub timer_enabled: bool,
    pub remember_progress: bool,
    pub randomize_order: bool,
}

impl From<&LearningSettings> for SessionSettings {
    fn from(learning: &LearningSettings) -> Self {
        Self {
            leniency: learning.leniency(),
            skip_enabled: learning.skip_question_enabled,
            timer_enabled: learning.timer_enabled,
            remember_progress: learning.remember_progress,
            randomize_order: learning.randomize_word_order,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&LearningSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerFormat {
    /// Pick one of the options; graded by exact string equality.
    Choice,
    /// Type the answer; graded by the answer normalizer.
    FreeText,
}

/// A question as fixed at session start, options included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub question: Question,
    pub format: AnswerFormat,
    /// Choice options, or the unscored practice options of a learn session.
    #[serde(default)]
    pub options: Vec<String>,
}

impl SessionQuestion {
    pub fn choice(question: Question, options: Vec<String>) -> Self {
        Self {
            question,
            format: AnswerFormat::Choice,
            options,
        }
    }

    pub fn free_text(question: Question) -> Self {
        Self {
            question,
            format: AnswerFormat::FreeText,
            options: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.question.id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Correct,
    Incorrect,
    Skipped,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "correct"),
            Verdict::Incorrect => write!(f, "incorrect"),
            Verdict::Skipped => write!(f, "skipped"),
        }
    }
}

/// What the learner is shown after a question was answered or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Position of the question in the session.
    pub index: usize,
    pub question_id: String,
    pub verdict: Verdict,
    pub expected: String,
    /// What the learner submitted; `None` for a skip.
    pub given: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Why an answer, skip or tick did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    NotStarted,
    Completed,
    AlreadyAnswered,
    SkipDisabled,
    /// The current position points past the question list.
    NoQuestion,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotStarted => write!(f, "session has not started"),
            RejectReason::Completed => write!(f, "session is already completed"),
            RejectReason::AlreadyAnswered => write!(f, "question was already answered"),
            RejectReason::SkipDisabled => write!(f, "skipping is disabled"),
            RejectReason::NoQuestion => write!(f, "there is no question to answer"),
        }
    }
}

/// Result of [`Session::record_answer`] or [`Session::skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerOutcome {
    Accepted { feedback: Feedback, completed: bool },
    Rejected(RejectReason),
}

impl AnswerOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AnswerOutcome::Accepted { .. })
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            AnswerOutcome::Accepted { feedback, .. } => Some(feedback.verdict),
            AnswerOutcome::Rejected(_) => None,
        }
    }
}

/// Result of [`Session::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not in progress.
    Ignored,
    /// One second was counted and the session goes on.
    Counted { remaining: Option<u32> },
    /// The tick completed the session.
    Completed { timed_out: bool },
}

/// One bounded run of question answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    mode: StudyMode,
    direction: Direction,
    questions: Vec<SessionQuestion>,
    current_index: usize,
    score: u32,
    correct_ids: BTreeSet<String>,
    wrong_ids: BTreeSet<String>,
    skipped_ids: BTreeSet<String>,
    user_answers: BTreeMap<String, String>,
    /// `None` for an untimed session.
    remaining_time_secs: Option<u32>,
    state: SessionState,
    timed_out: bool,
    pending: Option<Feedback>,
    settings: SessionSettings,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        mode: StudyMode,
        direction: Direction,
        questions: Vec<SessionQuestion>,
        settings: SessionSettings,
        time_limit_secs: Option<u32>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            mode,
            direction,
            questions,
            current_index: 0,
            score: 0,
            correct_ids: BTreeSet::new(),
            wrong_ids: BTreeSet::new(),
            skipped_ids: BTreeSet::new(),
            user_answers: BTreeMap::new(),
            remaining_time_secs: time_limit_secs,
            state: SessionState::NotStarted,
            timed_out: false,
            pending: None,
            settings,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn questions(&self) -> &[SessionQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn correct_ids(&self) -> &BTreeSet<String> {
        &self.correct_ids
    }

    pub fn wrong_ids(&self) -> &BTreeSet<String> {
        &self.wrong_ids
    }

    pub fn skipped_ids(&self) -> &BTreeSet<String> {
        &self.skipped_ids
    }

    pub fn user_answers(&self) -> &BTreeMap<String, String> {
        &self.user_answers
    }

    pub fn remaining_time_secs(&self) -> Option<u32> {
        self.remaining_time_secs
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Completed because the countdown reached zero.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Feedback is on screen; the countdown should not run.
    pub fn is_paused(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_feedback(&self) -> Option<&Feedback> {
        self.pending.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Questions that received a verdict.
    pub fn answered_count(&self) -> usize {
        self.correct_ids.len() + self.wrong_ids.len() + self.skipped_ids.len()
    }

    /// The next question waiting for a verdict.
    pub fn current(&self) -> Option<&SessionQuestion> {
        if self.state != SessionState::InProgress {
            return None;
        }
        self.questions.get(self.current_index)
    }

    /// The question on screen: the one whose feedback is pending, else the current one.
    pub fn presented(&self) -> Option<&SessionQuestion> {
        match &self.pending {
            Some(feedback) => self.questions.get(feedback.index),
            None => self.current(),
        }
    }

    /// Score as a percentage of all questions in the session.
    pub fn percentage(&self) -> u32 {
        grade::percentage(self.score, self.questions.len() as u32)
    }

    pub fn grade(&self) -> u8 {
        grade::grade(self.percentage())
    }

    /// Move from `NotStarted` to `InProgress`, or straight to `Completed`
    /// when there are no questions. Returns `false` if already started.
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::NotStarted {
            return false;
        }
        self.state = SessionState::InProgress;
        tracing::debug!(
            "session {} started: {} questions, mode {}",
            self.id,
            self.questions.len(),
            self.mode
        );
        if self.questions.is_empty() {
            self.complete(false);
        }
        self.touch();
        true
    }

    /// Grade `answer` against the current question and move on.
    pub fn record_answer(&mut self, answer: &str) -> AnswerOutcome {
        if let Some(reason) = self.guard() {
            tracing::debug!("answer rejected: {reason}");
            return AnswerOutcome::Rejected(reason);
        }

        let index = self.current_index;
        let Some(entry) = self.questions.get(index) else {
            tracing::debug!("answer rejected: {}", RejectReason::NoQuestion);
            return AnswerOutcome::Rejected(RejectReason::NoQuestion);
        };
        let expected = entry.question.expected_answer(self.direction).to_string();
        let correct = match entry.format {
            AnswerFormat::Choice => answer == expected,
            AnswerFormat::FreeText => normalize::is_match(answer, &expected, self.settings.leniency),
        };
        let verdict = if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };

        let feedback = Feedback {
            index,
            question_id: entry.id().to_string(),
            verdict,
            expected,
            given: Some(answer.to_string()),
            explanation: entry.question.explanation().map(str::to_string),
        };
        self.user_answers
            .insert(feedback.question_id.clone(), answer.to_string());
        self.advance(feedback)
    }

    /// Give up on the current question. Counts as not correct.
    pub fn skip(&mut self) -> AnswerOutcome {
        if let Some(reason) = self.guard() {
            tracing::debug!("skip rejected: {reason}");
            return AnswerOutcome::Rejected(reason);
        }
        if !self.settings.skip_enabled {
            tracing::debug!("skip rejected: {}", RejectReason::SkipDisabled);
            return AnswerOutcome::Rejected(RejectReason::SkipDisabled);
        }

        let index = self.current_index;
        let Some(entry) = self.questions.get(index) else {
            tracing::debug!("skip rejected: {}", RejectReason::NoQuestion);
            return AnswerOutcome::Rejected(RejectReason::NoQuestion);
        };
        let feedback = Feedback {
            index,
            question_id: entry.id().to_string(),
            verdict: Verdict::Skipped,
            expected: entry.question.expected_answer(self.direction).to_string(),
            given: None,
            explanation: entry.question.explanation().map(str::to_string),
        };
        self.advance(feedback)
    }

    /// Dismiss the pending feedback so the next question can be answered.
    pub fn settle(&mut self) -> Option<Feedback> {
        let feedback = self.pending.take();
        if feedback.is_some() {
            self.touch();
        }
        feedback
    }

    /// Count one elapsed second.
    ///
    /// Reaching zero completes the session no matter how many questions are
    /// left. Unanswered questions then get no verdict at all, but still count
    /// towards the total the percentage is computed against.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SessionState::InProgress {
            return TickOutcome::Ignored;
        }

        if let Some(remaining) = self.remaining_time_secs.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.touch();

        let expired = self.remaining_time_secs == Some(0);
        if expired || self.current_index >= self.questions.len() {
            self.complete(expired);
            return TickOutcome::Completed { timed_out: expired };
        }
        TickOutcome::Counted {
            remaining: self.remaining_time_secs,
        }
    }

    /// Check the bookkeeping of a session that came from outside, such as a
    /// stored checkpoint.
    pub fn validate(&self) -> Result<(), InvalidSession> {
        let len = self.questions.len();
        let mut ids = BTreeSet::new();
        if !self.questions.iter().all(|q| ids.insert(q.id())) {
            return Err(InvalidSession::new("question ids are not unique"));
        }
        if self.current_index > len {
            return Err(InvalidSession::new(format!(
                "position {} is past {len} questions",
                self.current_index
            )));
        }
        if self.state == SessionState::NotStarted && self.current_index != 0 {
            return Err(InvalidSession::new("not started but already answered"));
        }
        if self.state == SessionState::InProgress
            && self.pending.is_none()
            && self.current_index >= len
        {
            return Err(InvalidSession::new("in progress with no question left"));
        }
        if let Some(feedback) = &self.pending {
            if feedback.index >= len || feedback.index >= self.current_index {
                return Err(InvalidSession::new("pending feedback for an unanswered question"));
            }
        }
        let disjoint = self.correct_ids.is_disjoint(&self.wrong_ids)
            && self.correct_ids.is_disjoint(&self.skipped_ids)
            && self.wrong_ids.is_disjoint(&self.skipped_ids);
        if !disjoint {
            return Err(InvalidSession::new("a question has more than one verdict"));
        }
        let unknown = self
            .correct_ids
            .iter()
            .chain(&self.wrong_ids)
            .chain(&self.skipped_ids)
            .any(|id| !ids.contains(id.as_str()));
        if unknown {
            return Err(InvalidSession::new("a verdict names an unknown question"));
        }
        if self.answered_count() != self.current_index {
            return Err(InvalidSession::new(format!(
                "{} verdicts for position {}",
                self.answered_count(),
                self.current_index
            )));
        }
        if self.score as usize != self.correct_ids.len() {
            return Err(InvalidSession::new(format!(
                "score {} with {} correct answers",
                self.score,
                self.correct_ids.len()
            )));
        }
        Ok(())
    }

    /// Check a practice option against the current question without scoring it.
    pub fn practice(&self, option: &str) -> bool {
        self.current()
            .map(|q| q.question.expected_answer(self.direction) == option)
            .unwrap_or(false)
    }

    fn guard(&self) -> Option<RejectReason> {
        match self.state {
            SessionState::NotStarted => Some(RejectReason::NotStarted),
            SessionState::Completed => Some(RejectReason::Completed),
            SessionState::InProgress if self.pending.is_some() => {
                Some(RejectReason::AlreadyAnswered)
            }
            SessionState::InProgress => None,
        }
    }

    fn advance(&mut self, feedback: Feedback) -> AnswerOutcome {
        let id = feedback.question_id.clone();
        match feedback.verdict {
            Verdict::Correct => {
                self.score += 1;
                self.correct_ids.insert(id);
            }
            Verdict::Incorrect => {
                self.wrong_ids.insert(id);
            }
            Verdict::Skipped => {
                self.skipped_ids.insert(id);
            }
        }
        self.current_index += 1;
        tracing::debug!(
            "question {} of {} {}",
            self.current_index,
            self.questions.len(),
            feedback.verdict
        );

        self.pending = Some(feedback.clone());
        if self.current_index >= self.questions.len() {
            self.complete(false);
        }
        self.touch();

        AnswerOutcome::Accepted {
            feedback,
            completed: self.is_completed(),
        }
    }

    fn complete(&mut self, timed_out: bool) {
        if self.state == SessionState::Completed {
            return;
        }
        self.state = SessionState::Completed;
        self.timed_out = timed_out;
        tracing::info!(
            "session {} completed: {}/{} correct{}",
            self.id,
            self.score,
            self.questions.len(),
            if timed_out { " (time is up)" } else { "" }
        );
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
