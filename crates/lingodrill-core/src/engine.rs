//! Session engine.
//!
//! Runs one [`Session`] inside a tokio task. Answers, skips and timer ticks
//! all go through the task's command queue, so they are applied one at a
//! time and whichever arrives first wins. The task also settles feedback
//! after a delay and checkpoints the session after every change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::FeedbackConfig;
use crate::error::EngineError;
use crate::persistence::SessionStore;
use crate::session::{
    AnswerFormat, AnswerOutcome, Feedback, Session, SessionState, TickOutcome, Verdict,
};

/// How long feedback stays on screen before the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackDelays {
    pub choice: Duration,
    pub free_text: Duration,
    pub skip: Duration,
}

impl Default for FeedbackDelays {
    fn default() -> Self {
        Self {
            choice: Duration::from_millis(1500),
            free_text: Duration::from_millis(2000),
            skip: Duration::from_millis(500),
        }
    }
}

impl From<&FeedbackConfig> for FeedbackDelays {
    fn from(config: &FeedbackConfig) -> Self {
        Self {
            choice: Duration::from_millis(config.choice_ms),
            free_text: Duration::from_millis(config.free_text_ms),
            skip: Duration::from_millis(config.skip_ms),
        }
    }
}

/// Configuration for the session engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub delays: FeedbackDelays,
    /// Countdown resolution. One tick takes one second off the clock.
    pub tick_interval: Duration,
    /// Capacity of the command queue.
    pub command_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delays: FeedbackDelays::default(),
            tick_interval: Duration::from_secs(1),
            command_buffer: 16,
        }
    }
}

/// Session events for a presentation layer.
pub trait SessionObserver: Send + Sync {
    fn on_feedback(&self, feedback: &Feedback);
    /// Feedback was dismissed; `session.presented()` is the next question.
    fn on_next(&self, session: &Session);
    fn on_tick(&self, remaining_secs: u32);
    fn on_complete(&self, session: &Session);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_feedback(&self, _: &Feedback) {}
    fn on_next(&self, _: &Session) {}
    fn on_tick(&self, _: u32) {}
    fn on_complete(&self, _: &Session) {}
}

/// A cheap copy of the parts of a session a UI polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub current_index: usize,
    pub total: usize,
    pub score: u32,
    pub remaining_time_secs: Option<u32>,
    pub paused: bool,
    pub timed_out: bool,
}

impl From<&Session> for SessionStatus {
    fn from(session: &Session) -> Self {
        Self {
            state: session.state(),
            current_index: session.current_index(),
            total: session.len(),
            score: session.score(),
            remaining_time_secs: session.remaining_time_secs(),
            paused: session.is_paused(),
            timed_out: session.timed_out(),
        }
    }
}

enum Command {
    Answer {
        text: String,
        reply: oneshot::Sender<AnswerOutcome>,
    },
    Skip {
        reply: oneshot::Sender<AnswerOutcome>,
    },
    Settle {
        reply: oneshot::Sender<Option<Feedback>>,
    },
    Practice {
        option: String,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<Session>,
    },
    Stop,
}

/// Spawns session tasks.
pub struct SessionEngine {
    config: EngineConfig,
    observer: Arc<dyn SessionObserver>,
    store: Option<SessionStore>,
}

impl SessionEngine {
    pub fn new(config: EngineConfig, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            config,
            observer,
            store: None,
        }
    }

    /// Checkpoint into `store` when the session's settings ask for it.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Start `session` (if it has not started) and hand it to a new task.
    ///
    /// A restored session whose feedback was still pending is settled first.
    pub fn spawn(self, mut session: Session) -> SessionHandle {
        session.start();
        session.settle();

        let (tx, rx) = mpsc::channel(self.config.command_buffer.max(1));
        let (status_tx, status_rx) = watch::channel(SessionStatus::from(&session));

        let worker = Worker {
            session,
            config: self.config,
            observer: self.observer,
            store: self.store,
            commands: rx,
            status: status_tx,
            settle_at: None,
        };
        worker.checkpoint();

        SessionHandle {
            tx,
            status: status_rx,
            task: tokio::spawn(worker.run()),
        }
    }
}

struct Worker {
    session: Session,
    config: EngineConfig,
    observer: Arc<dyn SessionObserver>,
    store: Option<SessionStore>,
    commands: mpsc::Receiver<Command>,
    status: watch::Sender<SessionStatus>,
    settle_at: Option<Instant>,
}

impl Worker {
    async fn run(mut self) -> Session {
        let period = self.config.tick_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let timed = self.session.remaining_time_secs().is_some();

        if self.session.is_completed() {
            self.finish();
            return self.session;
        }

        loop {
            // Keep running until the last feedback has been shown.
            if self.session.is_completed() && self.settle_at.is_none() {
                break;
            }

            let counting = timed && !self.session.is_completed() && !self.session.is_paused();
            let settle_at = self.settle_at;

            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Stop) | None => break,
                    Some(cmd) => {
                        if self.handle(cmd) {
                            ticker.reset();
                        }
                    }
                },
                _ = ticker.tick(), if counting => {
                    self.on_tick();
                }
                _ = sleep_until(settle_at), if settle_at.is_some() => {
                    self.settle();
                    ticker.reset();
                }
            }
        }

        tracing::debug!("session task for {} stopped", self.session.id());
        self.session
    }

    /// Returns `true` when the countdown should restart from a full period.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Answer { text, reply } => {
                let outcome = self.session.record_answer(&text);
                self.after_answer(&outcome);
                let _ = reply.send(outcome);
                false
            }
            Command::Skip { reply } => {
                let outcome = self.session.skip();
                self.after_answer(&outcome);
                let _ = reply.send(outcome);
                false
            }
            Command::Settle { reply } => {
                let feedback = self.settle();
                let settled = feedback.is_some();
                let _ = reply.send(feedback);
                settled
            }
            Command::Practice { option, reply } => {
                let _ = reply.send(self.session.practice(&option));
                false
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.clone());
                false
            }
            Command::Stop => false,
        }
    }

    fn after_answer(&mut self, outcome: &AnswerOutcome) {
        let AnswerOutcome::Accepted { feedback, completed } = outcome else {
            return;
        };
        self.observer.on_feedback(feedback);
        self.settle_at = Some(Instant::now() + self.delay_for(feedback));
        self.publish();
        if *completed {
            self.finish();
        } else {
            self.checkpoint();
        }
    }

    fn settle(&mut self) -> Option<Feedback> {
        self.settle_at = None;
        let feedback = self.session.settle();
        if feedback.is_some() {
            self.publish();
            if !self.session.is_completed() {
                self.observer.on_next(&self.session);
                self.checkpoint();
            }
        }
        feedback
    }

    fn on_tick(&mut self) {
        match self.session.tick() {
            TickOutcome::Counted { remaining } => {
                if let Some(remaining) = remaining {
                    self.observer.on_tick(remaining);
                }
                self.publish();
                self.checkpoint();
            }
            TickOutcome::Completed { timed_out } => {
                if timed_out {
                    self.observer.on_tick(0);
                }
                self.publish();
                self.finish();
            }
            TickOutcome::Ignored => {}
        }
    }

    fn delay_for(&self, feedback: &Feedback) -> Duration {
        if feedback.verdict == Verdict::Skipped {
            return self.config.delays.skip;
        }
        match self.session.questions().get(feedback.index).map(|q| q.format) {
            Some(AnswerFormat::Choice) => self.config.delays.choice,
            _ => self.config.delays.free_text,
        }
    }

    fn finish(&self) {
        self.observer.on_complete(&self.session);
        self.publish();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                tracing::warn!("failed to clear stored session: {e}");
            }
        }
    }

    fn checkpoint(&self) {
        if !self.session.settings().remember_progress {
            return;
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.session) {
                tracing::warn!("failed to checkpoint session {}: {e}", self.session.id());
            }
        }
    }

    fn publish(&self) {
        self.status.send_replace(SessionStatus::from(&self.session));
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Talks to a running session task.
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    status: watch::Receiver<SessionStatus>,
    task: JoinHandle<Session>,
}

impl SessionHandle {
    pub async fn answer(&self, text: impl Into<String>) -> Result<AnswerOutcome, EngineError> {
        let text = text.into();
        self.request(|reply| Command::Answer { text, reply }).await
    }

    pub async fn skip(&self) -> Result<AnswerOutcome, EngineError> {
        self.request(|reply| Command::Skip { reply }).await
    }

    /// Dismiss pending feedback now instead of waiting for the delay.
    pub async fn settle(&self) -> Result<Option<Feedback>, EngineError> {
        self.request(|reply| Command::Settle { reply }).await
    }

    pub async fn practice(&self, option: impl Into<String>) -> Result<bool, EngineError> {
        let option = option.into();
        self.request(|reply| Command::Practice { option, reply })
            .await
    }

    /// A copy of the session as it is right now.
    pub async fn snapshot(&self) -> Result<Session, EngineError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Wait until the session is completed.
    pub async fn completed(&self) -> Result<SessionStatus, EngineError> {
        self.wait_for(|s| s.state == SessionState::Completed).await
    }

    /// Wait until no feedback is pending or the session is completed.
    pub async fn settled(&self) -> Result<SessionStatus, EngineError> {
        self.wait_for(|s| !s.paused || s.state == SessionState::Completed)
            .await
    }

    /// Stop the task and take the session back.
    pub async fn finish(self) -> Result<Session, EngineError> {
        // The task may already have stopped on its own.
        let _ = self.tx.send(Command::Stop).await;
        self.task
            .await
            .map_err(|e| EngineError::Failed(e.to_string()))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    async fn wait_for(
        &self,
        done: impl Fn(&SessionStatus) -> bool,
    ) -> Result<SessionStatus, EngineError> {
        let mut rx = self.status.clone();
        loop {
            {
                let status = rx.borrow_and_update();
                if done(&status) {
                    return Ok(status.clone());
                }
            }
            if rx.changed().await.is_err() {
                let status = rx.borrow();
                return if done(&status) {
                    Ok(status.clone())
                } else {
                    Err(EngineError::Closed)
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, Question, StudyMode};
    use crate::session::{SessionQuestion, SessionSettings};
    use crate::testing::{word, BrokenStore, MapStore};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SessionObserver for Recorder {
        fn on_feedback(&self, feedback: &Feedback) {
            self.events
                .lock()
                .unwrap()
                .push(format!("feedback {} {}", feedback.question_id, feedback.verdict));
        }
        fn on_next(&self, session: &Session) {
            self.events
                .lock()
                .unwrap()
                .push(format!("next {}", session.current_index()));
        }
        fn on_tick(&self, remaining: u32) {
            self.events.lock().unwrap().push(format!("tick {remaining}"));
        }
        fn on_complete(&self, _: &Session) {
            self.events.lock().unwrap().push("complete".into());
        }
    }

    fn session(n: usize, time_limit: Option<u32>) -> Session {
        session_with(n, time_limit, SessionSettings::default())
    }

    fn session_with(n: usize, time_limit: Option<u32>, settings: SessionSettings) -> Session {
        let questions = (0..n)
            .map(|i| {
                let w = word(&format!("q{}", i + 1), &format!("Wort{i}"), &format!("woord{i}"));
                SessionQuestion::choice(Question::Vocabulary(w), vec![format!("Wort{i}")])
            })
            .collect();
        Session::new(
            StudyMode::MultipleChoice,
            Direction::NativeToForeign,
            questions,
            settings,
            time_limit,
        )
    }

    fn engine() -> SessionEngine {
        SessionEngine::new(EngineConfig::default(), Arc::new(NoopObserver))
    }

    #[tokio::test(start_paused = true)]
    async fn answer_settles_after_delay() {
        let handle = engine().spawn(session(2, None));

        let outcome = handle.answer("Wort0").await.unwrap();
        assert_eq!(outcome.verdict(), Some(Verdict::Correct));
        assert!(handle.status().paused);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(handle.status().paused);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let status = handle.status();
        assert!(!status.paused);
        assert_eq!(status.current_index, 1);
    }

    #[test]
    fn delays_from_config() {
        assert_eq!(
            FeedbackDelays::from(&FeedbackConfig::default()),
            FeedbackDelays::default()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_settles_at_once() {
        let config = EngineConfig {
            delays: FeedbackDelays::from(&FeedbackConfig {
                choice_ms: 0,
                free_text_ms: 0,
                skip_ms: 0,
            }),
            ..EngineConfig::default()
        };
        let handle = SessionEngine::new(config, Arc::new(NoopObserver)).spawn(session(2, None));
        handle.answer("Wort0").await.unwrap();
        let status = handle.settled().await.unwrap();
        assert!(!status.paused);
        assert_eq!(status.current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn double_submit_is_rejected() {
        let handle = engine().spawn(session(3, None));
        handle.answer("Wort0").await.unwrap();
        let second = handle.answer("Wort0").await.unwrap();
        assert!(!second.is_accepted());

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.score(), 1);
        assert_eq!(snapshot.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_settle_skips_the_wait() {
        let handle = engine().spawn(session(2, None));
        handle.skip().await.unwrap();
        let feedback = handle.settle().await.unwrap().unwrap();
        assert_eq!(feedback.verdict, Verdict::Skipped);
        assert!(!handle.status().paused);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_forces_completion() {
        let recorder = Arc::new(Recorder::default());
        let handle = SessionEngine::new(EngineConfig::default(), recorder.clone())
            .spawn(session(5, Some(3)));

        let status = handle.completed().await.unwrap();
        assert!(status.timed_out);
        assert_eq!(status.current_index, 0);

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(events, vec!["tick 2", "tick 1", "tick 0", "complete"]);

        let final_session = handle.finish().await.unwrap();
        assert!(final_session.is_completed());
        assert_eq!(final_session.percentage(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_stops_during_feedback() {
        let handle = engine().spawn(session(3, Some(10)));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(handle.status().remaining_time_secs, Some(8));

        handle.answer("Wort0").await.unwrap();
        // Choice feedback pauses the clock for 1.5s.
        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert_eq!(handle.status().remaining_time_secs, Some(8));

        handle.settled().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(handle.status().remaining_time_secs, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn answer_after_timeout_is_rejected() {
        let handle = engine().spawn(session(2, Some(1)));
        handle.completed().await.unwrap();
        // The task stops once the session is over.
        assert!(matches!(
            handle.answer("Wort0").await,
            Err(EngineError::Closed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn checkpoints_and_clears() {
        let kv = Arc::new(MapStore::default());
        let store = SessionStore::new(kv.clone(), "app");
        let handle = engine().with_store(store.clone()).spawn(session(2, None));

        handle.answer("Wort0").await.unwrap();
        let saved = store.load().unwrap();
        assert_eq!(saved.score(), 1);

        handle.settled().await.unwrap();
        handle.answer("nope").await.unwrap();
        handle.completed().await.unwrap();
        assert!(store.load().is_none());

        let session = handle.finish().await.unwrap();
        assert_eq!(session.score(), 1);
        assert_eq!(session.wrong_ids().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_saves_do_not_interrupt_the_session() {
        let store = SessionStore::new(Arc::new(BrokenStore), "app");
        let handle = engine().with_store(store).spawn(session(3, Some(60)));

        let first = handle.answer("Wort0").await.unwrap();
        assert_eq!(first.verdict(), Some(Verdict::Correct));
        handle.settled().await.unwrap();
        let second = handle.skip().await.unwrap();
        assert_eq!(second.verdict(), Some(Verdict::Skipped));
        handle.settled().await.unwrap();
        let last = handle.answer("nope").await.unwrap();
        assert!(matches!(last, AnswerOutcome::Accepted { completed: true, .. }));

        let status = handle.completed().await.unwrap();
        assert!(!status.timed_out);
        let session = handle.finish().await.unwrap();
        assert_eq!(session.score(), 1);
        assert_eq!(session.answered_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_saved_without_remember_progress() {
        let kv = Arc::new(MapStore::default());
        let store = SessionStore::new(kv, "app");
        let settings = SessionSettings {
            remember_progress: false,
            ..SessionSettings::default()
        };
        let s = session_with(2, None, settings);
        let handle = engine().with_store(store.clone()).spawn(s);
        handle.answer("Wort0").await.unwrap();
        assert!(store.load().is_none());
        handle.finish().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn observer_sees_the_flow() {
        let recorder = Arc::new(Recorder::default());
        let handle = SessionEngine::new(EngineConfig::default(), recorder.clone())
            .spawn(session(2, None));

        handle.answer("Wort0").await.unwrap();
        handle.settled().await.unwrap();
        handle.skip().await.unwrap();
        handle.completed().await.unwrap();
        let session = handle.finish().await.unwrap();
        assert!(session.is_completed());

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "feedback q1 correct",
                "next 1",
                "feedback q2 skipped",
                "complete"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resumed_pending_feedback_is_settled() {
        let mut s = session(2, None);
        s.start();
        s.record_answer("Wort0");
        assert!(s.is_paused());

        let handle = engine().spawn(s);
        let status = handle.status();
        assert!(!status.paused);
        assert_eq!(status.current_index, 1);
        assert_eq!(status.state, SessionState::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_session_completes_immediately() {
        let handle = engine().spawn(session(0, Some(10)));
        let status = handle.completed().await.unwrap();
        assert_eq!(status.total, 0);
        let session = handle.finish().await.unwrap();
        assert_eq!(session.percentage(), 0);
    }
}
