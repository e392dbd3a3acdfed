//! Terminal front end for a running session.
//!
//! The session itself lives in an engine task; this module prints questions,
//! reads answers from stdin and forwards them to the task's handle.

use std::io::BufRead;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use lingodrill_core::engine::{SessionHandle, SessionObserver};
use lingodrill_core::model::{Deck, StudyMode};
use lingodrill_core::report::SessionSummary;
use lingodrill_core::session::{
    AnswerFormat, AnswerOutcome, Feedback, Session, SessionQuestion, SessionState, Verdict,
};
use lingodrill_core::timer::format_clock;
use lingodrill_core::traits::Speaker;

/// Prints feedback and countdown warnings as the engine reports them.
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_feedback(&self, feedback: &Feedback) {
        match feedback.verdict {
            Verdict::Correct => println!("  Correct!"),
            Verdict::Incorrect => println!("  Incorrect. The answer is: {}", feedback.expected),
            Verdict::Skipped => println!("  Skipped. The answer is: {}", feedback.expected),
        }
        if let Some(explanation) = &feedback.explanation {
            println!("  {explanation}");
        }
    }

    fn on_next(&self, _: &Session) {}

    fn on_tick(&self, remaining_secs: u32) {
        match remaining_secs {
            0 => println!("\nTime is up!"),
            60 | 30 | 10 => println!("\n  {} left", format_clock(remaining_secs)),
            _ => {}
        }
    }

    fn on_complete(&self, session: &Session) {
        tracing::debug!("session {} complete", session.id());
    }
}

/// Line-oriented stdin.
///
/// Lines are read on a detached thread, so a read still waiting when the
/// session ends does not hold up exit.
pub struct Input {
    lines: mpsc::Receiver<std::io::Result<String>>,
}

impl Input {
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    /// The next line without its line ending, or `None` at end of input.
    /// Other whitespace is kept; strict grading compares it too.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.recv().await {
            Some(line) => Ok(Some(line?)),
            None => Ok(None),
        }
    }

    /// Ask a yes/no question. End of input counts as no.
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        println!("{question} [y/N]");
        Ok(self
            .next_line()
            .await?
            .is_some_and(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")))
    }
}

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ended {
    Completed,
    /// The learner quit or input ran out; the session may be resumed.
    Left,
}

enum Read {
    Line(String),
    Eof,
    Over,
}

/// Presentation options for [`drive`].
pub struct View<'a> {
    pub deck: &'a Deck,
    pub show_examples: bool,
    pub speak: bool,
    pub speaker: &'a dyn Speaker,
}

/// Run the question/answer loop until the session completes or the learner
/// leaves.
///
/// Typing `:skip` skips, `:say` speaks the answer side and `:quit` leaves.
/// For choice questions the option number may be typed instead of the text.
pub async fn drive(handle: &SessionHandle, input: &mut Input, view: &View<'_>) -> Result<Ended> {
    loop {
        if handle.status().state == SessionState::Completed {
            return Ok(Ended::Completed);
        }
        let session = match handle.snapshot().await {
            Ok(session) => session,
            // The task stops on its own once the session is over.
            Err(_) if handle.status().state == SessionState::Completed => {
                return Ok(Ended::Completed)
            }
            Err(e) => return Err(e.into()),
        };
        let Some(entry) = session.presented().cloned() else {
            return Ok(Ended::Completed);
        };

        present(&session, &entry, view);

        if session.mode() == StudyMode::Learn && !entry.options.is_empty() {
            if !practice_round(handle, input, &entry).await? {
                return ended(handle);
            }
            println!("Now write it:");
        }

        let outcome = loop {
            let line = match read(handle, input).await? {
                Read::Line(line) => line,
                Read::Eof => return ended(handle),
                Read::Over => return Ok(Ended::Completed),
            };
            match line.trim() {
                "" => continue,
                ":quit" => return ended(handle),
                ":say" => {
                    say(&session, &entry, view);
                    continue;
                }
                ":skip" => break handle.skip().await,
                _ => break handle.answer(resolve_choice(&entry, &line)).await,
            }
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(_) if handle.status().state == SessionState::Completed => {
                return Ok(Ended::Completed)
            }
            Err(e) => return Err(e.into()),
        };

        match outcome {
            AnswerOutcome::Accepted { .. } => {
                if view.show_examples && session.mode() != StudyMode::Learn {
                    for example in entry.question.examples() {
                        println!("  e.g. {} ({})", example.foreign, example.native);
                    }
                }
                if view.speak {
                    say(&session, &entry, view);
                }
                handle.settled().await?;
            }
            AnswerOutcome::Rejected(reason) => println!("  {reason}"),
        }
    }
}

fn ended(handle: &SessionHandle) -> Result<Ended> {
    Ok(if handle.status().state == SessionState::Completed {
        Ended::Completed
    } else {
        Ended::Left
    })
}

fn present(session: &Session, entry: &SessionQuestion, view: &View<'_>) {
    let direction = session.direction();
    let clock = session
        .remaining_time_secs()
        .map(|secs| format!(" ({} left)", format_clock(secs)))
        .unwrap_or_default();
    println!(
        "\n[{}/{}]{clock} {}",
        session.current_index() + 1,
        session.len(),
        entry.question.prompt(direction)
    );

    if session.mode() == StudyMode::Learn {
        println!("  = {}", entry.question.expected_answer(direction));
        if view.show_examples {
            for example in entry.question.examples() {
                println!("  e.g. {} ({})", example.foreign, example.native);
            }
        }
        return;
    }

    if entry.format == AnswerFormat::Choice {
        print_options(&entry.options);
    }
}

fn print_options(options: &[String]) {
    for (i, option) in options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
}

/// Unscored multiple-choice warm-up for learn mode. `false` when the learner left.
async fn practice_round(
    handle: &SessionHandle,
    input: &mut Input,
    entry: &SessionQuestion,
) -> Result<bool> {
    println!("Pick the right one:");
    print_options(&entry.options);
    loop {
        let line = match read(handle, input).await? {
            Read::Line(line) => line,
            Read::Eof | Read::Over => return Ok(false),
        };
        match line.trim() {
            "" => continue,
            ":quit" => return Ok(false),
            _ => {
                let option = resolve_choice(entry, &line);
                if handle.practice(option.as_str()).await? {
                    println!("  Right!");
                } else {
                    println!("  Not quite.");
                }
                return Ok(true);
            }
        }
    }
}

/// Read a line unless the session ends first.
async fn read(handle: &SessionHandle, input: &mut Input) -> Result<Read> {
    tokio::select! {
        line = input.next_line() => Ok(match line? {
            Some(line) => Read::Line(line),
            None => Read::Eof,
        }),
        _ = handle.completed() => Ok(Read::Over),
    }
}

/// Map an option number to its text; anything else is taken literally.
fn resolve_choice(entry: &SessionQuestion, line: &str) -> String {
    line.trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| entry.options.get(i))
        .cloned()
        .unwrap_or_else(|| line.to_string())
}

fn say(session: &Session, entry: &SessionQuestion, view: &View<'_>) {
    if let Some(request) = entry.question.speech(session.direction(), view.deck) {
        view.speaker.speak(&request.text, &request.locale);
    }
}

/// Print the results screen and return the summary.
pub fn print_results(session: &Session) -> SessionSummary {
    let summary = SessionSummary::from_session(session);

    let mut table = Table::new();
    table.set_header(vec!["Mode", "Score", "Percentage", "Grade"]);
    table.add_row(vec![
        Cell::new(summary.mode),
        Cell::new(format!("{}/{}", summary.score, summary.total)),
        Cell::new(format!("{}%", summary.percentage)),
        Cell::new(summary.grade),
    ]);
    println!("\n{table}");
    println!("{}", summary.tier.message());

    if summary.timed_out {
        println!(
            "Time ran out with {} question(s) unanswered.",
            summary.unanswered()
        );
    }

    let missed: Vec<&SessionQuestion> = session
        .questions()
        .iter()
        .filter(|q| summary.wrong_ids.contains(q.id()) || summary.skipped_ids.contains(q.id()))
        .collect();
    if !missed.is_empty() {
        let mut review = Table::new();
        review.set_header(vec!["Question", "Answer"]);
        for q in missed {
            review.add_row(vec![
                q.question.prompt(session.direction()),
                q.question.expected_answer(session.direction()),
            ]);
        }
        println!("\nReview:\n{review}");
    }

    summary
}
