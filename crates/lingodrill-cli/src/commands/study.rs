//! The `lingodrill study` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use lingodrill_core::builder::SessionBuilder;
use lingodrill_core::engine::SessionEngine;
use lingodrill_core::model::{Direction, StudyMode};
use lingodrill_core::persistence::ResumeChoice;
use lingodrill_core::session::SessionSettings;

use super::{engine_config, load_content, run_session};
use crate::console::{ConsoleObserver, Input};
use crate::context::AppContext;

pub struct StudyOptions {
    pub mode: StudyMode,
    pub direction: Direction,
    pub count: Option<usize>,
    pub content: PathBuf,
    pub resume: bool,
    pub restart: bool,
    pub speak: bool,
    pub output: Option<PathBuf>,
}

pub async fn execute(options: StudyOptions, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let catalog = load_content(&options.content)?;
    let sessions = ctx.sessions();
    let mut input = Input::stdin();

    let resumed = match sessions.resume_candidate() {
        Some(stored) => {
            let choice = if options.restart {
                ResumeChoice::Restart
            } else if options.resume {
                ResumeChoice::Resume
            } else {
                let question = format!(
                    "You have an unfinished {} session ({} of {} answered). Resume it?",
                    stored.mode(),
                    stored.answered_count(),
                    stored.len()
                );
                if input.confirm(&question).await? {
                    ResumeChoice::Resume
                } else {
                    ResumeChoice::Restart
                }
            };
            sessions.decide(choice)
        }
        None => {
            if options.resume {
                println!("No unfinished session, starting a new one.");
            }
            None
        }
    };

    let session = match resumed {
        Some(session) => {
            println!(
                "Resuming {} session at question {} of {}.",
                session.mode(),
                session.current_index() + 1,
                session.len()
            );
            session
        }
        None => {
            let session = SessionBuilder::new(&catalog, options.mode)
                .direction(options.direction)
                .count(options.count.unwrap_or(ctx.config.default_question_count))
                .settings(SessionSettings::from(&ctx.config.learning))
                .option_count(ctx.config.option_count)
                .build(&mut rand::thread_rng());
            anyhow::ensure!(
                !session.is_empty(),
                "no {} questions in {}",
                options.mode,
                options.content.display()
            );
            println!(
                "{}: {} session with {} questions. Type :skip, :say or :quit at any prompt.",
                catalog.deck.name,
                session.mode(),
                session.len()
            );
            session
        }
    };

    let engine = SessionEngine::new(engine_config(&ctx.config), Arc::new(ConsoleObserver))
        .with_store(sessions);
    run_session(
        &ctx,
        engine,
        session,
        &catalog,
        &mut input,
        true,
        options.speak,
        options.output.as_deref(),
    )
    .await
}
