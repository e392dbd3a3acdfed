//! The `lingodrill test` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use lingodrill_core::builder::SessionBuilder;
use lingodrill_core::engine::SessionEngine;
use lingodrill_core::model::Direction;
use lingodrill_core::session::SessionSettings;
use lingodrill_core::timer::{format_clock, TestKind};

use super::{engine_config, load_content, run_session};
use crate::console::{ConsoleObserver, Input};
use crate::context::AppContext;

pub async fn execute(
    kind: TestKind,
    direction: Direction,
    count: Option<usize>,
    content: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let catalog = load_content(&content)?;

    // Tests are never checkpointed, so they cannot be resumed.
    let settings = SessionSettings {
        remember_progress: false,
        ..SessionSettings::from(&ctx.config.learning)
    };
    let session = SessionBuilder::for_test(&catalog, kind)
        .direction(direction)
        .count(count.unwrap_or(ctx.config.default_question_count))
        .settings(settings)
        .option_count(ctx.config.option_count)
        .build(&mut rand::thread_rng());
    anyhow::ensure!(
        !session.is_empty(),
        "no {kind} questions in {}",
        content.display()
    );

    match session.remaining_time_secs() {
        Some(secs) => println!(
            "{kind} test: {} questions in {}.",
            session.len(),
            format_clock(secs)
        ),
        None => println!("{kind} test: {} questions, untimed.", session.len()),
    }

    let engine = SessionEngine::new(engine_config(&ctx.config), Arc::new(ConsoleObserver));
    let mut input = Input::stdin();
    run_session(
        &ctx,
        engine,
        session,
        &catalog,
        &mut input,
        false,
        false,
        output.as_deref(),
    )
    .await
}
