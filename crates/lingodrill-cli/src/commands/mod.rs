//! One module per subcommand. Each exposes `execute` (or one function per action).

pub mod bookmarks;
pub mod grade;
pub mod history;
pub mod init;
pub mod search;
pub mod study;
pub mod test;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use lingodrill_core::config::LingodrillConfig;
use lingodrill_core::engine::{EngineConfig, FeedbackDelays, SessionEngine};
use lingodrill_core::model::Catalog;
use lingodrill_core::parser;
use lingodrill_core::session::Session;

use crate::console::{self, Ended, Input, View};
use crate::context::AppContext;
use crate::speech;

/// Load the deck at `path` and warn about anything suspicious in it.
fn load_content(path: &Path) -> Result<Catalog> {
    let catalog = parser::load_catalog(path)?;
    for warning in parser::validate_catalog(&catalog) {
        match &warning.item_id {
            Some(id) => tracing::warn!("[{id}] {}", warning.message),
            None => tracing::warn!("{}", warning.message),
        }
    }
    Ok(catalog)
}

fn engine_config(config: &LingodrillConfig) -> EngineConfig {
    EngineConfig {
        delays: FeedbackDelays::from(&config.feedback),
        ..EngineConfig::default()
    }
}

/// Drive `session` in the terminal, then show and record the results.
///
/// A session left unfinished is not recorded; with `resumable` set the
/// learner is told it can be picked up again.
#[allow(clippy::too_many_arguments)]
async fn run_session(
    ctx: &AppContext,
    engine: SessionEngine,
    session: Session,
    catalog: &Catalog,
    input: &mut Input,
    resumable: bool,
    speak: bool,
    output: Option<&Path>,
) -> Result<()> {
    let speaker = speech::speaker();
    let learning = &ctx.config.learning;
    let view = View {
        deck: &catalog.deck,
        show_examples: learning.show_example_sentence,
        speak: speak && learning.show_pronunciation_audio,
        speaker: speaker.as_ref(),
    };

    let handle = engine.spawn(session);
    let ended = console::drive(&handle, input, &view).await?;
    let session = handle.finish().await?;

    if ended == Ended::Left && !session.is_completed() {
        if resumable && session.settings().remember_progress {
            println!("\nProgress saved. Run `lingodrill study` to continue.");
        } else {
            println!("\nSession abandoned.");
        }
        return Ok(());
    }

    let summary = console::print_results(&session);
    ctx.history()
        .record(summary.clone())
        .context("failed to record result")?;
    if let Some(path) = output {
        summary.save_json(path)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}
