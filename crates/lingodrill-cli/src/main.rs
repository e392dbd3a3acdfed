//! lingodrill CLI: study sessions, timed tests and bookkeeping in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use lingodrill_core::model::{BookmarkKind, Direction, StudyMode};
use lingodrill_core::timer::TestKind;

mod commands;
mod console;
mod context;
mod speech;

#[derive(Parser)]
#[command(name = "lingodrill", version, about = "Vocabulary and grammar drill trainer")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start (or resume) a study session
    Study {
        /// learn, multiple-choice, write, grammar or mixed
        #[arg(long, default_value = "multiple-choice")]
        mode: StudyMode,

        /// native-to-foreign or foreign-to-native
        #[arg(long, default_value = "native-to-foreign")]
        direction: Direction,

        /// Number of questions (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Content file or directory
        #[arg(long, default_value = "content")]
        content: PathBuf,

        /// Resume the stored session without asking
        #[arg(long, conflicts_with = "restart")]
        resume: bool,

        /// Discard the stored session without asking
        #[arg(long)]
        restart: bool,

        /// Speak the answer after every question
        #[arg(long)]
        speak: bool,

        /// Also write the results as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Take a timed test
    Test {
        /// vocabulary-choice, vocabulary-write or grammar
        #[arg(long, default_value = "vocabulary-choice")]
        kind: TestKind,

        /// native-to-foreign or foreign-to-native
        #[arg(long, default_value = "native-to-foreign")]
        direction: Direction,

        /// Number of questions (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Content file or directory
        #[arg(long, default_value = "content")]
        content: PathBuf,

        /// Also write the results as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compute percentage and grade for a score
    Grade {
        #[arg(long)]
        score: u32,

        #[arg(long)]
        total: u32,
    },

    /// Search words and grammar rules
    Search {
        /// Text to look for
        term: String,

        /// Content file or directory
        #[arg(long, default_value = "content")]
        content: PathBuf,
    },

    /// Manage bookmarks
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkAction,
    },

    /// Validate content files
    Validate {
        /// Content file or directory
        #[arg(long, default_value = "content")]
        content: PathBuf,
    },

    /// Show past results
    History {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Forget all recorded results
        #[arg(long)]
        clear: bool,
    },

    /// Create a starter config and sample deck
    Init,
}

#[derive(Subcommand)]
enum BookmarkAction {
    /// List bookmarks
    List {
        /// Content to look the bookmarked items up in
        #[arg(long, default_value = "content")]
        content: PathBuf,
    },
    /// Bookmark an item
    Add {
        id: String,
        /// word or grammar-rule
        #[arg(long, default_value = "word")]
        kind: BookmarkKind,
    },
    /// Remove a bookmark
    Remove {
        id: String,
        #[arg(long, default_value = "word")]
        kind: BookmarkKind,
    },
    /// Add the bookmark if missing, remove it otherwise
    Toggle {
        id: String,
        #[arg(long, default_value = "word")]
        kind: BookmarkKind,
    },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "lingodrill=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Study {
            mode,
            direction,
            count,
            content,
            resume,
            restart,
            speak,
            output,
        } => {
            let options = commands::study::StudyOptions {
                mode,
                direction,
                count,
                content,
                resume,
                restart,
                speak,
                output,
            };
            commands::study::execute(options, config).await
        }
        Commands::Test {
            kind,
            direction,
            count,
            content,
            output,
        } => commands::test::execute(kind, direction, count, content, output, config).await,
        Commands::Grade { score, total } => commands::grade::execute(score, total),
        Commands::Search { term, content } => commands::search::execute(&term, content),
        Commands::Bookmarks { action } => match action {
            BookmarkAction::List { content } => commands::bookmarks::list(content, config),
            BookmarkAction::Add { id, kind } => commands::bookmarks::add(&id, kind, config),
            BookmarkAction::Remove { id, kind } => commands::bookmarks::remove(&id, kind, config),
            BookmarkAction::Toggle { id, kind } => commands::bookmarks::toggle(&id, kind, config),
        },
        Commands::Validate { content } => commands::validate::execute(content),
        Commands::History { format, clear } => commands::history::execute(&format, clear, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
