//! The `lingodrill history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use lingodrill_core::statistics::compute_aggregate_stats;

use crate::context::AppContext;

const MISSED_LIMIT: usize = 5;

pub fn execute(format: &str, clear: bool, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let history = ctx.history();

    if clear {
        history.clear()?;
        println!("Result history cleared.");
        return Ok(());
    }

    let entries = history.entries()?;
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }
        "text" => {}
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    if entries.is_empty() {
        println!("No results yet. Finish a study session or test first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Finished", "Mode", "Score", "Percentage", "Grade", "Timed out"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.finished_at.format("%Y-%m-%d %H:%M")),
            Cell::new(entry.mode),
            Cell::new(format!("{}/{}", entry.score, entry.total)),
            Cell::new(format!("{}%", entry.percentage)),
            Cell::new(entry.grade),
            Cell::new(if entry.timed_out { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
    println!(
        "{} session(s), average {}%.",
        entries.len(),
        history.average_percentage()?
    );

    let stats = compute_aggregate_stats(&entries, MISSED_LIMIT);
    let mut modes: Vec<_> = stats.per_mode.values().collect();
    modes.sort_by_key(|m| m.mode.to_string());

    let mut per_mode = Table::new();
    per_mode.set_header(vec!["Mode", "Sessions", "Average", "Best", "Grade"]);
    for m in modes {
        per_mode.add_row(vec![
            Cell::new(m.mode),
            Cell::new(m.sessions),
            Cell::new(format!("{}%", m.average_percentage)),
            Cell::new(format!("{}%", m.best_percentage)),
            Cell::new(m.average_grade),
        ]);
    }
    println!("\n{per_mode}");

    if !stats.most_missed.is_empty() {
        println!("\nMost missed:");
        for item in &stats.most_missed {
            println!("  {} ({}x)", item.question_id, item.misses);
        }
    }

    Ok(())
}
