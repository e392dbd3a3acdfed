//! The `lingodrill validate` command.

use std::path::PathBuf;

use anyhow::Result;

use lingodrill_core::parser;

pub fn execute(content: PathBuf) -> Result<()> {
    let catalog = parser::load_catalog(&content)?;

    println!(
        "Deck: {} ({} words, {} grammar rules, {} exercises)",
        catalog.deck.name,
        catalog.vocabulary.len(),
        catalog.grammar.len(),
        catalog.grammar_exercises().len()
    );

    let warnings = parser::validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Content valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
