//! The `lingodrill search` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use lingodrill_core::search::search;

use super::load_content;

pub fn execute(term: &str, content: PathBuf) -> Result<()> {
    let catalog = load_content(&content)?;
    let results = search(&catalog, term);

    if results.is_empty() {
        println!("Nothing found for '{term}'.");
        return Ok(());
    }

    if !results.words.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            "ID",
            catalog.deck.native_language.as_str(),
            catalog.deck.foreign_language.as_str(),
            "Category",
        ]);
        for word in &results.words {
            table.add_row(vec![
                word.id.as_str(),
                word.native.as_str(),
                word.foreign.as_str(),
                word.category.as_str(),
            ]);
        }
        println!("Words:\n{table}");
    }

    if !results.rules.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["ID", "Rule", "Exercises"]);
        for rule in &results.rules {
            table.add_row(vec![
                rule.id.clone(),
                rule.title.clone(),
                rule.exercises.len().to_string(),
            ]);
        }
        println!("Grammar:\n{table}");
    }

    println!("{} match(es).", results.len());
    Ok(())
}
