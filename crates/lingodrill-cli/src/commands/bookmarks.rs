//! The `lingodrill bookmarks` subcommands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use lingodrill_core::model::BookmarkKind;

use super::load_content;
use crate::context::AppContext;

pub fn list(content: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let bookmarks = ctx.bookmarks().list()?;
    if bookmarks.is_empty() {
        println!("No bookmarks yet.");
        return Ok(());
    }

    let catalog = load_content(&content)?;
    let mut table = Table::new();
    table.set_header(vec!["Type", "ID", "Entry"]);
    for bookmark in &bookmarks {
        let entry = match bookmark.item_type {
            BookmarkKind::Word => catalog
                .word_by_id(&bookmark.item_id)
                .map(|w| format!("{} = {}", w.native, w.foreign)),
            BookmarkKind::GrammarRule => catalog
                .rule_by_id(&bookmark.item_id)
                .map(|r| r.title.clone()),
        };
        table.add_row(vec![
            bookmark.item_type.to_string(),
            bookmark.item_id.clone(),
            entry.unwrap_or_else(|| "(not in this deck)".to_string()),
        ]);
    }
    println!("{table}");
    println!("{} bookmark(s).", bookmarks.len());
    Ok(())
}

pub fn add(id: &str, kind: BookmarkKind, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    if ctx.bookmarks().add(id, kind)? {
        println!("Bookmarked {kind} '{id}'.");
    } else {
        println!("{kind} '{id}' is already bookmarked.");
    }
    Ok(())
}

pub fn remove(id: &str, kind: BookmarkKind, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    if ctx.bookmarks().remove(id, kind)? {
        println!("Removed bookmark {kind} '{id}'.");
    } else {
        println!("{kind} '{id}' was not bookmarked.");
    }
    Ok(())
}

pub fn toggle(id: &str, kind: BookmarkKind, config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    if ctx.bookmarks().toggle(id, kind)? {
        println!("Bookmarked {kind} '{id}'.");
    } else {
        println!("Removed bookmark {kind} '{id}'.");
    }
    Ok(())
}
