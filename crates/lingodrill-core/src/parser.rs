//! TOML content parser.
//!
//! Loads vocabulary and grammar catalogs from TOML files and directories,
//! and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    Catalog, Deck, Difficulty, Direction, ExamplePair, GrammarExample, GrammarRule, RuleExercise,
    VocabularyItem,
};

/// Intermediate TOML structure for parsing content files.
#[derive(Debug, Deserialize)]
struct TomlContentFile {
    #[serde(default)]
    deck: Option<Deck>,
    #[serde(default)]
    words: Vec<TomlWord>,
    #[serde(default)]
    rules: Vec<TomlRule>,
}

#[derive(Debug, Deserialize)]
struct TomlWord {
    id: String,
    foreign: String,
    native: String,
    #[serde(default)]
    category: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    examples: Vec<TomlExample>,
}

#[derive(Debug, Deserialize)]
struct TomlExample {
    foreign: String,
    native: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlRule {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    examples: Vec<TomlExample>,
    #[serde(default)]
    exercises: Vec<TomlExercise>,
}

#[derive(Debug, Deserialize)]
struct TomlExercise {
    question: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(alias = "answer")]
    correct_answer: String,
    #[serde(default)]
    explanation: String,
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

fn parse_difficulty(s: &str) -> Result<Difficulty> {
    s.parse().map_err(|e: String| anyhow::anyhow!("{}", e))
}

/// Parse a single TOML file into a `Catalog`.
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read content file: {}", path.display()))?;

    parse_catalog_str(&content, path)
}

/// Parse a TOML string into a `Catalog` (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<Catalog> {
    let parsed: TomlContentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let vocabulary = parsed
        .words
        .into_iter()
        .map(|w| {
            let direction = w
                .direction
                .map(|d| d.parse::<Direction>().map_err(|e| anyhow::anyhow!("{}", e)))
                .transpose()
                .with_context(|| format!("word '{}'", w.id))?;
            let difficulty =
                parse_difficulty(&w.difficulty).with_context(|| format!("word '{}'", w.id))?;

            Ok(VocabularyItem {
                id: w.id,
                foreign: w.foreign,
                native: w.native,
                category: w.category,
                difficulty,
                examples: w
                    .examples
                    .into_iter()
                    .map(|e| ExamplePair {
                        foreign: e.foreign,
                        native: e.native,
                    })
                    .collect(),
                direction,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let grammar = parsed
        .rules
        .into_iter()
        .map(|r| {
            let difficulty =
                parse_difficulty(&r.difficulty).with_context(|| format!("rule '{}'", r.id))?;

            Ok(GrammarRule {
                id: r.id,
                title: r.title,
                description: r.description,
                difficulty,
                examples: r
                    .examples
                    .into_iter()
                    .map(|e| GrammarExample {
                        foreign: e.foreign,
                        native: e.native,
                        explanation: e.explanation,
                    })
                    .collect(),
                exercises: r
                    .exercises
                    .into_iter()
                    .map(|x| RuleExercise {
                        question: x.question,
                        options: x.options,
                        correct_answer: x.correct_answer,
                        explanation: x.explanation,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalog {
        deck: parsed.deck.unwrap_or_default(),
        vocabulary,
        grammar,
    })
}

/// Recursively load all `.toml` content files from a directory and merge them.
///
/// The deck comes from the first file (in path order) that declares one.
pub fn load_content_directory(dir: &Path) -> Result<Catalog> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    collect_toml_files(dir, &mut files)?;
    files.sort();

    let mut catalog = Catalog::default();
    let mut deck_seen = false;
    for path in files {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let has_deck = toml::from_str::<toml::Table>(&content)
            .map(|t| t.contains_key("deck"))
            .unwrap_or(false);
        match parse_catalog_str(&content, &path) {
            Ok(part) => {
                if has_deck && !deck_seen {
                    catalog.deck = part.deck;
                    deck_seen = true;
                }
                catalog.vocabulary.extend(part.vocabulary);
                catalog.grammar.extend(part.grammar);
            }
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    tracing::debug!(
        "loaded {} words and {} grammar rules from {}",
        catalog.vocabulary.len(),
        catalog.grammar.len(),
        dir.display()
    );
    Ok(catalog)
}

fn collect_toml_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_toml_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            out.push(path);
        }
    }
    Ok(())
}

/// Load a catalog from a file or a directory of files.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    if path.is_dir() {
        load_content_directory(path)
    } else {
        parse_catalog(path)
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The word or rule ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a catalog for common issues.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_words = HashSet::new();
    for word in &catalog.vocabulary {
        if !seen_words.insert(&word.id) {
            warnings.push(ValidationWarning {
                item_id: Some(word.id.clone()),
                message: format!("duplicate word ID: {}", word.id),
            });
        }
        if word.foreign.trim().is_empty() || word.native.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_id: Some(word.id.clone()),
                message: "translation is empty".into(),
            });
        }
    }

    let mut seen_rules = HashSet::new();
    for rule in &catalog.grammar {
        if !seen_rules.insert(&rule.id) {
            warnings.push(ValidationWarning {
                item_id: Some(rule.id.clone()),
                message: format!("duplicate rule ID: {}", rule.id),
            });
        }
        if rule.exercises.is_empty() {
            warnings.push(ValidationWarning {
                item_id: Some(rule.id.clone()),
                message: "rule has no exercises".into(),
            });
        }
        for (n, exercise) in rule.exercises.iter().enumerate() {
            let id = format!("{}#{}", rule.id, n + 1);
            if exercise.question.trim().is_empty() {
                warnings.push(ValidationWarning {
                    item_id: Some(id.clone()),
                    message: "exercise question is empty".into(),
                });
            }
            if let Some(options) = &exercise.options {
                if !options.contains(&exercise.correct_answer) {
                    warnings.push(ValidationWarning {
                        item_id: Some(id),
                        message: format!(
                            "options do not contain the correct answer '{}'",
                            exercise.correct_answer
                        ),
                    });
                }
            }
        }
    }

    warnings
}
