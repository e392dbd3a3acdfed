//! Application configuration.
//!
//! Loaded once at startup from TOML. The `[learning]` section is copied into
//! every session when it is created, so changing the file mid-session has no
//! effect on a running session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::normalize::LeniencyFlags;

/// Learning-behaviour toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningSettings {
    #[serde(default = "default_true")]
    pub randomize_word_order: bool,
    #[serde(default = "default_true")]
    pub check_accents: bool,
    #[serde(default = "default_true")]
    pub check_capitalization: bool,
    #[serde(default = "default_true")]
    pub check_punctuation: bool,
    #[serde(default = "default_true")]
    pub skip_question_enabled: bool,
    #[serde(default = "default_true")]
    pub timer_enabled: bool,
    #[serde(default = "default_true")]
    pub remember_progress: bool,
    #[serde(default = "default_true")]
    pub show_example_sentence: bool,
    #[serde(default = "default_true")]
    pub show_pronunciation_audio: bool,
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            randomize_word_order: true,
            check_accents: true,
            check_capitalization: true,
            check_punctuation: true,
            skip_question_enabled: true,
            timer_enabled: true,
            remember_progress: true,
            show_example_sentence: true,
            show_pronunciation_audio: true,
        }
    }
}

impl LearningSettings {
    pub fn leniency(&self) -> LeniencyFlags {
        LeniencyFlags {
            check_accents: self.check_accents,
            check_capitalization: self.check_capitalization,
            check_punctuation: self.check_punctuation,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where persisted blobs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the file-backed store.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Prefix for every key, e.g. `app` gives `app_bookmarks`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            prefix: default_prefix(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./.lingodrill")
}

fn default_prefix() -> String {
    "app".to_string()
}

/// How long answer feedback stays up, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_choice_ms")]
    pub choice_ms: u64,
    #[serde(default = "default_free_text_ms")]
    pub free_text_ms: u64,
    #[serde(default = "default_skip_ms")]
    pub skip_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            choice_ms: default_choice_ms(),
            free_text_ms: default_free_text_ms(),
            skip_ms: default_skip_ms(),
        }
    }
}

fn default_choice_ms() -> u64 {
    1500
}
fn default_free_text_ms() -> u64 {
    2000
}
fn default_skip_ms() -> u64 {
    500
}

/// Top-level lingodrill configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LingodrillConfig {
    #[serde(default)]
    pub learning: LearningSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Options per multiple-choice question.
    #[serde(default = "default_option_count")]
    pub option_count: usize,
    /// Questions per session when none is requested.
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,
}

fn default_option_count() -> usize {
    4
}
fn default_question_count() -> usize {
    10
}

impl Default for LingodrillConfig {
    fn default() -> Self {
        Self {
            learning: LearningSettings::default(),
            storage: StorageConfig::default(),
            feedback: FeedbackConfig::default(),
            option_count: default_option_count(),
            default_question_count: default_question_count(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as they are, never scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations:
/// `lingodrill.toml` in the current directory, then
/// `~/.config/lingodrill/config.toml`.
///
/// Environment variable override: `LINGODRILL_STORAGE_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<LingodrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lingodrill.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LingodrillConfig::default(),
    };

    if let Ok(dir) = std::env::var("LINGODRILL_STORAGE_DIR") {
        config.storage.dir = PathBuf::from(dir);
    }

    config.storage.dir = PathBuf::from(resolve_env_vars(&config.storage.dir.to_string_lossy()));
    config.storage.prefix = resolve_env_vars(&config.storage.prefix);

    anyhow::ensure!(config.option_count >= 2, "option_count must be at least 2");

    Ok(config)
}

/// Parse a TOML string into a config (useful for testing).
pub fn parse_config_str(content: &str) -> Result<LingodrillConfig> {
    Ok(toml::from_str::<LingodrillConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lingodrill"))
}
