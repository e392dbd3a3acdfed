//! Core data model types for lingodrill.
//!
//! These are the reference-data types (vocabulary, grammar rules) and the
//! small enums the rest of the system uses to describe sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier of a word or grammar rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Which way a vocabulary item is asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Prompt in the learner's language, answer in the language being learned.
    #[default]
    NativeToForeign,
    /// Prompt in the language being learned, answer in the learner's language.
    ForeignToNative,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::NativeToForeign => write!(f, "native-to-foreign"),
            Direction::ForeignToNative => write!(f, "foreign-to-native"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native-to-foreign" | "ntf" => Ok(Direction::NativeToForeign),
            "foreign-to-native" | "ftn" => Ok(Direction::ForeignToNative),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Study or test mode a session runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyMode {
    Learn,
    MultipleChoice,
    Write,
    Grammar,
    Mixed,
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyMode::Learn => write!(f, "learn"),
            StudyMode::MultipleChoice => write!(f, "multiple-choice"),
            StudyMode::Write => write!(f, "write"),
            StudyMode::Grammar => write!(f, "grammar"),
            StudyMode::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for StudyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "learn" => Ok(StudyMode::Learn),
            "multiple-choice" | "mc" | "choice" => Ok(StudyMode::MultipleChoice),
            "write" => Ok(StudyMode::Write),
            "grammar" => Ok(StudyMode::Grammar),
            "mixed" => Ok(StudyMode::Mixed),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// A translated example sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePair {
    pub foreign: String,
    pub native: String,
}

/// One learnable word or phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyItem {
    /// Unique identifier.
    pub id: String,
    /// Text in the language being learned.
    pub foreign: String,
    /// Text in the learner's language.
    pub native: String,
    /// Free-text category label.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub examples: Vec<ExamplePair>,
    /// Restricts the item to one direction's pool. `None` means both.
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl VocabularyItem {
    /// The text shown to the learner.
    pub fn prompt(&self, direction: Direction) -> &str {
        match direction {
            Direction::NativeToForeign => &self.native,
            Direction::ForeignToNative => &self.foreign,
        }
    }

    /// The text the learner is expected to produce.
    pub fn answer(&self, direction: Direction) -> &str {
        match direction {
            Direction::NativeToForeign => &self.foreign,
            Direction::ForeignToNative => &self.native,
        }
    }

    /// Whether this item belongs to the pool for `direction`.
    pub fn in_pool(&self, direction: Direction) -> bool {
        self.direction.map_or(true, |d| d == direction)
    }
}

/// An example attached to a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarExample {
    pub foreign: String,
    pub native: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A practice question as written inside a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleExercise {
    pub question: String,
    /// Answer options. Absent means the question is answered with free text.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// A grammar rule with its examples and exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarRule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub examples: Vec<GrammarExample>,
    #[serde(default)]
    pub exercises: Vec<RuleExercise>,
}

/// One exercise flattened out of a [`GrammarRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarExercise {
    /// Derived identifier, `"{rule_id}#{n}"` with `n` starting at 1.
    pub id: String,
    pub rule_id: String,
    pub rule_title: String,
    pub question: String,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl GrammarExercise {
    pub fn is_free_text(&self) -> bool {
        self.options.is_none()
    }
}

/// Names and speech locales of the two languages a catalog covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default = "default_deck_name")]
    pub name: String,
    #[serde(default = "default_native_language")]
    pub native_language: String,
    #[serde(default = "default_foreign_language")]
    pub foreign_language: String,
    #[serde(default = "default_native_locale")]
    pub native_locale: String,
    #[serde(default = "default_foreign_locale")]
    pub foreign_locale: String,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            name: default_deck_name(),
            native_language: default_native_language(),
            foreign_language: default_foreign_language(),
            native_locale: default_native_locale(),
            foreign_locale: default_foreign_locale(),
        }
    }
}

impl Deck {
    /// Locale of the language the answer is given in.
    pub fn answer_locale(&self, direction: Direction) -> &str {
        match direction {
            Direction::NativeToForeign => &self.foreign_locale,
            Direction::ForeignToNative => &self.native_locale,
        }
    }
}

fn default_deck_name() -> String {
    "Untitled deck".to_string()
}
fn default_native_language() -> String {
    "Nederlands".to_string()
}
fn default_foreign_language() -> String {
    "Deutsch".to_string()
}
fn default_native_locale() -> String {
    "nl-NL".to_string()
}
fn default_foreign_locale() -> String {
    "de-DE".to_string()
}

/// All reference data the app works with. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub deck: Deck,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    pub grammar: Vec<GrammarRule>,
}

impl Catalog {
    pub fn word_by_id(&self, id: &str) -> Option<&VocabularyItem> {
        self.vocabulary.iter().find(|w| w.id == id)
    }

    pub fn rule_by_id(&self, id: &str) -> Option<&GrammarRule> {
        self.grammar.iter().find(|r| r.id == id)
    }

    pub fn words_by_category(&self, category: &str) -> Vec<&VocabularyItem> {
        self.vocabulary
            .iter()
            .filter(|w| w.category == category)
            .collect()
    }

    pub fn words_by_difficulty(&self, difficulty: Difficulty) -> Vec<&VocabularyItem> {
        self.vocabulary
            .iter()
            .filter(|w| w.difficulty == difficulty)
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for word in &self.vocabulary {
            if !seen.contains(&word.category.as_str()) {
                seen.push(word.category.as_str());
            }
        }
        seen
    }

    /// Words that can be asked in `direction`, in catalog order.
    pub fn vocabulary_pool(&self, direction: Direction) -> Vec<VocabularyItem> {
        self.vocabulary
            .iter()
            .filter(|w| w.in_pool(direction))
            .cloned()
            .collect()
    }

    /// Every exercise of every rule, in catalog order.
    pub fn grammar_exercises(&self) -> Vec<GrammarExercise> {
        self.grammar
            .iter()
            .flat_map(|rule| {
                rule.exercises
                    .iter()
                    .enumerate()
                    .map(move |(n, exercise)| GrammarExercise {
                        id: format!("{}#{}", rule.id, n + 1),
                        rule_id: rule.id.clone(),
                        rule_title: rule.title.clone(),
                        question: exercise.question.clone(),
                        options: exercise.options.clone(),
                        correct_answer: exercise.correct_answer.clone(),
                        explanation: exercise.explanation.clone(),
                    })
            })
            .collect()
    }
}

/// Text to hand to a text-to-speech engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub locale: String,
}

/// A question asked in a session: either a word or a grammar exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Question {
    Vocabulary(VocabularyItem),
    Grammar(GrammarExercise),
}

impl Question {
    pub fn id(&self) -> &str {
        match self {
            Question::Vocabulary(w) => &w.id,
            Question::Grammar(e) => &e.id,
        }
    }

    pub fn prompt(&self, direction: Direction) -> &str {
        match self {
            Question::Vocabulary(w) => w.prompt(direction),
            Question::Grammar(e) => &e.question,
        }
    }

    pub fn expected_answer(&self, direction: Direction) -> &str {
        match self {
            Question::Vocabulary(w) => w.answer(direction),
            Question::Grammar(e) => &e.correct_answer,
        }
    }

    /// Explanation shown after answering, if any.
    pub fn explanation(&self) -> Option<&str> {
        match self {
            Question::Vocabulary(_) => None,
            Question::Grammar(e) if e.explanation.is_empty() => None,
            Question::Grammar(e) => Some(&e.explanation),
        }
    }

    pub fn examples(&self) -> &[ExamplePair] {
        match self {
            Question::Vocabulary(w) => &w.examples,
            Question::Grammar(_) => &[],
        }
    }

    /// Pronunciation of the answer side. Grammar exercises have none.
    pub fn speech(&self, direction: Direction, deck: &Deck) -> Option<SpeechRequest> {
        match self {
            Question::Vocabulary(w) => Some(SpeechRequest {
                text: w.answer(direction).to_string(),
                locale: deck.answer_locale(direction).to_string(),
            }),
            Question::Grammar(_) => None,
        }
    }
}

/// What a bookmark points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookmarkKind {
    Word,
    #[serde(alias = "grammar")]
    GrammarRule,
}

impl fmt::Display for BookmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkKind::Word => write!(f, "word"),
            BookmarkKind::GrammarRule => write!(f, "grammar-rule"),
        }
    }
}

impl FromStr for BookmarkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(BookmarkKind::Word),
            "grammar" | "grammar-rule" | "rule" => Ok(BookmarkKind::GrammarRule),
            other => Err(format!("unknown bookmark type: {other}")),
        }
    }
}

/// A saved reference to a word or grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bookmark {
    pub item_id: String,
    pub item_type: BookmarkKind,
}

impl Bookmark {
    pub fn new(item_id: impl Into<String>, item_type: BookmarkKind) -> Self {
        Self {
            item_id: item_id.into(),
            item_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: &str, foreign: &str, native: &str, direction: Option<Direction>) -> VocabularyItem {
        VocabularyItem {
            id: id.into(),
            foreign: foreign.into(),
            native: native.into(),
            category: "animals".into(),
            difficulty: Difficulty::Beginner,
            examples: vec![],
            direction,
        }
    }

    #[test]
    fn enums_display_and_parse() {
        assert_eq!(StudyMode::MultipleChoice.to_string(), "multiple-choice");
        assert_eq!("mc".parse::<StudyMode>().unwrap(), StudyMode::MultipleChoice);
        assert_eq!(
            "foreign-to-native".parse::<Direction>().unwrap(),
            Direction::ForeignToNative
        );
        assert_eq!("Advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!(
            "grammar".parse::<BookmarkKind>().unwrap(),
            BookmarkKind::GrammarRule
        );
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn prompt_and_answer_follow_direction() {
        let w = word("dg3", "der Hund", "de hond", None);
        assert_eq!(w.prompt(Direction::NativeToForeign), "de hond");
        assert_eq!(w.answer(Direction::NativeToForeign), "der Hund");
        assert_eq!(w.prompt(Direction::ForeignToNative), "der Hund");
        assert_eq!(w.answer(Direction::ForeignToNative), "de hond");
    }

    #[test]
    fn pool_respects_direction_tag() {
        let catalog = Catalog {
            vocabulary: vec![
                word("a", "der Affe", "aap", Some(Direction::NativeToForeign)),
                word("b", "sofort", "meteen", Some(Direction::ForeignToNative)),
                word("c", "der Hund", "de hond", None),
            ],
            ..Default::default()
        };
        let ids: Vec<_> = catalog
            .vocabulary_pool(Direction::NativeToForeign)
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn grammar_exercises_get_derived_ids() {
        let catalog = Catalog {
            grammar: vec![GrammarRule {
                id: "present-tense".into(),
                title: "Präsens".into(),
                description: String::new(),
                difficulty: Difficulty::Beginner,
                examples: vec![],
                exercises: vec![
                    RuleExercise {
                        question: "spielen, du?".into(),
                        options: Some(vec!["spiele".into(), "spielst".into()]),
                        correct_answer: "spielst".into(),
                        explanation: String::new(),
                    },
                    RuleExercise {
                        question: "reden, er?".into(),
                        options: None,
                        correct_answer: "redet".into(),
                        explanation: "extra -e-".into(),
                    },
                ],
            }],
            ..Default::default()
        };
        let exercises = catalog.grammar_exercises();
        assert_eq!(exercises.len(), 2);
        assert_eq!(exercises[0].id, "present-tense#1");
        assert_eq!(exercises[1].id, "present-tense#2");
        assert_eq!(exercises[1].rule_title, "Präsens");
        assert!(exercises[1].is_free_text());
    }

    #[test]
    fn question_serde_is_tagged() {
        let q = Question::Vocabulary(word("dg1", "der Affe", "aap", None));
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"kind\":\"vocabulary\""));
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn speech_uses_answer_locale() {
        let q = Question::Vocabulary(word("dg1", "der Affe", "aap", None));
        let speech = q
            .speech(Direction::NativeToForeign, &Deck::default())
            .unwrap();
        assert_eq!(speech.text, "der Affe");
        assert_eq!(speech.locale, "de-DE");
    }
}
