//! Plain substring search over the catalog.

use crate::model::{Catalog, GrammarRule, VocabularyItem};

/// Everything in the catalog that matches a search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults<'a> {
    pub words: Vec<&'a VocabularyItem>,
    pub rules: Vec<&'a GrammarRule>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len() + self.rules.len()
    }
}

/// Case-insensitive substring match of `term` against both sides of every
/// word and the title and description of every grammar rule. A blank term
/// matches nothing.
pub fn search<'a>(catalog: &'a Catalog, term: &str) -> SearchResults<'a> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResults::default();
    }

    let hit = |text: &str| text.to_lowercase().contains(&needle);

    SearchResults {
        words: catalog
            .vocabulary
            .iter()
            .filter(|w| hit(&w.foreign) || hit(&w.native))
            .collect(),
        rules: catalog
            .grammar
            .iter()
            .filter(|r| hit(&r.title) || hit(&r.description))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::word;

    fn catalog() -> Catalog {
        Catalog {
            vocabulary: vec![
                word("hund", "der Hund", "de hond"),
                word("katze", "die Katze", "de kat"),
                word("haus", "das Haus", "het huis"),
            ],
            grammar: vec![GrammarRule {
                id: "artikel".into(),
                title: "Lidwoorden".into(),
                description: "Der, die en das".into(),
                difficulty: Default::default(),
                examples: vec![],
                exercises: vec![],
            }],
            ..Catalog::default()
        }
    }

    #[test]
    fn matches_either_side_case_insensitively() {
        let catalog = catalog();
        let results = search(&catalog, "HOND");
        assert_eq!(results.words.len(), 1);
        assert_eq!(results.words[0].id, "hund");

        let results = search(&catalog, "katze");
        assert_eq!(results.words[0].id, "katze");
    }

    #[test]
    fn matches_rules_by_description() {
        let catalog = catalog();
        let results = search(&catalog, "die");
        assert_eq!(results.words.len(), 1);
        assert_eq!(results.rules.len(), 1);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn blank_term_matches_nothing() {
        let catalog = catalog();
        assert!(search(&catalog, "   ").is_empty());
    }

    #[test]
    fn term_is_trimmed() {
        let catalog = catalog();
        assert_eq!(search(&catalog, "  huis ").words.len(), 1);
    }
}
