//! Turning a catalog into a ready-to-start [`Session`].

use std::collections::HashSet;

use rand::Rng;

use crate::model::{Catalog, Direction, Question, StudyMode, VocabularyItem};
use crate::session::{Session, SessionQuestion, SessionSettings};
use crate::supplier;
use crate::timer::TestKind;

/// Assembles a session: draws the questions, fixes their answer format and
/// precomputes choice options so a restored session shows the same options.
pub struct SessionBuilder<'a> {
    catalog: &'a Catalog,
    mode: StudyMode,
    direction: Direction,
    count: usize,
    settings: SessionSettings,
    option_count: usize,
    test_kind: Option<TestKind>,
}

impl<'a> SessionBuilder<'a> {
    pub fn new(catalog: &'a Catalog, mode: StudyMode) -> Self {
        Self {
            catalog,
            mode,
            direction: Direction::default(),
            count: 10,
            settings: SessionSettings::default(),
            option_count: 4,
            test_kind: None,
        }
    }

    /// A test of the given kind, timed by the kind's per-question allowance
    /// unless the timer is disabled in the settings.
    pub fn for_test(catalog: &'a Catalog, kind: TestKind) -> Self {
        Self {
            test_kind: Some(kind),
            ..Self::new(catalog, kind.mode())
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn option_count(mut self, option_count: usize) -> Self {
        self.option_count = option_count;
        self
    }

    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Session {
        let shuffle = self.settings.randomize_order;
        let vocabulary = dedup_by_id(self.catalog.vocabulary_pool(self.direction), |w| {
            w.id.as_str()
        });

        let questions: Vec<SessionQuestion> = match self.mode {
            StudyMode::Learn | StudyMode::MultipleChoice | StudyMode::Write => {
                supplier::select_questions(&vocabulary, self.count, shuffle, rng)
                    .into_iter()
                    .map(|word| self.vocabulary_question(word, &vocabulary, rng))
                    .collect()
            }
            StudyMode::Grammar => {
                let exercises = dedup_by_id(self.catalog.grammar_exercises(), |e| e.id.as_str());
                supplier::select_questions(&exercises, self.count, shuffle, rng)
                    .into_iter()
                    .map(|e| grammar_question(Question::Grammar(e)))
                    .collect()
            }
            StudyMode::Mixed => {
                let pool: Vec<Question> = vocabulary
                    .iter()
                    .cloned()
                    .map(Question::Vocabulary)
                    .chain(
                        self.catalog
                            .grammar_exercises()
                            .into_iter()
                            .map(Question::Grammar),
                    )
                    .collect();
                let pool = dedup_by_id(pool, Question::id);
                supplier::select_questions(&pool, self.count, shuffle, rng)
                    .into_iter()
                    .map(|question| match question {
                        Question::Vocabulary(word) => {
                            self.choice_question(word, &vocabulary, rng)
                        }
                        grammar => grammar_question(grammar),
                    })
                    .collect()
            }
        };

        let time_limit = match (self.settings.timer_enabled, self.test_kind) {
            (true, Some(kind)) => Some(kind.time_limit(questions.len())),
            _ => None,
        };

        tracing::debug!(
            "built {} session: {} of {} requested questions, time limit {:?}",
            self.mode,
            questions.len(),
            self.count,
            time_limit
        );

        Session::new(self.mode, self.direction, questions, self.settings, time_limit)
    }

    fn vocabulary_question<R: Rng + ?Sized>(
        &self,
        word: VocabularyItem,
        pool: &[VocabularyItem],
        rng: &mut R,
    ) -> SessionQuestion {
        match self.mode {
            StudyMode::MultipleChoice => self.choice_question(word, pool, rng),
            StudyMode::Learn => {
                // Free-text step, with options for the unscored practice round.
                let options = supplier::generate_distractors(
                    &word,
                    pool,
                    self.option_count,
                    self.direction,
                    rng,
                );
                let mut question = SessionQuestion::free_text(Question::Vocabulary(word));
                question.options = options;
                question
            }
            _ => SessionQuestion::free_text(Question::Vocabulary(word)),
        }
    }

    fn choice_question<R: Rng + ?Sized>(
        &self,
        word: VocabularyItem,
        pool: &[VocabularyItem],
        rng: &mut R,
    ) -> SessionQuestion {
        let options =
            supplier::generate_distractors(&word, pool, self.option_count, self.direction, rng);
        SessionQuestion::choice(Question::Vocabulary(word), options)
    }
}

fn grammar_question(question: Question) -> SessionQuestion {
    let options = match &question {
        Question::Grammar(exercise) => exercise.options.clone().filter(|o| !o.is_empty()),
        Question::Vocabulary(_) => None,
    };
    match options {
        Some(options) => SessionQuestion::choice(question, options),
        None => SessionQuestion::free_text(question),
    }
}

/// Keep the first item for every id.
fn dedup_by_id<T>(pool: Vec<T>, id: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    pool.into_iter()
        .filter(|item| seen.insert(id(item).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GrammarRule, RuleExercise};
    use crate::session::AnswerFormat;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn word(id: &str, foreign: &str, native: &str) -> VocabularyItem {
        VocabularyItem {
            id: id.into(),
            foreign: foreign.into(),
            native: native.into(),
            category: "dieren".into(),
            difficulty: Default::default(),
            examples: vec![],
            direction: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            vocabulary: vec![
                word("w1", "der Hund", "de hond"),
                word("w2", "die Katze", "de kat"),
                word("w3", "das Pferd", "het paard"),
                word("w4", "die Kuh", "de koe"),
                word("w5", "der Vogel", "de vogel"),
            ],
            grammar: vec![GrammarRule {
                id: "sein".into(),
                title: "Het werkwoord sein".into(),
                description: String::new(),
                difficulty: Default::default(),
                examples: vec![],
                exercises: vec![
                    RuleExercise {
                        question: "Ich ___ müde.".into(),
                        options: Some(vec!["bin".into(), "bist".into(), "ist".into()]),
                        correct_answer: "bin".into(),
                        explanation: "ich bin".into(),
                    },
                    RuleExercise {
                        question: "Wir ___ hier.".into(),
                        options: None,
                        correct_answer: "sind".into(),
                        explanation: "wir sind".into(),
                    },
                ],
            }],
            ..Catalog::default()
        }
    }

    fn ordered() -> SessionSettings {
        SessionSettings {
            randomize_order: false,
            ..SessionSettings::default()
        }
    }

    #[test]
    fn multiple_choice_questions_carry_options() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let session = SessionBuilder::new(&catalog, StudyMode::MultipleChoice)
            .count(3)
            .settings(ordered())
            .build(&mut rng);

        assert_eq!(session.len(), 3);
        for q in session.questions() {
            assert_eq!(q.format, AnswerFormat::Choice);
            assert_eq!(q.options.len(), 4);
            let expected = q.question.expected_answer(Direction::NativeToForeign);
            assert_eq!(q.options.iter().filter(|o| *o == expected).count(), 1);
        }
        assert_eq!(session.questions()[0].id(), "w1");
    }

    #[test]
    fn write_is_free_text() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let session = SessionBuilder::new(&catalog, StudyMode::Write)
            .count(10)
            .build(&mut rng);
        assert_eq!(session.len(), 5);
        assert!(session
            .questions()
            .iter()
            .all(|q| q.format == AnswerFormat::FreeText && q.options.is_empty()));
    }

    #[test]
    fn learn_keeps_practice_options() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let session = SessionBuilder::new(&catalog, StudyMode::Learn)
            .count(2)
            .option_count(3)
            .build(&mut rng);
        for q in session.questions() {
            assert_eq!(q.format, AnswerFormat::FreeText);
            assert_eq!(q.options.len(), 3);
        }
    }

    #[test]
    fn grammar_format_follows_options() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let session = SessionBuilder::new(&catalog, StudyMode::Grammar)
            .settings(ordered())
            .build(&mut rng);
        assert_eq!(session.len(), 2);
        assert_eq!(session.questions()[0].format, AnswerFormat::Choice);
        assert_eq!(session.questions()[0].id(), "sein#1");
        assert_eq!(session.questions()[1].format, AnswerFormat::FreeText);
    }

    #[test]
    fn mixed_draws_from_both_pools() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let session = SessionBuilder::new(&catalog, StudyMode::Mixed)
            .count(100)
            .build(&mut rng);
        assert_eq!(session.len(), 7);
        let grammar = session
            .questions()
            .iter()
            .filter(|q| matches!(q.question, Question::Grammar(_)))
            .count();
        assert_eq!(grammar, 2);
        assert!(session
            .questions()
            .iter()
            .filter(|q| matches!(q.question, Question::Vocabulary(_)))
            .all(|q| q.format == AnswerFormat::Choice));
    }

    #[test]
    fn test_time_limit_uses_drawn_count() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let session = SessionBuilder::for_test(&catalog, TestKind::VocabularyChoice)
            .count(3)
            .build(&mut rng);
        assert_eq!(session.mode(), StudyMode::MultipleChoice);
        assert_eq!(session.remaining_time_secs(), Some(60));

        let session = SessionBuilder::for_test(&catalog, TestKind::Grammar)
            .count(15)
            .build(&mut rng);
        assert_eq!(session.remaining_time_secs(), Some(90));
    }

    #[test]
    fn disabled_timer_means_untimed() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let settings = SessionSettings {
            timer_enabled: false,
            ..SessionSettings::default()
        };
        let session = SessionBuilder::for_test(&catalog, TestKind::VocabularyWrite)
            .settings(settings)
            .build(&mut rng);
        assert_eq!(session.remaining_time_secs(), None);
    }

    #[test]
    fn duplicate_ids_are_dropped() {
        let mut catalog = catalog();
        catalog.vocabulary.push(word("w1", "der Hund", "de hond"));
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let session = SessionBuilder::new(&catalog, StudyMode::Write)
            .count(50)
            .build(&mut rng);
        assert_eq!(session.len(), 5);
    }

    #[test]
    fn duplicate_rule_ids_keep_the_first_rule() {
        let mut catalog = catalog();
        let mut twin = catalog.grammar[0].clone();
        twin.title = "Nog een keer sein".into();
        twin.exercises.truncate(1);
        twin.exercises[0].correct_answer = "bist".into();
        catalog.grammar.push(twin);

        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut session = SessionBuilder::new(&catalog, StudyMode::Grammar)
            .settings(ordered())
            .count(10)
            .build(&mut rng);
        let ids: Vec<&str> = session.questions().iter().map(|q| q.id()).collect();
        assert_eq!(ids, vec!["sein#1", "sein#2"]);
        assert_eq!(
            session.questions()[0].question.expected_answer(Direction::NativeToForeign),
            "bin"
        );

        session.start();
        session.record_answer("bin");
        session.settle();
        session.record_answer("bin");
        assert!(session.is_completed());
        assert_eq!(session.answered_count(), session.current_index());
        assert!(session.correct_ids().is_disjoint(session.wrong_ids()));
        assert!(session.validate().is_ok());

        let mixed = SessionBuilder::new(&catalog, StudyMode::Mixed)
            .count(100)
            .build(&mut rng);
        assert_eq!(mixed.len(), 7);
        assert!(mixed.validate().is_ok());
    }

    #[test]
    fn direction_filters_pool() {
        let mut catalog = catalog();
        catalog.vocabulary[0].direction = Some(Direction::ForeignToNative);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let session = SessionBuilder::new(&catalog, StudyMode::Write)
            .direction(Direction::NativeToForeign)
            .count(50)
            .build(&mut rng);
        assert_eq!(session.len(), 4);
        assert!(session.questions().iter().all(|q| q.id() != "w1"));
    }
}
