//! Question selection and multiple-choice option generation.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Direction, VocabularyItem};

/// Take up to `count` items from `pool`.
///
/// With `shuffle` the items are the first `count` of a uniformly random
/// permutation; without it they are the first `count` in pool order. A pool
/// smaller than `count` yields every item.
pub fn select_questions<T, R>(pool: &[T], count: usize, shuffle: bool, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if !shuffle {
        return pool.iter().take(count).cloned().collect();
    }
    let mut drawn = pool.to_vec();
    drawn.shuffle(rng);
    drawn.truncate(count);
    drawn
}

/// Build the answer options for a multiple-choice question about `correct`.
///
/// Draws `option_count - 1` other items from the part of `pool` that belongs
/// to `direction`, adds the correct translation and shuffles. Fewer items in
/// the pool means fewer options. Duplicate translations in the pool are not
/// filtered out.
pub fn generate_distractors<R>(
    correct: &VocabularyItem,
    pool: &[VocabularyItem],
    option_count: usize,
    direction: Direction,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    if option_count == 0 {
        return Vec::new();
    }

    let candidates: Vec<&VocabularyItem> = pool
        .iter()
        .filter(|w| w.id != correct.id && w.in_pool(direction))
        .collect();

    let mut options = Vec::with_capacity(option_count);
    options.push(correct.answer(direction).to_string());
    options.extend(
        candidates
            .choose_multiple(rng, option_count - 1)
            .map(|w| w.answer(direction).to_string()),
    );
    options.shuffle(rng);
    options
}
