//! Free-text answer comparison.
//!
//! Every free-text question in every mode is graded here, under the three
//! leniency flags of the session's settings snapshot.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Characters removed when punctuation is not checked.
pub const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// How strictly a typed answer is compared with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeniencyFlags {
    pub check_accents: bool,
    pub check_capitalization: bool,
    pub check_punctuation: bool,
}

impl LeniencyFlags {
    /// Every check enabled: answers must match byte for byte.
    pub const STRICT: LeniencyFlags = LeniencyFlags {
        check_accents: true,
        check_capitalization: true,
        check_punctuation: true,
    };

    pub fn is_strict(&self) -> bool {
        self.check_accents && self.check_capitalization && self.check_punctuation
    }
}

impl Default for LeniencyFlags {
    fn default() -> Self {
        Self::STRICT
    }
}

/// Decide whether `user_input` counts as `expected`.
///
/// With every flag set the comparison is exact: no trimming, no case folding.
/// Otherwise both sides go through [`fold`] first, which always trims and
/// lowercases. `check_capitalization` therefore only has an effect in the
/// strict case; a lenient comparison is case-insensitive even when it is set.
pub fn is_match(user_input: &str, expected: &str, flags: LeniencyFlags) -> bool {
    if flags.is_strict() {
        return user_input == expected;
    }
    fold(user_input, flags) == fold(expected, flags)
}

/// The lenient comparison form of `text`.
pub fn fold(text: &str, flags: LeniencyFlags) -> String {
    let mut folded = text.to_lowercase().trim().to_string();

    if !flags.check_accents {
        folded = strip_diacritics(&folded);
    }

    // Already lowercase at this point; kept so the flag reads the same in both paths.
    if !flags.check_capitalization {
        folded = folded.to_lowercase();
    }

    if !flags.check_punctuation {
        folded.retain(|c| !PUNCTUATION.contains(&c));
    }

    folded
}

/// Decompose to NFD and drop the combining diacritical marks block (U+0300..U+036F).
pub fn strip_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}
