//! Search-key normalization for steelref.
//!
//! Every search key and every query passes through the same pipeline so that
//! lookups are insensitive to case, accents, and the punctuation habits of
//! steel naming:
//!
//! 1. NFKD Unicode decomposition
//! 2. Per-character case folding
//! 3. A second NFKD pass, catching decomposable characters the fold produced
//! 4. Combining-mark removal (U+0300–U+036F), so "Böhler" matches "bohler"
//! 5. Hyphen/period folding, so "vg10" matches "VG-10" and "cpm154"
//!    matches "CPM-154"
//!
//! The pipeline is idempotent: normalizing an already-normalized string is a
//! no-op. Whitespace is preserved, since the token-overlap scoring rule
//! splits on it.

use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks block dropped after decomposition.
const fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}')
}

/// Punctuation folded out of keys and queries. Steel names use hyphens and
/// periods ("VG-10", "CPM-154", "N.695") while users typing a query often
/// omit them.
const fn is_folded_punctuation(c: char) -> bool {
    matches!(c, '-' | '.')
}

/// Normalize a key or query for fuzzy matching.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c) && !is_folded_punctuation(*c))
        .collect()
}
