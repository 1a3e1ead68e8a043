//! Text normalization for the trigram indices.
//!
//! Provides a deterministic normalization pipeline applied symmetrically
//! at index time and query time. Trigram comparison is only meaningful
//! when both sides went through exactly this function, so that
//! "Hochschulstraße" and "hochschulstrasse" produce the same form.

use std::sync::LazyLock;

use regex::Regex;

/// Regex matching every run of characters outside `[0-9A-Za-z]`,
/// punctuation and whitespace included.
static OUTSIDE_ALPHABET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z]+").expect("valid regex"));

/// Normalizes a candidate or query string.
///
/// The pipeline:
/// 1. Fold accented letters to ASCII (`è`/`é`→`e`, `ä`→`a`, `ö`→`o`,
///    `ü`→`u`, `ß`→`ss`)
/// 2. Replace punctuation (`-`, `/`, `.`, `(`, `)`) and every other
///    character outside `[0-9A-Za-z]` with a space
/// 3. Collapse each run of spaces to a single space and trim
/// 4. Lowercase
///
/// The output only contains `[a-z0-9 ]`, never two consecutive spaces,
/// and the function is idempotent.
#[must_use]
pub fn normalize(input: &str) -> String {
    let folded = fold_accents(input);
    let spaced = OUTSIDE_ALPHABET_RE.replace_all(&folded, " ");
    spaced.trim().to_ascii_lowercase()
}

/// Folds the known accented and composed characters to ASCII. All other
/// characters pass through unchanged.
fn fold_accents(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            'è' | 'é' => out.push('e'),
            'ä' | 'Ä' => out.push('a'),
            'ö' | 'Ö' => out.push('o'),
            'ü' | 'Ü' => out.push('u'),
            'ß' => out.push_str("ss"),
            _ => out.push(c),
        }
    }
    out
}
