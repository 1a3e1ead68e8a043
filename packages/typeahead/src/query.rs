//! Splits raw query tokens into postal codes and guess strings.

use address_typeahead_models::CompleteOptions;

use crate::guesser::MIN_TRIGRAM_LEN;
use crate::normalize::normalize;

/// Lower bound of the weight a guess string contributes.
const MIN_GUESS_WEIGHT: f64 = 0.6;

/// One string that is matched against the trigram indices.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessString {
    /// Normalized text, at least three characters long.
    pub text: String,
    /// Whether the string is the first textual token on its own.
    pub from_first_token: bool,
    /// Contribution of this string relative to the longest one, in
    /// `[0.6, 1.0]`.
    pub weight: f64,
}

/// A query split into its parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedQuery {
    /// Parsed postal codes, in query order, each listed once.
    pub postcodes: Vec<u32>,
    /// Strings to look up in the trigram indices.
    pub guesses: Vec<GuessString>,
}

impl PreparedQuery {
    /// Partitions `tokens` and synthesizes chained strings.
    ///
    /// A token that starts with digits and parses to a nonzero value is a
    /// postal code. Every other token is textual. Textual tokens shorter
    /// than three normalized characters are not looked up on their own
    /// but still take part in chained strings.
    #[must_use]
    pub fn prepare<S: AsRef<str>>(tokens: &[S], options: &CompleteOptions) -> Self {
        let mut postcodes = Vec::new();
        let mut textual: Vec<&str> = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            match parse_postcode(token) {
                Some(code) => {
                    if !postcodes.contains(&code) {
                        postcodes.push(code);
                    }
                }
                None => textual.push(token),
            }
        }

        let mut guesses: Vec<(String, bool)> = textual
            .iter()
            .enumerate()
            .filter_map(|(i, token)| {
                let text = normalize(token);
                (text.len() >= MIN_TRIGRAM_LEN).then_some((text, i == 0))
            })
            .collect();

        let chain = options.chain_length.max(1);
        if chain > 1 {
            let start = usize::from(options.first_token_is_place_name);
            let mut i = start;
            while i + 1 < textual.len() {
                let end = (i + chain).min(textual.len());
                let text = normalize(&textual[i..end].join(" "));
                if text.len() >= MIN_TRIGRAM_LEN {
                    guesses.push((text, false));
                }
                i += 1;
            }
        }

        let longest = guesses.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
        let guesses = guesses
            .into_iter()
            .map(|(text, from_first_token)| GuessString {
                weight: guess_weight(text.len(), longest),
                text,
                from_first_token,
            })
            .collect();

        Self { postcodes, guesses }
    }
}

/// Parses the leading decimal digits of a token.
///
/// Returns `None` when the token does not start with a digit or the
/// digits evaluate to zero. Values beyond `u32::MAX` saturate.
#[must_use]
pub fn parse_postcode(token: &str) -> Option<u32> {
    let value = token
        .trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_u32, |acc, d| {
            acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
        });
    (value != 0).then_some(value)
}

#[allow(clippy::cast_precision_loss)]
fn guess_weight(len: usize, longest: usize) -> f64 {
    if longest == 0 {
        return 1.0;
    }
    (len as f64 / longest as f64).max(MIN_GUESS_WEIGHT)
}
