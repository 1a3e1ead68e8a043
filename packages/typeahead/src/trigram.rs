//! Compact trigram keys over the normalized alphabet.
//!
//! Normalized text only contains `[a-z0-9 ]`, 37 symbols, so every
//! trigram fits into a `u16` (37³ = 50 653 distinct keys).

use std::fmt;

/// Number of symbols in the normalized alphabet.
const ALPHABET_SIZE: u16 = 37;

/// A trigram of normalized text, packed into a `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trigram(u16);

impl Trigram {
    /// Number of distinct trigram keys.
    pub const KEY_SPACE: usize = (ALPHABET_SIZE as usize).pow(3);

    /// Packs three normalized bytes. Returns `None` if any byte lies
    /// outside `[a-z0-9 ]`.
    #[must_use]
    pub fn from_bytes(a: u8, b: u8, c: u8) -> Option<Self> {
        let key = (symbol(a)? * ALPHABET_SIZE + symbol(b)?) * ALPHABET_SIZE + symbol(c)?;
        Some(Self(key))
    }

    /// The packed key.
    #[must_use]
    pub const fn key(self) -> u16 {
        self.0
    }

    /// Unpacks the three bytes of the trigram.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 3] {
        let c = self.0 % ALPHABET_SIZE;
        let rest = self.0 / ALPHABET_SIZE;
        [
            byte(rest / ALPHABET_SIZE),
            byte(rest % ALPHABET_SIZE),
            byte(c),
        ]
    }
}

impl fmt::Display for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

fn symbol(b: u8) -> Option<u16> {
    match b {
        b' ' => Some(0),
        b'0'..=b'9' => Some(u16::from(b - b'0') + 1),
        b'a'..=b'z' => Some(u16::from(b - b'a') + 11),
        _ => None,
    }
}

fn byte(symbol: u16) -> u8 {
    // symbol < ALPHABET_SIZE, so the narrowing below never truncates
    #[allow(clippy::cast_possible_truncation)]
    let s = symbol as u8;
    match s {
        0 => b' ',
        1..=10 => b'0' + (s - 1),
        _ => b'a' + (s - 11),
    }
}

/// Iterates every trigram of a normalized string, in order, duplicates
/// included. Strings shorter than three bytes yield nothing.
pub fn trigrams(normalized: &str) -> impl Iterator<Item = Trigram> + '_ {
    normalized
        .as_bytes()
        .windows(3)
        .filter_map(|w| Trigram::from_bytes(w[0], w[1], w[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_fit_the_key_space() {
        let max = Trigram::from_bytes(b'z', b'z', b'z').unwrap();
        assert_eq!(usize::from(max.key()), Trigram::KEY_SPACE - 1);
        let min = Trigram::from_bytes(b' ', b' ', b' ').unwrap();
        assert_eq!(min.key(), 0);
    }

    #[test]
    fn bytes_survive_packing() {
        for word in [*b"abc", *b"z 9", *b"0 a", *b"str"] {
            let t = Trigram::from_bytes(word[0], word[1], word[2]).unwrap();
            assert_eq!(t.to_bytes(), word);
        }
        let t = Trigram::from_bytes(b'h', b'o', b'c').unwrap();
        assert_eq!(t.to_string(), "hoc");
    }

    #[test]
    fn rejects_bytes_outside_alphabet() {
        assert!(Trigram::from_bytes(b'A', b'b', b'c').is_none());
        assert!(Trigram::from_bytes(b'a', b'-', b'c').is_none());
    }

    #[test]
    fn distinct_trigrams_get_distinct_keys() {
        let a = Trigram::from_bytes(b'a', b'b', b'c').unwrap();
        let b = Trigram::from_bytes(b'c', b'b', b'a').unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn iterates_sliding_windows() {
        let all: Vec<String> = trigrams("lehe").map(|t| t.to_string()).collect();
        assert_eq!(all, vec!["leh", "ehe"]);
        assert_eq!(trigrams("ab").count(), 0);
        assert_eq!(trigrams("").count(), 0);
        assert_eq!(trigrams("aaaa").count(), 2);
    }
}
