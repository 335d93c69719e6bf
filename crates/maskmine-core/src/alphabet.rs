//! Candidate alphabet

use std::fmt;

use crate::error::ArgumentError;

/// Default alphabet: ASCII letters then digits
pub const DEFAULT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Ordered, non-empty set of bytes used to fill the variable segment.
///
/// Enumeration visits symbols in the order given here. Duplicates are kept:
/// they only make the search revisit candidates.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Box<[u8]>,
}

impl Alphabet {
    pub fn new(symbols: impl Into<Vec<u8>>) -> Result<Self, ArgumentError> {
        let symbols = symbols.into();
        if symbols.is_empty() {
            return Err(ArgumentError::EmptyAlphabet);
        }
        Ok(Self {
            symbols: symbols.into_boxed_slice(),
        })
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false: construction rejects empty alphabets
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Lowest-index symbol
    pub fn first(&self) -> u8 {
        self.symbols[0]
    }

    pub fn has_duplicates(&self) -> bool {
        let mut seen = [false; 256];
        self.symbols
            .iter()
            .any(|&b| std::mem::replace(&mut seen[b as usize], true))
    }

    /// Number of distinct candidates for a segment of `seg_len` symbols,
    /// saturating at `u128::MAX`.
    pub fn search_space(&self, seg_len: usize) -> u128 {
        let base = self.symbols.len() as u128;
        (0..seg_len).try_fold(1u128, |acc, _| acc.checked_mul(base))
            .unwrap_or(u128::MAX)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.into(),
        }
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alphabet({:?})", String::from_utf8_lossy(&self.symbols))
    }
}
