//! SHA-256 leading-ones proof-of-work challenges
//!
//! A challenge hands the client a random salt and asks for an input such that
//! the first `bits` bits of `sha256(salt + input)` are all ones. The prompt
//! format is stable so that [`Challenge::parse`] can recover a challenge from
//! text received over a socket.

use rand::Rng;
use thiserror::Error;

use maskmine_crypto::HashAlgorithm;
use maskmine_pattern::{MaskedTarget, TargetError};

use crate::api::{search_sha256, verify};
use crate::config::SearchRequest;
use crate::error::SearchError;

/// Length of the hex salt in a challenge
pub const SALT_LEN: usize = 16;

/// Answer length used by [`Challenge::solve_default`]
pub const DEFAULT_ANSWER_LEN: usize = 12;

const BITS_MARKER: &str = "The first ";
const SALT_MARKER: &str = "-bits of sha256(\"";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("not a proof-of-work challenge: {0}")]
    Malformed(&'static str),
    #[error("invalid challenge target: {0}")]
    Target(#[from] TargetError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    salt: String,
    bits: usize,
}

impl Challenge {
    pub fn new(salt: impl Into<String>, bits: usize) -> Result<Self, ChallengeError> {
        let challenge = Self {
            salt: salt.into(),
            bits,
        };
        challenge.target()?;
        Ok(challenge)
    }

    /// Fresh challenge with a random 16 hex character salt
    pub fn random(bits: usize) -> Result<Self, ChallengeError> {
        let salt: [u8; SALT_LEN / 2] = rand::thread_rng().gen();
        Self::new(hex::encode(salt), bits)
    }

    /// Recover a challenge from its prompt text
    pub fn parse(text: &str) -> Result<Self, ChallengeError> {
        let (_, rest) = text
            .split_once(BITS_MARKER)
            .ok_or(ChallengeError::Malformed("missing bit count"))?;
        let (bits, rest) = rest
            .split_once(SALT_MARKER)
            .ok_or(ChallengeError::Malformed("missing salt"))?;
        let bits = bits
            .trim()
            .parse()
            .map_err(|_| ChallengeError::Malformed("bit count is not a number"))?;

        let salt: String = rest.chars().take(SALT_LEN).collect();
        if salt.chars().count() != SALT_LEN || !rest[salt.len()..].starts_with('"') {
            return Err(ChallengeError::Malformed("salt must be 16 characters"));
        }

        Self::new(salt, bits)
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn prompt(&self) -> String {
        format!(
            "Send me proof-of-work: The first {}-bits of sha256(\"{}\" + input.rstrip) is \"111...1\"",
            self.bits, self.salt
        )
    }

    /// Leading `bits` ones over a SHA-256 digest
    pub fn target(&self) -> Result<MaskedTarget, TargetError> {
        let size = HashAlgorithm::Sha256.digest_size();
        if self.bits > size * 8 {
            return Err(TargetError::TooManyBits {
                bits: self.bits,
                max: size * 8,
            });
        }
        MaskedTarget::leading_bits(&"1".repeat(self.bits), size)
    }

    /// Check an answer. Leading and trailing whitespace and NUL bytes are
    /// ignored.
    pub fn check(&self, input: &[u8]) -> bool {
        let Ok(target) = self.target() else {
            return false;
        };
        let padding = |b: &u8| b.is_ascii_whitespace() || *b == 0;
        let start = input.iter().position(|b| !padding(b)).unwrap_or(input.len());
        let end = input
            .iter()
            .rposition(|b| !padding(b))
            .map_or(start, |i| i + 1);

        let mut data = self.salt.as_bytes().to_vec();
        data.extend_from_slice(&input[start..end]);
        verify(HashAlgorithm::Sha256, &data, &target)
    }

    /// Mine an answer of `seg_len` bytes drawn from `alphabet`
    pub fn solve(
        &self,
        seg_len: usize,
        alphabet: &[u8],
        parallel: bool,
    ) -> Result<Option<Vec<u8>>, SearchError> {
        let request = SearchRequest::new(seg_len, &self.target()?)
            .prefix(self.salt.as_bytes().to_vec())
            .alphabet(alphabet.to_vec())
            .parallel(parallel);

        Ok(search_sha256(&request)?
            .into_found()
            .map(|mut candidate| candidate.split_off(self.salt.len())))
    }

    /// [`Challenge::solve`] with a 12 byte alphanumeric answer, in parallel
    pub fn solve_default(&self) -> Result<Option<Vec<u8>>, SearchError> {
        self.solve(DEFAULT_ANSWER_LEN, crate::alphabet::DEFAULT_ALPHABET, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_roundtrip() {
        let challenge = Challenge::random(20).unwrap();
        assert_eq!(challenge.salt().len(), SALT_LEN);

        let parsed = Challenge::parse(&challenge.prompt()).unwrap();
        assert_eq!(parsed, challenge);
    }

    #[test]
    fn test_parse_embedded_prompt() {
        let text = "hello\nSend me proof-of-work: The first 8-bits of sha256(\"0123456789abcdef\" + input.rstrip) is \"111...1\"\n";
        let challenge = Challenge::parse(text).unwrap();
        assert_eq!(challenge.bits(), 8);
        assert_eq!(challenge.salt(), "0123456789abcdef");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Challenge::parse("nothing here"),
            Err(ChallengeError::Malformed("missing bit count"))
        );
        assert_eq!(
            Challenge::parse("The first x-bits of sha256(\"0123456789abcdef\""),
            Err(ChallengeError::Malformed("bit count is not a number"))
        );
        assert_eq!(
            Challenge::parse("The first 8-bits of sha256(\"short\" + input)"),
            Err(ChallengeError::Malformed("salt must be 16 characters"))
        );
        assert!(matches!(
            Challenge::parse("The first 300-bits of sha256(\"0123456789abcdef\""),
            Err(ChallengeError::Target(TargetError::TooManyBits { bits: 300, max: 256 }))
        ));
        assert!(matches!(
            Challenge::parse("The first 18446744073709551615-bits of sha256(\"0123456789abcdef\""),
            Err(ChallengeError::Target(TargetError::TooManyBits { max: 256, .. }))
        ));
        assert!(matches!(
            Challenge::new("0123456789abcdef", usize::MAX),
            Err(ChallengeError::Target(TargetError::TooManyBits { bits: usize::MAX, .. }))
        ));
    }

    #[test]
    fn test_solve_and_check() {
        let challenge = Challenge::new("fedcba9876543210", 10).unwrap();
        let answer = challenge.solve(5, b"0123456789", false).unwrap().unwrap();

        assert_eq!(answer.len(), 5);
        assert!(challenge.check(&answer));

        let mut padded = b" \t".to_vec();
        padded.extend_from_slice(&answer);
        padded.extend_from_slice(b" \r\n\0");
        assert!(challenge.check(&padded));
    }

    #[test]
    fn test_check_rejects_wrong_answer() {
        let challenge = Challenge::new("0000000000000000", 1).unwrap();
        // Find an input whose digest starts with a zero bit
        let wrong = (b'a'..=b'z')
            .map(|c| vec![c])
            .find(|input| {
                let mut data = challenge.salt().as_bytes().to_vec();
                data.extend_from_slice(input);
                HashAlgorithm::Sha256.digest(&data)[0] & 0x80 == 0
            })
            .unwrap();

        assert!(!challenge.check(&wrong));
    }

    #[test]
    fn test_zero_bit_challenge_accepts_anything() {
        let challenge = Challenge::new("abcdefabcdefabcd", 0).unwrap();
        assert!(challenge.check(b"anything"));
        assert!(challenge.check(b""));
    }
}
