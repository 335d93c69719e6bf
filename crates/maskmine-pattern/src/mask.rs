//! Masked digest targets

use serde::{Deserialize, Serialize};
use thiserror::Error;

const WORD: usize = std::mem::size_of::<usize>();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("Target is {target} bytes but mask is {mask} bytes")]
    LengthMismatch { target: usize, mask: usize },
    #[error("Bit pattern has {bits} bits but the digest only has {max}")]
    TooManyBits { bits: usize, max: usize },
    #[error("Byte pattern has {bytes} bytes but the digest only has {max}")]
    TooManyBytes { bytes: usize, max: usize },
    #[error("Bit pattern contains invalid character '{0}' (valid: 0, 1)")]
    InvalidBit(char),
}

/// A digest target together with the mask selecting which bits must match.
///
/// A digest `d` satisfies the target when `d AND mask == target`. The target
/// is compared as given, so bits set in the target but clear in the mask can
/// never be satisfied (see [`MaskedTarget::has_stray_bits`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedTarget {
    target: Vec<u8>,
    mask: Vec<u8>,
}

impl MaskedTarget {
    /// Create a target from explicit target and mask bytes of equal length
    pub fn new(target: impl Into<Vec<u8>>, mask: impl Into<Vec<u8>>) -> Result<Self, TargetError> {
        let target = target.into();
        let mask = mask.into();
        if target.len() != mask.len() {
            return Err(TargetError::LengthMismatch {
                target: target.len(),
                mask: mask.len(),
            });
        }
        Ok(Self { target, mask })
    }

    /// Exact digest equality (all-ones mask)
    pub fn exact(digest: impl Into<Vec<u8>>) -> Self {
        let target = digest.into();
        let mask = vec![0xff; target.len()];
        Self { target, mask }
    }

    /// Require the first bits of the digest to equal `bits`, a string of
    /// `'0'`/`'1'` read most-significant bit first.
    pub fn leading_bits(bits: &str, digest_size: usize) -> Result<Self, TargetError> {
        let pattern = parse_bits(bits, digest_size)?;
        let mut target = vec![0u8; digest_size];
        let mut mask = vec![0u8; digest_size];

        for (i, bit) in pattern.into_iter().enumerate() {
            let shift = 7 - (i % 8);
            mask[i / 8] |= 1 << shift;
            target[i / 8] |= (bit as u8) << shift;
        }

        Ok(Self { target, mask })
    }

    /// Require the last bits of the digest to equal `bits`, read in the same
    /// order they appear in the digest (the final character is the digest's
    /// least significant bit).
    pub fn trailing_bits(bits: &str, digest_size: usize) -> Result<Self, TargetError> {
        let pattern = parse_bits(bits, digest_size)?;
        let mut target = vec![0u8; digest_size];
        let mut mask = vec![0u8; digest_size];

        for (i, bit) in pattern.into_iter().rev().enumerate() {
            let byte = digest_size - 1 - i / 8;
            let shift = i % 8;
            mask[byte] |= 1 << shift;
            target[byte] |= (bit as u8) << shift;
        }

        Ok(Self { target, mask })
    }

    /// Require the digest to start with `bytes`
    pub fn leading_bytes(bytes: &[u8], digest_size: usize) -> Result<Self, TargetError> {
        check_byte_len(bytes, digest_size)?;
        let mut target = vec![0u8; digest_size];
        let mut mask = vec![0u8; digest_size];
        target[..bytes.len()].copy_from_slice(bytes);
        mask[..bytes.len()].fill(0xff);
        Ok(Self { target, mask })
    }

    /// Require the digest to end with `bytes`
    pub fn trailing_bytes(bytes: &[u8], digest_size: usize) -> Result<Self, TargetError> {
        check_byte_len(bytes, digest_size)?;
        let start = digest_size - bytes.len();
        let mut target = vec![0u8; digest_size];
        let mut mask = vec![0u8; digest_size];
        target[start..].copy_from_slice(bytes);
        mask[start..].fill(0xff);
        Ok(Self { target, mask })
    }

    /// Digest length this target applies to
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn target(&self) -> &[u8] {
        &self.target
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Number of constrained bits
    pub fn mask_bits(&self) -> u32 {
        self.mask.iter().map(|b| b.count_ones()).sum()
    }

    /// True when the target sets bits the mask clears; such a target is
    /// unsatisfiable.
    pub fn has_stray_bits(&self) -> bool {
        self.target
            .iter()
            .zip(&self.mask)
            .any(|(t, m)| t & !m != 0)
    }

    /// Mask `digest` in place and compare it with the target.
    ///
    /// `digest` is scratch space: its contents are clobbered.
    #[inline]
    pub fn matches_in_place(&self, digest: &mut [u8]) -> bool {
        if digest.len() != self.mask.len() {
            return false;
        }
        apply_mask(digest, &self.mask);
        *digest == *self.target
    }

    /// Non-destructive check of an unmasked digest
    pub fn is_satisfied_by(&self, digest: &[u8]) -> bool {
        digest.len() == self.mask.len()
            && digest
                .iter()
                .zip(&self.mask)
                .zip(&self.target)
                .all(|((d, m), t)| d & m == *t)
    }
}

/// AND `mask` into `digest` one machine word at a time, finishing any
/// trailing bytes that do not fill a word one byte at a time.
///
/// Both slices must have the same length.
#[inline]
pub fn apply_mask(digest: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(digest.len(), mask.len());

    let mut digest_words = digest.chunks_exact_mut(WORD);
    let mut mask_words = mask.chunks_exact(WORD);

    for (d, m) in (&mut digest_words).zip(&mut mask_words) {
        let masked = load_word(d) & load_word(m);
        d.copy_from_slice(&masked.to_ne_bytes());
    }

    for (d, m) in digest_words
        .into_remainder()
        .iter_mut()
        .zip(mask_words.remainder())
    {
        *d &= *m;
    }
}

#[inline(always)]
fn load_word(bytes: &[u8]) -> usize {
    let mut word = [0u8; WORD];
    word.copy_from_slice(bytes);
    usize::from_ne_bytes(word)
}

fn parse_bits(bits: &str, digest_size: usize) -> Result<Vec<bool>, TargetError> {
    let max = digest_size * 8;
    let count = bits.chars().count();
    if count > max {
        return Err(TargetError::TooManyBits { bits: count, max });
    }

    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(TargetError::InvalidBit(other)),
        })
        .collect()
}

fn check_byte_len(bytes: &[u8], digest_size: usize) -> Result<(), TargetError> {
    if bytes.len() > digest_size {
        return Err(TargetError::TooManyBytes {
            bytes: bytes.len(),
            max: digest_size,
        });
    }
    Ok(())
}
