//! Search request and validated configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

use maskmine_crypto::HashAlgorithm;
use maskmine_pattern::MaskedTarget;

use crate::alphabet::{Alphabet, DEFAULT_ALPHABET};
use crate::error::ArgumentError;

/// Raw search parameters, as handed over by a caller before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Fixed bytes before the variable segment
    #[serde(default)]
    pub prefix: Vec<u8>,
    /// Fixed bytes after the variable segment
    #[serde(default)]
    pub suffix: Vec<u8>,
    /// Length of the variable segment
    pub seg_len: usize,
    /// Expected masked digest
    pub target: Vec<u8>,
    /// Bits of the digest that must match
    pub mask: Vec<u8>,
    /// Bytes the variable segment is drawn from
    #[serde(default = "default_alphabet")]
    pub alphabet: Vec<u8>,
    /// Fan the first position out across worker threads
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Worker thread cap (0 = one per CPU)
    #[serde(default)]
    pub threads: usize,
}

fn default_alphabet() -> Vec<u8> {
    DEFAULT_ALPHABET.to_vec()
}

fn default_parallel() -> bool {
    true
}

impl SearchRequest {
    /// Request for `seg_len` symbols matching `target`, with no prefix or
    /// suffix and the default alphabet.
    pub fn new(seg_len: usize, target: &MaskedTarget) -> Self {
        Self {
            prefix: Vec::new(),
            suffix: Vec::new(),
            seg_len,
            target: target.target().to_vec(),
            mask: target.mask().to_vec(),
            alphabet: default_alphabet(),
            parallel: true,
            threads: 0,
        }
    }

    pub fn prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<Vec<u8>>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn alphabet(mut self, alphabet: impl Into<Vec<u8>>) -> Self {
        self.alphabet = alphabet.into();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Validated search parameters
#[derive(Debug, Clone)]
pub struct SearchConfig {
    algorithm: HashAlgorithm,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    seg_len: usize,
    target: MaskedTarget,
    parallel: bool,
    threads: usize,
}

impl SearchConfig {
    /// Validate `request` for `algorithm`.
    ///
    /// Mask and target must both be exactly one digest long, and the full
    /// candidate length must be addressable.
    pub fn new(algorithm: HashAlgorithm, request: &SearchRequest) -> Result<Self, ArgumentError> {
        let expected = algorithm.digest_size();

        if request.mask.len() != expected {
            return Err(ArgumentError::MaskLength {
                algorithm: algorithm.name(),
                expected,
                actual: request.mask.len(),
            });
        }
        if request.target.len() != expected {
            return Err(ArgumentError::TargetLength {
                algorithm: algorithm.name(),
                expected,
                actual: request.target.len(),
            });
        }

        request
            .prefix
            .len()
            .checked_add(request.seg_len)
            .and_then(|n| n.checked_add(request.suffix.len()))
            .ok_or(ArgumentError::CandidateTooLong {
                prefix: request.prefix.len(),
                seg_len: request.seg_len,
                suffix: request.suffix.len(),
            })?;

        let target = MaskedTarget::new(request.target.clone(), request.mask.clone())?;
        if target.has_stray_bits() {
            warn!("target sets bits outside the mask; no candidate can match");
        }

        Ok(Self {
            algorithm,
            prefix: request.prefix.clone(),
            suffix: request.suffix.clone(),
            seg_len: request.seg_len,
            target,
            parallel: request.parallel,
            threads: request.threads,
        })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digest_size(&self) -> usize {
        self.algorithm.digest_size()
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    pub fn seg_len(&self) -> usize {
        self.seg_len
    }

    pub fn target(&self) -> &MaskedTarget {
        &self.target
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Total candidate length: prefix + segment + suffix
    pub fn candidate_len(&self) -> usize {
        self.prefix.len() + self.seg_len + self.suffix.len()
    }

    /// Worker threads to run for an alphabet of `alphabet_len` symbols.
    ///
    /// Sequential searches, and searches with no variable segment to fan
    /// out, always use one worker.
    pub fn worker_count(&self, alphabet_len: usize) -> usize {
        if !self.parallel || self.seg_len == 0 {
            return 1;
        }
        let threads = if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        };
        threads.min(alphabet_len).max(1)
    }
}

/// Validate a request into a configuration and alphabet
pub fn validate(
    algorithm: HashAlgorithm,
    request: &SearchRequest,
) -> Result<(SearchConfig, Alphabet), ArgumentError> {
    let config = SearchConfig::new(algorithm, request)?;
    let alphabet = Alphabet::new(request.alphabet.clone())?;
    Ok((config, alphabet))
}
