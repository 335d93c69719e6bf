//! Digest algorithms supported by the miner

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;

/// Largest digest produced by any supported algorithm (SHA-512)
pub const MAX_DIGEST_SIZE: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown hash algorithm '{0}' (valid: md5, sha1, sha224, sha256, sha384, sha512)")]
pub struct UnknownAlgorithmError(pub String);

/// Hash algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Every supported algorithm, in ascending digest size
    pub const ALL: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Digest length in bytes
    pub const fn digest_size(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Lowercase canonical name
    pub const fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Hash `data` into a freshly allocated buffer
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; self.digest_size()];
        self.digest_into(data, &mut out);
        out
    }

    /// Hash `data` into `out`, which must be exactly `digest_size()` bytes.
    ///
    /// This is the hot path of the miner: no allocation happens here beyond
    /// the hasher state on the stack.
    #[inline]
    pub fn digest_into(self, data: &[u8], out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.digest_size());
        match self {
            HashAlgorithm::Md5 => hash_into::<Md5>(data, out),
            HashAlgorithm::Sha1 => hash_into::<Sha1>(data, out),
            HashAlgorithm::Sha224 => hash_into::<Sha224>(data, out),
            HashAlgorithm::Sha256 => hash_into::<Sha256>(data, out),
            HashAlgorithm::Sha384 => hash_into::<Sha384>(data, out),
            HashAlgorithm::Sha512 => hash_into::<Sha512>(data, out),
        }
    }
}

#[inline]
fn hash_into<D: Digest>(data: &[u8], out: &mut [u8]) {
    let mut hasher = D::new();
    hasher.update(data);
    out.copy_from_slice(&hasher.finalize());
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "MD5"),
            HashAlgorithm::Sha1 => write!(f, "SHA-1"),
            HashAlgorithm::Sha224 => write!(f, "SHA-224"),
            HashAlgorithm::Sha256 => write!(f, "SHA-256"),
            HashAlgorithm::Sha384 => write!(f, "SHA-384"),
            HashAlgorithm::Sha512 => write!(f, "SHA-512"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(UnknownAlgorithmError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        let cases = [
            (HashAlgorithm::Md5, "900150983cd24fb0d6963f7d28e17f72"),
            (HashAlgorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d"),
            (
                HashAlgorithm::Sha224,
                "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7",
            ),
            (
                HashAlgorithm::Sha256,
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ),
            (
                HashAlgorithm::Sha384,
                "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7",
            ),
            (
                HashAlgorithm::Sha512,
                "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
            ),
        ];

        for (algorithm, expected) in cases {
            let digest = algorithm.digest(b"abc");
            assert_eq!(digest.len(), algorithm.digest_size(), "{algorithm}");
            assert_eq!(hex::encode(digest), expected, "{algorithm}");
        }
    }

    #[test]
    fn test_digest_into_matches_digest() {
        let mut out = [0u8; 16];
        HashAlgorithm::Md5.digest_into(b"abcde", &mut out);
        assert_eq!(hex::encode(out), "ab56b4d92b40713acc5af89985d4b786");
        assert_eq!(out.to_vec(), HashAlgorithm::Md5.digest(b"abcde"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("MD5".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Md5));
        assert_eq!("sha-256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert_eq!("Sha512".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha512));
        assert!("blake3".parse::<HashAlgorithm>().is_err());

        for algorithm in HashAlgorithm::ALL {
            assert_eq!(algorithm.name().parse::<HashAlgorithm>(), Ok(algorithm));
        }
    }

    #[test]
    fn test_max_digest_size() {
        let largest = HashAlgorithm::ALL.iter().map(|a| a.digest_size()).max();
        assert_eq!(largest, Some(MAX_DIGEST_SIZE));
    }
}
