//! maskmine Crypto Primitives
//!
//! Digest functions the miner can target.

pub mod hash;

pub use self::hash::{HashAlgorithm, UnknownAlgorithmError, MAX_DIGEST_SIZE};
