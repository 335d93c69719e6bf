//! maskmine Core Engine
//!
//! Exhaustive masked-target preimage search over a fixed-length alphabet
//! segment, sequential or fanned out across worker threads.

mod alphabet;
mod api;
pub mod challenge;
mod config;
mod enumerator;
mod error;
mod search;
mod stats;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET};
pub use api::{
    search, search_md5, search_sha1, search_sha224, search_sha256, search_sha384, search_sha512,
    verify,
};
pub use challenge::{Challenge, ChallengeError};
pub use config::{validate, SearchConfig, SearchRequest};
pub use error::{ArgumentError, ErrorKind, SearchError};
pub use search::{Miner, SearchReport, SearchResult};
pub use stats::{format_duration, SearchStats};

// Re-exports for convenience
pub use maskmine_crypto::{HashAlgorithm, UnknownAlgorithmError};
pub use maskmine_pattern::{
    calculate_difficulty, estimate_time_50pct, format_difficulty, MaskedTarget, TargetError,
};
