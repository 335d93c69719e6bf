//! Search errors

use std::collections::TryReserveError;

use thiserror::Error;

use maskmine_pattern::TargetError;

/// A malformed search configuration, rejected before any work starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("mask is {actual} bytes but {algorithm} digests are {expected} bytes")]
    MaskLength {
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("target is {actual} bytes but {algorithm} digests are {expected} bytes")]
    TargetLength {
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("alphabet is empty")]
    EmptyAlphabet,
    #[error("candidate length overflows: prefix {prefix} + segment {seg_len} + suffix {suffix}")]
    CandidateTooLong {
        prefix: usize,
        seg_len: usize,
        suffix: usize,
    },
    #[error("target: {0}")]
    Target(#[from] TargetError),
}

impl ArgumentError {
    /// Name of the offending request field
    pub fn field(&self) -> &'static str {
        match self {
            ArgumentError::MaskLength { .. } => "mask",
            ArgumentError::TargetLength { .. } => "target",
            ArgumentError::EmptyAlphabet => "alphabet",
            ArgumentError::CandidateTooLong { .. } => "seg_len",
            ArgumentError::Target(_) => "target",
        }
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid argument `{field}`: {0}", field = .0.field())]
    InvalidArgument(#[from] ArgumentError),
    #[error("failed to allocate {len} bytes for the {buffer} buffer")]
    ResourceExhausted {
        buffer: &'static str,
        len: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("search was cancelled")]
    Cancelled,
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Coarse classification of a [`SearchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    ResourceExhausted,
    Cancelled,
    Internal,
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SearchError::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            SearchError::Cancelled => ErrorKind::Cancelled,
            SearchError::ThreadPool(_) => ErrorKind::Internal,
        }
    }
}

impl From<TargetError> for SearchError {
    fn from(err: TargetError) -> Self {
        SearchError::InvalidArgument(ArgumentError::Target(err))
    }
}

/// Allocate a buffer of exactly `len` default elements, reporting failure
/// instead of aborting the process.
pub(crate) fn alloc_buffer<T: Clone + Default>(
    buffer: &'static str,
    len: usize,
) -> Result<Vec<T>, SearchError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| SearchError::ResourceExhausted { buffer, len, source })?;
    buf.resize(len, T::default());
    Ok(buf)
}
