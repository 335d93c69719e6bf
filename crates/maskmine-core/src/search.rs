//! Search coordination: sequential and fan-out runs over one shared result slot

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use maskmine_crypto::HashAlgorithm;
use maskmine_pattern::calculate_difficulty;

use crate::alphabet::Alphabet;
use crate::config::{validate, SearchConfig, SearchRequest};
use crate::enumerator::Enumerator;
use crate::error::{alloc_buffer, SearchError};
use crate::stats::SearchStats;

/// How often `run_with_callback` reports progress
const CALLBACK_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of an exhaustive search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchResult {
    /// A full candidate (prefix + segment + suffix) whose masked digest hits
    /// the target
    Found(Vec<u8>),
    /// Every candidate was tried and none matched
    NotFound,
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }

    pub fn found(&self) -> Option<&[u8]> {
        match self {
            SearchResult::Found(candidate) => Some(candidate),
            SearchResult::NotFound => None,
        }
    }

    pub fn into_found(self) -> Option<Vec<u8>> {
        match self {
            SearchResult::Found(candidate) => Some(candidate),
            SearchResult::NotFound => None,
        }
    }
}

/// Search result with run statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// Algorithm searched
    pub algorithm: HashAlgorithm,
    /// Match, or proof of exhaustion
    pub result: SearchResult,
    /// Total candidates hashed
    pub candidates_tested: u64,
    /// Worker threads used
    pub workers: usize,
    /// Time taken in seconds
    pub time_secs: f64,
    /// Candidates per second achieved
    pub candidates_per_second: f64,
}

/// The only state shared between workers.
///
/// `stopped` is polled by every leaf; the candidate itself is written once,
/// under the lock, by whichever worker gets there first.
#[derive(Debug, Default)]
pub(crate) struct ResultSlot {
    stopped: AtomicBool,
    candidate: Mutex<Option<Vec<u8>>>,
}

impl ResultSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True once a match was published or the search was halted
    #[inline]
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Tell every worker to stop expanding leaves without recording a match
    pub(crate) fn halt(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Record `candidate` unless another match got there first.
    ///
    /// Returns whether this call won.
    pub(crate) fn publish(&self, candidate: &[u8]) -> Result<bool, SearchError> {
        let mut slot = self.candidate.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(false);
        }

        let mut owned: Vec<u8> = alloc_buffer("result", candidate.len())?;
        owned.copy_from_slice(candidate);
        *slot = Some(owned);
        self.stopped.store(true, Ordering::Release);
        Ok(true)
    }

    pub(crate) fn into_inner(self) -> Option<Vec<u8>> {
        self.candidate
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Masked-target preimage search engine
///
/// Sequential runs visit candidates in alphabet order and always return the
/// first match in that order. Parallel runs fan the first segment position out
/// across worker threads and return whichever match is published first, which
/// may differ between runs when several candidates match.
#[derive(Debug, Clone)]
pub struct Miner {
    config: SearchConfig,
    alphabet: Alphabet,
    cancel: Option<Arc<AtomicBool>>,
}

impl Miner {
    /// Validate `request` and build a miner for `algorithm`
    pub fn new(algorithm: HashAlgorithm, request: &SearchRequest) -> Result<Self, SearchError> {
        let (config, alphabet) = validate(algorithm, request)?;
        Ok(Self::from_parts(config, alphabet))
    }

    pub fn from_parts(config: SearchConfig, alphabet: Alphabet) -> Self {
        if alphabet.has_duplicates() {
            debug!(?alphabet, "alphabet contains duplicate symbols");
        }
        Self {
            config,
            alphabet,
            cancel: None,
        }
    }

    /// Abort the search with [`SearchError::Cancelled`] once `cancel` is set.
    ///
    /// The flag is polled once per candidate.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Expected candidates per match
    pub fn difficulty(&self) -> f64 {
        calculate_difficulty(self.config.target())
    }

    /// Number of candidates an exhaustive run hashes
    pub fn search_space(&self) -> u128 {
        self.alphabet.search_space(self.config.seg_len())
    }

    /// Run the search, blocking until a match is found or the space is
    /// exhausted
    pub fn run(&self) -> Result<SearchReport, SearchError> {
        let stats = SearchStats::new();
        self.run_with_stats(&stats)
    }

    /// Run the search on a background thread, calling `callback` with live
    /// statistics until it settles, and once more afterwards.
    pub fn run_with_callback<F>(&self, mut callback: F) -> Result<SearchReport, SearchError>
    where
        F: FnMut(&SearchStats),
    {
        let stats = SearchStats::new();
        // Never sent on: the sender dropping marks the end of the search
        let (done_tx, done_rx) = bounded::<()>(1);

        thread::scope(|s| {
            let stats = &stats;
            let handle = s.spawn(move || {
                let _done = done_tx;
                self.run_with_stats(stats)
            });

            loop {
                callback(stats);
                match done_rx.recv_timeout(CALLBACK_INTERVAL) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            let report = handle
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
            callback(stats);
            report
        })
    }

    fn run_with_stats(&self, stats: &SearchStats) -> Result<SearchReport, SearchError> {
        let workers = self.config.worker_count(self.alphabet.len());
        info!(
            algorithm = %self.config.algorithm(),
            seg_len = self.config.seg_len(),
            candidate_len = self.config.candidate_len(),
            alphabet = self.alphabet.len(),
            workers,
            "starting search"
        );

        let slot = ResultSlot::new();
        let enumerator = Enumerator::new(
            &self.config,
            &self.alphabet,
            &slot,
            stats,
            self.cancel.as_deref(),
        );

        if workers > 1 {
            self.fan_out(&enumerator, &slot, workers)?;
        } else {
            enumerator.run(None)?;
        }

        let result = match slot.into_inner() {
            Some(candidate) => SearchResult::Found(candidate),
            None => SearchResult::NotFound,
        };

        let report = SearchReport {
            algorithm: self.config.algorithm(),
            result,
            candidates_tested: stats.total_candidates(),
            workers,
            time_secs: stats.elapsed().as_secs_f64(),
            candidates_per_second: stats.candidates_per_second(),
        };
        info!(
            found = report.result.is_found(),
            candidates = report.candidates_tested,
            secs = report.time_secs,
            "search finished"
        );
        Ok(report)
    }

    /// One subtree per first-position symbol, spread over `workers` threads.
    /// Returns only after every subtree has finished or been pruned.
    fn fan_out(
        &self,
        enumerator: &Enumerator<'_>,
        slot: &ResultSlot,
        workers: usize,
    ) -> Result<(), SearchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("maskmine-worker-{i}"))
            .build()?;

        pool.install(|| {
            self.alphabet
                .symbols()
                .par_iter()
                .with_max_len(1)
                .try_for_each(|&symbol| {
                    let outcome = enumerator.run(Some(symbol));
                    debug!(symbol, ok = outcome.is_ok(), "subtree settled");
                    outcome.map_err(|err| {
                        slot.halt();
                        err
                    })
                })
        })
    }
}
