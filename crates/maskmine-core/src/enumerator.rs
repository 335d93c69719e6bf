//! Depth-first candidate enumeration
//!
//! The walk keeps one alphabet index per segment position and advances them
//! like an odometer, so memory use is linear in `seg_len` and stack use is
//! constant however long the segment is.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::alphabet::Alphabet;
use crate::config::SearchConfig;
use crate::error::{alloc_buffer, SearchError};
use crate::search::ResultSlot;
use crate::stats::SearchStats;

/// Leaves between flushes of a worker's local count into the shared stats
const FLUSH_INTERVAL: u64 = 4096;

/// Walks the candidate tree for one configuration.
///
/// The enumerator itself is shared by every worker of a search; all mutable
/// state lives in the [`Worker`] each subtree allocates for itself.
pub(crate) struct Enumerator<'a> {
    config: &'a SearchConfig,
    alphabet: &'a Alphabet,
    slot: &'a ResultSlot,
    stats: &'a SearchStats,
    cancel: Option<&'a AtomicBool>,
}

/// Buffers owned by a single worker for the lifetime of one subtree
struct Worker {
    candidate: Vec<u8>,
    digest: Vec<u8>,
    /// Alphabet index of the symbol currently at each segment position
    cursor: Vec<usize>,
    pending: u64,
}

impl<'a> Enumerator<'a> {
    pub(crate) fn new(
        config: &'a SearchConfig,
        alphabet: &'a Alphabet,
        slot: &'a ResultSlot,
        stats: &'a SearchStats,
        cancel: Option<&'a AtomicBool>,
    ) -> Self {
        Self {
            config,
            alphabet,
            slot,
            stats,
            cancel,
        }
    }

    /// Explore the whole tree, or only the subtree whose first segment byte
    /// is `root`.
    pub(crate) fn run(&self, root: Option<u8>) -> Result<(), SearchError> {
        let mut worker = self.worker()?;
        let start = match root {
            Some(symbol) => {
                debug_assert!(self.config.seg_len() > 0);
                worker.candidate[self.config.prefix().len()] = symbol;
                1
            }
            None => 0,
        };

        let outcome = self.explore(&mut worker, start);
        self.stats.add_candidates(worker.pending);
        outcome.map(|_| ())
    }

    fn worker(&self) -> Result<Worker, SearchError> {
        let prefix = self.config.prefix();
        let suffix = self.config.suffix();

        let mut candidate: Vec<u8> = alloc_buffer("candidate", self.config.candidate_len())?;
        candidate[..prefix.len()].copy_from_slice(prefix);
        let suffix_start = candidate.len() - suffix.len();
        candidate[suffix_start..].copy_from_slice(suffix);

        let digest = alloc_buffer("digest", self.config.digest_size())?;
        let cursor = alloc_buffer("cursor", self.config.seg_len())?;

        Ok(Worker {
            candidate,
            digest,
            cursor,
            pending: 0,
        })
    }

    /// Visit every leaf below the fixed positions `..start` in alphabet
    /// order, stopping at the first leaf that breaks.
    fn explore(&self, worker: &mut Worker, start: usize) -> Result<ControlFlow<()>, SearchError> {
        let seg_len = self.config.seg_len();
        let offset = self.config.prefix().len();
        let symbols = self.alphabet.symbols();
        let first = self.alphabet.first();

        worker.cursor[start..].fill(0);
        worker.candidate[offset + start..offset + seg_len].fill(first);

        loop {
            if self.visit_leaf(worker)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }

            // Advance the deepest position that still has symbols left,
            // resetting every position after it.
            let mut pos = seg_len;
            loop {
                if pos == start {
                    return Ok(ControlFlow::Continue(()));
                }
                pos -= 1;

                let next = worker.cursor[pos] + 1;
                if next < symbols.len() {
                    worker.cursor[pos] = next;
                    worker.candidate[offset + pos] = symbols[next];
                    break;
                }
                worker.cursor[pos] = 0;
                worker.candidate[offset + pos] = first;
            }
        }
    }

    fn visit_leaf(&self, worker: &mut Worker) -> Result<ControlFlow<()>, SearchError> {
        // Pruning is only checked here, so a worker deep in its subtree
        // finishes the current leaf before noticing another worker's match.
        if self.slot.is_stopped() {
            return Ok(ControlFlow::Break(()));
        }
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(SearchError::Cancelled);
        }

        worker.pending += 1;
        if worker.pending == FLUSH_INTERVAL {
            self.stats.add_candidates(FLUSH_INTERVAL);
            worker.pending = 0;
        }

        self.config
            .algorithm()
            .digest_into(&worker.candidate, &mut worker.digest);

        if self.config.target().matches_in_place(&mut worker.digest) {
            self.slot.publish(&worker.candidate)?;
            return Ok(ControlFlow::Break(()));
        }
        Ok(ControlFlow::Continue(()))
    }
}
