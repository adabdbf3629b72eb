use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::hasher::sha256_hex;

/// How many candidates are tried between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Result of a proof search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(u64),
    Cancelled,
    /// The configured iteration cap was reached without a solution.
    Exhausted,
}

/// The hash-prefix puzzle: a proof `p` is valid after `last_proof` when
/// `sha256("{last_proof}{p}")` starts with `difficulty` zero hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
    max_iterations: Option<u64>,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            max_iterations: None,
        }
    }

    /// Cap the number of candidates a single search may try.
    pub fn with_max_iterations(mut self, max_iterations: Option<u64>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }

    /// Check a candidate proof against the previous block's proof.
    pub fn validate(&self, last_proof: u64, candidate: u64) -> bool {
        let guess = format!("{last_proof}{candidate}");
        let hash = sha256_hex(guess.as_bytes());
        let width = self.difficulty as usize;
        hash.len() >= width && hash.chars().take(width).all(|c| c == '0')
    }

    /// Linear search from 0 for the smallest valid proof.
    pub fn search(&self, last_proof: u64, cancel: &CancellationToken) -> SearchOutcome {
        let mut candidate: u64 = 0;
        loop {
            if candidate % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                debug!("POW - search after {last_proof} cancelled at candidate {candidate}");
                return SearchOutcome::Cancelled;
            }
            if self.max_iterations.is_some_and(|cap| candidate >= cap) {
                debug!("POW - search after {last_proof} exhausted {candidate} candidates");
                return SearchOutcome::Exhausted;
            }
            if self.validate(last_proof, candidate) {
                return SearchOutcome::Found(candidate);
            }
            candidate = match candidate.checked_add(1) {
                Some(next) => next,
                None => return SearchOutcome::Exhausted,
            };
        }
    }
}

/// A proof search running on the blocking thread pool.
pub struct MiningTask {
    cancel: CancellationToken,
    handle: JoinHandle<SearchOutcome>,
}

impl MiningTask {
    /// Start searching for the proof that follows `last_proof`.
    /// Cancelling `cancel` (or any of its parents) stops the search.
    pub fn spawn(pow: ProofOfWork, last_proof: u64, cancel: CancellationToken) -> Self {
        let token = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let started = std::time::Instant::now();
            let outcome = pow.search(last_proof, &token);
            if let SearchOutcome::Found(proof) = outcome {
                info!(
                    "POW - found proof {} after {} (difficulty={}, {} ms)",
                    proof,
                    last_proof,
                    pow.difficulty(),
                    started.elapsed().as_millis()
                );
            }
            outcome
        });
        Self { cancel, handle }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the search to finish. A worker panic is reported as cancellation.
    pub async fn join(self) -> SearchOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("POW - search worker failed: {e}");
                SearchOutcome::Cancelled
            }
        }
    }
}
