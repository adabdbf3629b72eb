use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::{Block, GENESIS_PREVIOUS_HASH, ProofOfWork, SearchOutcome, digest, is_valid_chain};
use crate::transaction::{Transaction, TransactionPool};

/// In-memory ledger: the block chain plus the pool of pending transactions.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    pending: TransactionPool,
    pow: ProofOfWork,
}

impl Blockchain {
    /// Initialize a new ledger holding only the genesis block.
    pub fn new(pow: ProofOfWork) -> Self {
        let mut bc = Self {
            chain: Vec::new(),
            pending: TransactionPool::new(),
            pow,
        };
        bc.new_block(super::GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        bc
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Queue a transaction for the next block and return that block's index.
    pub fn new_transaction(&mut self, tx: Transaction) -> u64 {
        self.pending.push(tx);
        debug!("POOL - pending transactions: {}", self.pending.len());
        self.last_block().index + 1
    }

    /// Append a block holding every pending transaction.
    ///
    /// `previous_hash` is only honoured for the genesis block; every later
    /// block links to the digest of the current tip and takes the index
    /// after the tip's.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let (index, previous_hash) = match self.chain.last() {
            None => (
                1,
                previous_hash.unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string()),
            ),
            Some(last) => {
                let computed = digest(last);
                if let Some(requested) = previous_hash.filter(|h| *h != computed) {
                    warn!(
                        "LEDGER - ignoring previous_hash override {requested}, linking to {computed}"
                    );
                }
                (last.index + 1, computed)
            }
        };

        let block = Block::new(
            index,
            self.pending.drain_all(),
            proof,
            previous_hash,
        );
        self.chain.push(block.clone());
        block
    }

    /// Pay the reward to `reward_recipient` and seal the pool into a block
    /// carrying `proof`. The caller must have found `proof` for the current tip.
    pub fn seal_block(&mut self, proof: u64, reward_recipient: &str) -> Block {
        self.pending.push(Transaction::reward(reward_recipient));
        let block = self.new_block(proof, None);
        info!(
            "LEDGER - sealed block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        block
    }

    /// Search for the next proof inline and seal a block.
    /// Returns `None` if the search was cancelled or hit its iteration cap.
    pub fn mine(&mut self, reward_recipient: &str) -> Option<Block> {
        let last_proof = self.last_block().proof;
        match self.pow.search(last_proof, &CancellationToken::new()) {
            SearchOutcome::Found(proof) => Some(self.seal_block(proof, reward_recipient)),
            SearchOutcome::Cancelled | SearchOutcome::Exhausted => None,
        }
    }

    /// Swap in `candidate` if it is strictly longer and valid.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> bool {
        if candidate.len() <= self.chain.len() {
            debug!(
                "LEDGER - candidate of length {} is not longer than {}",
                candidate.len(),
                self.chain.len()
            );
            return false;
        }
        if !is_valid_chain(&candidate, &self.pow) {
            return false;
        }
        info!(
            "LEDGER - chain replaced: {} -> {} blocks",
            self.chain.len(),
            candidate.len()
        );
        self.chain = candidate;
        true
    }

    /// Validate our own chain.
    pub fn is_valid_chain(&self) -> bool {
        is_valid_chain(&self.chain, &self.pow)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &TransactionPool {
        &self.pending
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }
}
