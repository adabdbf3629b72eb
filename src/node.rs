use std::sync::RwLock;
use std::time::Duration;

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::blockchain::{Block, Blockchain, MiningTask, ProofOfWork, SearchOutcome, is_valid_chain};
use crate::config::Config;
use crate::consensus::{ChainSource, HttpChainSource, PeerSet, Resolver};
use crate::error::{MineError, PeerAddressError};
use crate::transaction::Transaction;

/// Process-wide node state shared with the HTTP layer.
///
/// The chain and the pending pool sit behind one lock so mining and
/// submission never interleave. The lock is released while searching for a
/// proof and while talking to peers.
pub struct Node {
    id: String,
    ledger: RwLock<Blockchain>,
    peers: RwLock<PeerSet>,
    resolver: Resolver,
    source: HttpChainSource,
    mining_timeout: Option<Duration>,
    shutdown: CancellationToken,
}

impl Node {
    pub fn new(config: &Config) -> Self {
        let pow = ProofOfWork::new(config.difficulty)
            .with_max_iterations(config.mining_max_iterations);

        let mut peers = PeerSet::new();
        for address in &config.peers {
            match peers.register(address) {
                Ok(peer) => info!("NODE - bootstrap peer {peer}"),
                Err(e) => warn!("NODE - ignoring bootstrap peer: {e}"),
            }
        }

        Self {
            id: config.node_id.clone(),
            ledger: RwLock::new(Blockchain::new(pow)),
            peers: RwLock::new(peers),
            resolver: Resolver::new(config.peer_timeout, config.peer_fan_out),
            source: HttpChainSource::new(config.peer_scheme.clone()),
            mining_timeout: config.mining_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Identity used as the reward recipient for blocks mined here.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn difficulty(&self) -> u32 {
        self.ledger.read().expect("ledger lock poisoned").difficulty()
    }

    /// Queue a transaction; returns the index of the block it should land in.
    pub fn submit_transaction(&self, sender: &str, recipient: &str, amount: u64) -> u64 {
        let mut bc = self.ledger.write().expect("ledger lock poisoned");
        bc.new_transaction(Transaction::new(sender, recipient, amount))
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        let bc = self.ledger.read().expect("ledger lock poisoned");
        bc.pending().iter().cloned().collect()
    }

    /// Mine a block paying `reward_recipient`.
    ///
    /// The proof search runs off the lock on the blocking pool. If the tip
    /// changed while searching (another block was mined or the chain was
    /// replaced) the search restarts from the new tip.
    pub async fn mine(&self, reward_recipient: &str) -> Result<Block, MineError> {
        loop {
            let (last_proof, pow) = {
                let bc = self.ledger.read().expect("ledger lock poisoned");
                (bc.last_block().proof, *bc.pow())
            };

            let proof = self.search(pow, last_proof).await?;

            let mut bc = self.ledger.write().expect("ledger lock poisoned");
            if bc.last_block().proof != last_proof {
                debug!("MINER - tip moved while searching after {last_proof}, retrying");
                continue;
            }
            return Ok(bc.seal_block(proof, reward_recipient));
        }
    }

    async fn search(&self, pow: ProofOfWork, last_proof: u64) -> Result<u64, MineError> {
        let task = MiningTask::spawn(pow, last_proof, self.shutdown.child_token());
        let token = task.cancellation_token();

        let outcome = match self.mining_timeout {
            Some(limit) => match tokio::time::timeout(limit, task.join()).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    token.cancel();
                    warn!("MINER - no proof after {} s, giving up", limit.as_secs());
                    return Err(MineError::TimedOut(limit.as_secs()));
                }
            },
            None => task.join().await,
        };

        match outcome {
            SearchOutcome::Found(proof) => Ok(proof),
            SearchOutcome::Cancelled => Err(MineError::Cancelled),
            SearchOutcome::Exhausted => Err(MineError::Exhausted(
                pow.max_iterations().unwrap_or(u64::MAX),
            )),
        }
    }

    /// Consistent copy of the chain and its length.
    pub fn chain_snapshot(&self) -> (Vec<Block>, usize) {
        let bc = self.ledger.read().expect("ledger lock poisoned");
        (bc.chain().to_vec(), bc.len())
    }

    /// Validate an arbitrary chain with this node's difficulty.
    pub fn is_valid_chain(&self, chain: &[Block]) -> bool {
        let pow = *self.ledger.read().expect("ledger lock poisoned").pow();
        is_valid_chain(chain, &pow)
    }

    /// Add a peer; returns its normalized address.
    pub fn register_peer(&self, address: &str) -> Result<String, PeerAddressError> {
        let mut peers = self.peers.write().expect("peers lock poisoned");
        let before = peers.len();
        let normalized = peers.register(address)?;
        if peers.len() > before {
            info!("NODE - registered peer {normalized} ({} total)", peers.len());
        }
        Ok(normalized)
    }

    /// Add several peers in one step; nothing is added if any address is
    /// invalid. Returns how many peers were new.
    pub fn register_peers<S: AsRef<str>>(
        &self,
        addresses: &[S],
    ) -> Result<usize, PeerAddressError> {
        let mut peers = self.peers.write().expect("peers lock poisoned");
        let added = peers.register_all(addresses)?;
        if added > 0 {
            info!("NODE - registered {added} peer(s) ({} total)", peers.len());
        }
        Ok(added)
    }

    /// Registered peers in sorted order.
    pub fn peers(&self) -> Vec<String> {
        self.peers.read().expect("peers lock poisoned").to_vec()
    }

    /// Replace our chain with the longest valid chain among peers.
    /// Returns whether the chain was replaced.
    pub async fn resolve_conflicts(&self) -> bool {
        self.resolve_conflicts_with(&self.source).await
    }

    pub async fn resolve_conflicts_with<S: ChainSource>(&self, source: &S) -> bool {
        let peers = self.peers();
        let (local_len, pow) = {
            let bc = self.ledger.read().expect("ledger lock poisoned");
            (bc.len(), *bc.pow())
        };

        let Some(candidate) = self.resolver.resolve(source, &peers, local_len, &pow).await else {
            debug!("RESOLVE - our chain of {local_len} blocks is authoritative");
            return false;
        };

        // Our chain may have grown while peers were queried.
        let mut bc = self.ledger.write().expect("ledger lock poisoned");
        bc.replace_chain(candidate)
    }

    /// Stop every in-flight proof search.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
