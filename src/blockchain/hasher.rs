//! Canonical block serialization and hashing.
//!
//! Every node must derive the same digest for the same block, otherwise
//! `previous_hash` links computed here would not verify on a peer. The
//! canonical form is compact JSON with keys sorted at every level; the
//! field order of the mirror structs below is that sorted order.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::Block;
use crate::transaction::Transaction;

#[derive(Serialize)]
struct CanonicalTransaction<'a> {
    amount: u64,
    recipient: &'a str,
    sender: &'a str,
}

#[derive(Serialize)]
struct CanonicalBlock<'a> {
    index: u64,
    previous_hash: &'a str,
    proof: u64,
    timestamp: i64,
    transactions: Vec<CanonicalTransaction<'a>>,
}

impl<'a> From<&'a Transaction> for CanonicalTransaction<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            amount: tx.amount,
            recipient: &tx.recipient,
            sender: &tx.sender,
        }
    }
}

/// Serialize all block fields with sorted keys and no whitespace.
pub fn canonicalize(block: &Block) -> Vec<u8> {
    let canonical = CanonicalBlock {
        index: block.index,
        previous_hash: &block.previous_hash,
        proof: block.proof,
        timestamp: block.timestamp,
        transactions: block.transactions.iter().map(CanonicalTransaction::from).collect(),
    };
    // Only strings and integers: serialization cannot fail.
    serde_json::to_vec(&canonical).unwrap_or_default()
}

/// Hex-encoded SHA-256 of the canonical form of `block`.
pub fn digest(block: &Block) -> String {
    sha256_hex(&canonicalize(block))
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
