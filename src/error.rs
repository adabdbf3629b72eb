use thiserror::Error;

/// Why a peer was skipped during conflict resolution.
#[derive(Error, Debug)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },

    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },

    #[error("peer {peer} sent a malformed chain: {reason}")]
    Malformed { peer: String, reason: String },

    #[error("peer {peer} timed out after {millis} ms")]
    Timeout { peer: String, millis: u128 },
}

/// Why `Node::mine` produced no block.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MineError {
    #[error("mining was cancelled")]
    Cancelled,

    #[error("mining exceeded its deadline of {0} s")]
    TimedOut(u64),

    #[error("no proof found within {0} iterations")]
    Exhausted(u64),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PeerAddressError {
    #[error("peer address is empty")]
    Empty,

    #[error("invalid peer address {0:?}")]
    Invalid(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}
