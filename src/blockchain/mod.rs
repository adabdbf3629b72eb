pub mod block;
pub mod hasher;
pub mod model;
pub mod pow;
pub mod validator;

pub use block::Block;
pub use hasher::{canonicalize, digest};
pub use model::Blockchain;
pub use pow::{MiningTask, ProofOfWork, SearchOutcome};
pub use validator::is_valid_chain;

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Proof stored in the genesis block; the first mined block chains off it.
pub const GENESIS_PROOF: u64 = 100;

/// Sentinel `previous_hash` of the genesis block (it has no predecessor).
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Sender used for block rewards ("0" means newly minted coins).
pub const REWARD_SENDER: &str = "0";

/// Amount paid to the miner of each block.
pub const MINING_REWARD: u64 = 1;
