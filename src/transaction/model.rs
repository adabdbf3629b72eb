use serde::{Deserialize, Serialize};

/// A value transfer waiting to be committed into a block.
/// Parties and amount are taken as-is; there is no signature or balance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Block reward paid out of thin air to whoever mined the block.
    pub fn reward(recipient: impl Into<String>) -> Self {
        use crate::blockchain::{MINING_REWARD, REWARD_SENDER};
        Self::new(REWARD_SENDER, recipient, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == crate::blockchain::REWARD_SENDER
    }
}
