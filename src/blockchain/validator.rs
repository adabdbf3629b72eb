use log::debug;

use super::{Block, ProofOfWork, digest};

/// Validate a whole chain: hash linkage and PoW for every consecutive pair.
/// The genesis block is taken as given. Stops at the first bad pair.
pub fn is_valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    if chain.is_empty() {
        return false;
    }

    for pair in chain.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);

        // Check linkage
        let expected = digest(prev);
        if current.previous_hash != expected {
            debug!(
                "VALIDATE - block #{} previous_hash mismatch (got {}, expected {})",
                current.index, current.previous_hash, expected
            );
            return false;
        }

        // Check proof chaining
        if !pow.validate(prev.proof, current.proof) {
            debug!(
                "VALIDATE - block #{} proof {} does not follow {}",
                current.index, current.proof, prev.proof
            );
            return false;
        }
    }

    true
}
