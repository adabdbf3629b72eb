use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use log::{debug, info, warn};

use super::client::{ChainReport, ChainSource};
use crate::blockchain::{Block, ProofOfWork, is_valid_chain};
use crate::error::PeerError;

/// Longest-valid-chain consensus over a set of peers.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    timeout: Duration,
    fan_out: usize,
}

impl Resolver {
    pub fn new(timeout: Duration, fan_out: usize) -> Self {
        Self {
            timeout,
            fan_out: fan_out.max(1),
        }
    }

    /// Ask every peer for its chain and return the longest valid one that
    /// beats `local_len`, if any.
    ///
    /// Peers are queried concurrently (at most `fan_out` at once) but the
    /// results are compared in the order of `peers`, so with sorted input
    /// the first peer reporting the winning length wins.
    pub async fn resolve<S: ChainSource>(
        &self,
        source: &S,
        peers: &[String],
        local_len: usize,
        pow: &ProofOfWork,
    ) -> Option<Vec<Block>> {
        let reports: Vec<(&String, Result<ChainReport, PeerError>)> = stream::iter(peers)
            .map(|peer| async move { (peer, self.fetch(source, peer).await) })
            .buffered(self.fan_out)
            .collect()
            .await;

        let mut max_length = local_len;
        let mut best: Option<Vec<Block>> = None;

        for (peer, result) in reports {
            let report = match result {
                Ok(report) => report,
                Err(e) => {
                    warn!("RESOLVE - skipping peer: {e}");
                    continue;
                }
            };

            if report.length <= max_length {
                debug!(
                    "RESOLVE - peer {} has {} blocks, not longer than {}",
                    peer, report.length, max_length
                );
                continue;
            }
            if !is_valid_chain(&report.chain, pow) {
                warn!(
                    "RESOLVE - peer {} offered an invalid chain of {} blocks",
                    peer, report.length
                );
                continue;
            }

            info!(
                "RESOLVE - peer {} has a longer valid chain ({} > {})",
                peer, report.length, max_length
            );
            max_length = report.length;
            best = Some(report.chain);
        }

        best
    }

    async fn fetch<S: ChainSource>(&self, source: &S, peer: &str) -> Result<ChainReport, PeerError> {
        let report = tokio::time::timeout(self.timeout, source.fetch_chain(peer))
            .await
            .map_err(|_| PeerError::Timeout {
                peer: peer.to_string(),
                millis: self.timeout.as_millis(),
            })??;

        if report.length != report.chain.len() {
            return Err(PeerError::Malformed {
                peer: peer.to_string(),
                reason: format!(
                    "reported length {} but sent {} blocks",
                    report.length,
                    report.chain.len()
                ),
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::Resolver;
    use crate::blockchain::{Block, Blockchain, ProofOfWork};
    use crate::consensus::{ChainReport, ChainSource};
    use crate::error::PeerError;

    pub(crate) enum Reply {
        Chain(ChainReport),
        Down,
        Status(u16),
        Hang,
    }

    /// In-memory peers keyed by address.
    #[derive(Default)]
    pub(crate) struct FakePeers {
        replies: HashMap<String, Reply>,
    }

    impl FakePeers {
        pub(crate) fn with(mut self, peer: &str, reply: Reply) -> Self {
            self.replies.insert(peer.to_string(), reply);
            self
        }

        pub(crate) fn with_chain(self, peer: &str, chain: Vec<Block>) -> Self {
            let length = chain.len();
            self.with(peer, Reply::Chain(ChainReport { length, chain }))
        }
    }

    impl ChainSource for FakePeers {
        async fn fetch_chain(&self, peer: &str) -> Result<ChainReport, PeerError> {
            match self.replies.get(peer) {
                Some(Reply::Chain(report)) => Ok(report.clone()),
                Some(Reply::Status(status)) => Err(PeerError::Status {
                    peer: peer.to_string(),
                    status: *status,
                }),
                Some(Reply::Hang) => std::future::pending().await,
                Some(Reply::Down) | None => Err(PeerError::Unreachable {
                    peer: peer.to_string(),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    pub(crate) fn pow() -> ProofOfWork {
        ProofOfWork::new(2)
    }

    pub(crate) fn chain_of(blocks: usize, miner: &str) -> Vec<Block> {
        let mut bc = Blockchain::new(pow());
        while bc.len() < blocks {
            bc.mine(miner).expect("search is unbounded");
        }
        bc.chain().to_vec()
    }

    fn resolver() -> Resolver {
        Resolver::new(Duration::from_millis(200), 4)
    }

    fn peers(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[actix_web::test]
    async fn adopts_longer_valid_chain() {
        let longer = chain_of(3, "a");
        let source = FakePeers::default().with_chain("a:1", longer.clone());

        let got = resolver().resolve(&source, &peers(&["a:1"]), 1, &pow()).await;
        assert_eq!(got, Some(longer));
    }

    #[actix_web::test]
    async fn ignores_equal_or_shorter_chains() {
        let source = FakePeers::default()
            .with_chain("a:1", chain_of(2, "a"))
            .with_chain("b:1", chain_of(1, "b"));

        let got = resolver()
            .resolve(&source, &peers(&["a:1", "b:1"]), 2, &pow())
            .await;
        assert_eq!(got, None);
    }

    #[actix_web::test]
    async fn ignores_longer_invalid_chain() {
        let mut bad = chain_of(4, "a");
        bad[2].previous_hash = "forged".into();
        let source = FakePeers::default().with_chain("a:1", bad);

        let got = resolver().resolve(&source, &peers(&["a:1"]), 1, &pow()).await;
        assert_eq!(got, None);
    }

    #[actix_web::test]
    async fn skips_failing_peers_and_keeps_going() {
        let good = chain_of(3, "d");
        let source = FakePeers::default()
            .with("a:1", Reply::Down)
            .with("b:1", Reply::Status(500))
            .with("c:1", Reply::Hang)
            .with_chain("d:1", good.clone());

        let got = resolver()
            .resolve(&source, &peers(&["a:1", "b:1", "c:1", "d:1"]), 1, &pow())
            .await;
        assert_eq!(got, Some(good));
    }

    #[actix_web::test]
    async fn length_mismatch_is_malformed() {
        let chain = chain_of(2, "a");
        let source = FakePeers::default().with(
            "a:1",
            Reply::Chain(ChainReport { length: 10, chain }),
        );

        let got = resolver().resolve(&source, &peers(&["a:1"]), 1, &pow()).await;
        assert_eq!(got, None);
    }

    #[actix_web::test]
    async fn picks_longest_and_first_on_ties() {
        let short = chain_of(2, "a");
        let tie_b = chain_of(3, "b");
        let tie_c = chain_of(3, "c");
        let source = FakePeers::default()
            .with_chain("a:1", short)
            .with_chain("b:1", tie_b.clone())
            .with_chain("c:1", tie_c);

        let got = resolver()
            .resolve(&source, &peers(&["a:1", "b:1", "c:1"]), 1, &pow())
            .await;
        assert_eq!(got, Some(tie_b));
    }
}
