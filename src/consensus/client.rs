use std::future::Future;

use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::blockchain::Block;
use crate::error::PeerError;

/// Body of a peer's `GET /chain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainReport {
    pub length: usize,
    pub chain: Vec<Block>,
}

/// Where candidate chains come from during conflict resolution.
pub trait ChainSource {
    fn fetch_chain(&self, peer: &str) -> impl Future<Output = Result<ChainReport, PeerError>>;
}

/// Fetches peer chains over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpChainSource {
    client: Client,
    scheme: String,
}

impl HttpChainSource {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            scheme: scheme.into(),
        }
    }

    fn chain_url(&self, peer: &str) -> String {
        format!("{}://{}/chain", self.scheme, peer)
    }
}

impl ChainSource for HttpChainSource {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainReport, PeerError> {
        let url = self.chain_url(peer);
        debug!("PEER - GET {url}");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| PeerError::Unreachable {
                    peer: peer.to_string(),
                    reason: e.to_string(),
                })?;

        if response.status() != StatusCode::OK {
            return Err(PeerError::Status {
                peer: peer.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json::<ChainReport>()
            .await
            .map_err(|e| PeerError::Malformed {
                peer: peer.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainReport, HttpChainSource};

    #[test]
    fn builds_chain_url_from_scheme() {
        let source = HttpChainSource::new("https");
        assert_eq!(source.chain_url("10.0.0.1:5000"), "https://10.0.0.1:5000/chain");
    }

    #[test]
    fn report_requires_both_fields() {
        assert!(serde_json::from_str::<ChainReport>(r#"{"length": 1}"#).is_err());
        assert!(serde_json::from_str::<ChainReport>(r#"{"chain": []}"#).is_err());
        let ok: ChainReport = serde_json::from_str(r#"{"length": 0, "chain": []}"#).unwrap();
        assert_eq!(ok.length, 0);
    }
}
