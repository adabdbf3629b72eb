use std::collections::BTreeSet;

use reqwest::Url;

use crate::error::PeerAddressError;

/// Reduce a peer address to `host[:port]`.
///
/// Accepts full URLs (`http://10.0.0.5:5000/`) as well as bare
/// `host:port`; scheme, path and query are dropped. A URL without an
/// explicit port keeps its scheme's default port, so the same endpoint
/// spelled with different schemes maps to one entry. A bare address keeps
/// exactly the port it was written with.
pub fn normalize_address(address: &str) -> Result<String, PeerAddressError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(PeerAddressError::Empty);
    }

    let invalid = || PeerAddressError::Invalid(address.to_string());
    let (url, port) = if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|_| invalid())?;
        let port = url.port_or_known_default();
        (url, port)
    } else {
        // A scheme with no default port: `port()` is whatever was written.
        let url = Url::parse(&format!("peer://{trimmed}")).map_err(|_| invalid())?;
        let port = url.port();
        (url, port)
    };

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(invalid)?
        .to_ascii_lowercase();

    Ok(match port {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}

/// Known peers keyed by normalized address. Iterates in sorted order so
/// conflict resolution visits peers deterministically.
#[derive(Debug, Default, Clone)]
pub struct PeerSet {
    peers: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self {
            peers: BTreeSet::new(),
        }
    }

    /// Add a peer; returns the normalized address. Re-registering is a no-op.
    pub fn register(&mut self, address: &str) -> Result<String, PeerAddressError> {
        let normalized = normalize_address(address)?;
        self.peers.insert(normalized.clone());
        Ok(normalized)
    }

    /// Add several peers at once. Nothing is inserted if any address is
    /// invalid. Returns how many peers were new.
    pub fn register_all<S: AsRef<str>>(
        &mut self,
        addresses: &[S],
    ) -> Result<usize, PeerAddressError> {
        let normalized = addresses
            .iter()
            .map(|a| normalize_address(a.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(normalized
            .into_iter()
            .filter(|peer| self.peers.insert(peer.clone()))
            .count())
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }
}
