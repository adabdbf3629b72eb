pub mod client;
pub mod peers;
pub mod resolver;

pub use client::{ChainReport, ChainSource, HttpChainSource};
pub use peers::{PeerSet, normalize_address};
pub use resolver::Resolver;
