use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::error::ConfigError;

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub node_id: String,
    pub difficulty: u32,
    pub mining_timeout: Option<Duration>,
    pub mining_max_iterations: Option<u64>,
    pub peer_scheme: String,
    pub peer_timeout: Duration,
    pub peer_fan_out: usize,
    pub peers: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse(&get, "PORT")?.unwrap_or(5000),
            node_id: get("NODE_ID").unwrap_or_else(new_node_id),
            difficulty: parse(&get, "DIFFICULTY")?.unwrap_or(DEFAULT_DIFFICULTY),
            mining_timeout: parse::<u64, _>(&get, "MINING_TIMEOUT_SECS")?.map(Duration::from_secs),
            mining_max_iterations: parse(&get, "MINING_MAX_ITERATIONS")?,
            peer_scheme: get("PEER_SCHEME").unwrap_or_else(|| "http".to_string()),
            peer_timeout: Duration::from_millis(parse::<u64, _>(&get, "PEER_TIMEOUT_MS")?.unwrap_or(5000)),
            peer_fan_out: parse::<usize, _>(&get, "PEER_FAN_OUT")?.unwrap_or(8).max(1),
            peers: get("PEERS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Random node identity used as the mining reward recipient.
pub fn new_node_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
