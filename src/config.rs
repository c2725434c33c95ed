use color_eyre::eyre::{eyre, Report};
use std::{env, fmt::Display, str::FromStr, time::Duration};
use tracing::info;

pub const VOTER_API_PORT: u16 = 1081;
pub const POLL_API_PORT: u16 = 1082;
pub const VOTE_API_PORT: u16 = 1080;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_VOTERS_URL: &str = "127.0.0.1:1081";
const DEFAULT_POLLS_URL: &str = "127.0.0.1:1082";
const DEFAULT_DETAIL_TIMEOUT_MS: &str = "2000";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(format!("unknown store backend {:?}", other)),
        }
    }
}

/// Base addresses of the services a vote points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependencies {
    pub voters_url: String,
    pub polls_url: String,
}

impl Dependencies {
    pub fn new(voters: &str, polls: &str) -> Self {
        Self {
            voters_url: with_scheme(voters),
            polls_url: with_scheme(polls),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub redis_url: String,
    pub dependencies: Dependencies,
    pub detail_timeout: Duration,
}

impl Config {
    /// Reads the environment, falling back to defaults for
    /// missing keys. `default_port` differs per service.
    pub fn load(default_port: u16) -> Result<Self, Report> {
        let voters: String = load("VOTERS_URL", DEFAULT_VOTERS_URL)?;
        let polls: String = load("POLLS_URL", DEFAULT_POLLS_URL)?;
        let timeout_ms: u64 = load("DETAIL_TIMEOUT_MS", DEFAULT_DETAIL_TIMEOUT_MS)?;
        Ok(Self {
            host: load("HOST", DEFAULT_HOST)?,
            port: load("PORT", &default_port.to_string())?,
            store: load("STORE_BACKEND", "redis")?,
            redis_url: load("REDIS_URL", DEFAULT_REDIS_URL)?,
            dependencies: Dependencies::new(&voters, &polls),
            detail_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load<T: FromStr>(key: &str, default: &str) -> Result<T, Report>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_owned()
    });
    raw.parse()
        .map_err(|err| eyre!("invalid value {:?} for {}: {}", raw, key, err))
}

fn with_scheme(address: &str) -> String {
    let address = address.trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_owned()
    } else {
        format!("http://{}", address)
    }
}
