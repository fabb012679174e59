use std::net::SocketAddr;

use songsync_core::DEFAULT_SNAPSHOT_EVENT;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Event name carried by catalog snapshot pushes.
    pub event_name: String,
    /// Whether a plain list request also pushes the snapshot to every viewer.
    pub broadcast_on_list: bool,
    /// Start with the three demo songs instead of an empty catalog.
    pub seed_demo: bool,
    /// Per-viewer reply queue size.
    pub channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// SONGSYNC_LISTEN_ADDR defaults to "0.0.0.0:3000"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("SONGSYNC_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("SONGSYNC_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let event_name = match lookup("SONGSYNC_EVENT_NAME") {
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigError::Invalid("SONGSYNC_EVENT_NAME", "must not be empty"))
            }
            Some(name) => name.trim().to_string(),
            None => DEFAULT_SNAPSHOT_EVENT.to_string(),
        };

        let broadcast_on_list = parse_bool(&lookup, "SONGSYNC_BROADCAST_ON_LIST", true)?;
        let seed_demo = parse_bool(&lookup, "SONGSYNC_SEED_DEMO", true)?;

        let channel_capacity = match lookup("SONGSYNC_CHANNEL_CAPACITY") {
            Some(s) => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid(
                    "SONGSYNC_CHANNEL_CAPACITY",
                    "must be a positive integer",
                ))?,
            None => 32,
        };

        Ok(Config {
            listen_addr,
            event_name,
            broadcast_on_list,
            seed_demo,
            channel_capacity,
        })
    }

    /// Configuration for tests: loopback, empty catalog.
    pub fn for_testing() -> Self {
        Config {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            event_name: DEFAULT_SNAPSHOT_EVENT.to_string(),
            broadcast_on_list: true,
            seed_demo: false,
            channel_capacity: 32,
        }
    }
}

fn parse_bool<F>(lookup: &F, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).as_deref().map(str::trim) {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(_) => Err(ConfigError::Invalid(var, "must be true or false")),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
