use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::routing::RouteConfig;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "SPINDLE_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Upper bound of a single socket read.
    pub read_chunk_size: usize,
    /// Poll timeout while handlers are parked.
    pub defer_poll_interval_ms: u64,
    /// Longest the loop sleeps with nothing to do.
    pub idle_poll_interval_ms: u64,
    pub static_chunk_size: usize,
    /// How long a finished connection keeps draining unread input before
    /// it is closed.
    pub linger_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:10000".to_string(),
            read_chunk_size: 1000,
            defer_poll_interval_ms: 10,
            idle_poll_interval_ms: 100,
            static_chunk_size: 512,
            linger_timeout_ms: 2000,
        }
    }
}

impl ServerConfig {
    pub fn defer_poll_interval(&self) -> Duration {
        Duration::from_millis(self.defer_poll_interval_ms)
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval_ms)
    }

    pub fn linger_timeout(&self) -> Duration {
        Duration::from_millis(self.linger_timeout_ms)
    }
}

/// Built-in handler kinds that can be named in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Text,
    Static,
    Redirect,
    Websocket,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    pub handler: HandlerKind,
    #[serde(default)]
    pub options: RouteConfig,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an explicit variable lookup.
    pub fn load_from<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup(LISTEN_ENV) {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
