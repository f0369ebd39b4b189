//! Configuration for the chat TCP server.
//!
//! For now this is intentionally simple: you can either use defaults
//! or override via a few environment variables:
//!
//! - `CHAT_BIND_ADDR`   (default: "127.0.0.1")
//! - `CHAT_PORT`        (default: "8580")
//! - `CHAT_MAX_CLIENTS` (default: "1024")

use std::env;
use std::str::FromStr;

use anyhow::Result;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of simultaneously active sessions.
    pub max_clients: usize,
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to reasonable defaults.
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("CHAT_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = read_env_or_default("CHAT_PORT", 8580u16)?;
        let max_clients = read_env_or_default("CHAT_MAX_CLIENTS", 1024usize)?;

        Ok(Config {
            bind_addr,
            port,
            max_clients,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => Ok(val.parse::<T>()?),
        Err(_) => Ok(default),
    }
}
