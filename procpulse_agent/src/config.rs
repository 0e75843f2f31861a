//! Agent configuration: broker endpoint from the environment plus the fixed
//! cadence/batch constants shared by both loops.

use std::time::Duration;

use thiserror::Error;

/// Stream receiving one record per process sample.
pub const METRICS_STREAM: &str = "system:metrics";
/// Pub/sub channel carrying inbound control commands.
pub const COMMANDS_CHANNEL: &str = "system:commands";
/// Producer cadence: one batch per tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(2);
/// Upper bound on samples per tick.
pub const BATCH_SIZE: usize = 8;
/// Bound on the initial handshake only; steady-state calls block indefinitely.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 6379;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("REDIS_PORT is not a usable TCP port: {0:?}")]
    InvalidPort(String),
}

/// Immutable once resolved at startup.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub host: String,
    pub port: u16,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match std::env::var("REDIS_PORT") {
            Ok(raw) => match parse_port(&raw) {
                0 => return Err(ConfigError::InvalidPort(raw)),
                p => p,
            },
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn broker_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

// Non-numeric or out-of-range input collapses to 0, which is not a routable
// port; `from_env` rejects it.
fn parse_port(raw: &str) -> u16 {
    raw.trim().parse::<u16>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_port_parses() {
        assert_eq!(parse_port("6380"), 6380);
        assert_eq!(parse_port(" 6379 "), 6379);
    }

    #[test]
    fn junk_port_collapses_to_zero() {
        assert_eq!(parse_port("not-a-port"), 0);
        assert_eq!(parse_port(""), 0);
        assert_eq!(parse_port("70000"), 0);
    }

    #[test]
    fn broker_url_formats_host_and_port() {
        let cfg = AgentConfig {
            host: "redis.internal".into(),
            port: 6380,
        };
        assert_eq!(cfg.broker_url(), "redis://redis.internal:6380");
    }
}
