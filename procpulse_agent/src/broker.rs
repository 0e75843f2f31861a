//! Ownership wrappers around the two broker connections. Subscribing switches
//! a Redis connection into pub/sub mode, after which it cannot serve normal
//! request/response commands, so appends always travel on their own
//! connection and neither loop ever shares a handle.

use std::time::Duration;

use redis::aio::{MultiplexedConnection, PubSub};
use redis::{Client, RedisError};
use thiserror::Error;
use tracing::debug;

use crate::config::{AgentConfig, CONNECT_TIMEOUT};

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },
    #[error("broker connect to {addr} failed: {source}")]
    Connect { addr: String, source: RedisError },
    #[error("append to stream '{stream}' failed: {source}")]
    Append { stream: String, source: RedisError },
    #[error("subscribe to channel '{channel}' failed: {source}")]
    Subscribe { channel: String, source: RedisError },
}

impl BrokerError {
    /// True when the underlying connection is gone or unusable; the owning
    /// loop must exit instead of retrying on a dead handle. A server-side
    /// error reply (rejected append) is not fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            BrokerError::ConnectTimeout { .. }
            | BrokerError::Connect { .. }
            | BrokerError::Subscribe { .. } => true,
            BrokerError::Append { source, .. } => {
                source.is_connection_dropped()
                    || source.is_io_error()
                    || source.is_unrecoverable_error()
            }
        }
    }
}

async fn open_with_timeout<T, F>(addr: &str, fut: F) -> Result<T, BrokerError>
where
    F: std::future::Future<Output = Result<T, RedisError>>,
{
    tokio::time::timeout(CONNECT_TIMEOUT, fut)
        .await
        .map_err(|_| BrokerError::ConnectTimeout {
            addr: addr.to_string(),
            timeout: CONNECT_TIMEOUT,
        })?
        .map_err(|source| BrokerError::Connect {
            addr: addr.to_string(),
            source,
        })
}

/// Append-side handle; exclusively owned by the producer loop.
pub struct BrokerClient {
    conn: MultiplexedConnection,
}

impl BrokerClient {
    /// Bounded handshake: refused, timed out, and protocol failures all
    /// surface here, before the agent starts either loop.
    pub async fn connect(cfg: &AgentConfig) -> Result<Self, BrokerError> {
        let addr = cfg.broker_url();
        let client = Client::open(addr.as_str()).map_err(|source| BrokerError::Connect {
            addr: addr.clone(),
            source,
        })?;
        let conn = open_with_timeout(&addr, client.get_multiplexed_async_connection()).await?;
        debug!("append connection established");
        Ok(Self { conn })
    }

    /// `XADD <stream> * data <payload>`; the server assigns the record id.
    pub async fn append(&mut self, stream: &str, payload: &[u8]) -> Result<String, BrokerError> {
        redis::cmd("XADD")
            .arg(stream)
            .arg("*")
            .arg("data")
            .arg(payload)
            .query_async(&mut self.conn)
            .await
            .map_err(|source| BrokerError::Append {
                stream: stream.to_string(),
                source,
            })
    }
}

/// Subscription-side handle; exclusively owned by the consumer loop.
pub struct BrokerSubscriber {
    pubsub: PubSub,
}

impl BrokerSubscriber {
    pub async fn connect(cfg: &AgentConfig) -> Result<Self, BrokerError> {
        let addr = cfg.broker_url();
        let client = Client::open(addr.as_str()).map_err(|source| BrokerError::Connect {
            addr: addr.clone(),
            source,
        })?;
        let pubsub = open_with_timeout(&addr, client.get_async_pubsub()).await?;
        debug!("subscription connection established");
        Ok(Self { pubsub })
    }

    /// Long-lived subscription. Confirmation frames are consumed inside the
    /// client library; published messages arrive via [`Self::messages`].
    pub async fn subscribe(&mut self, channel: &str) -> Result<(), BrokerError> {
        self.pubsub
            .subscribe(channel)
            .await
            .map_err(|source| BrokerError::Subscribe {
                channel: channel.to_string(),
                source,
            })
    }

    /// Stream of published frames. Ends when the broker drops the connection.
    pub fn messages(&mut self) -> impl futures_util::Stream<Item = redis::Msg> + '_ {
        self.pubsub.on_message()
    }
}
