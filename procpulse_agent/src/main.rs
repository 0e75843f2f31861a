//! Entry point: resolves config, establishes both broker connections, then
//! supervises the producer and consumer loops.

mod broker;
mod commands;
mod config;
mod consumer;
mod probe;
mod producer;
mod types;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use broker::{BrokerClient, BrokerSubscriber};
use config::{AgentConfig, COMMANDS_CHANNEL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = AgentConfig::from_env().context("resolve agent configuration")?;
    info!(host = %cfg.host, port = cfg.port, "starting procpulse agent");

    // Both connections must come up before either loop starts; a failure here
    // exits 1 without a single append or subscribe on the wire.
    let client = BrokerClient::connect(&cfg)
        .await
        .context("metrics connection failed")?;
    let subscriber = BrokerSubscriber::connect(&cfg)
        .await
        .context("command connection failed")?;

    let probe = probe::from_env();
    let consumer = tokio::spawn(consumer::run(subscriber, COMMANDS_CHANNEL));

    let result = producer::run(client, probe).await;

    // Producer is done, which only happens on a fatal error: release the
    // subscription side as well, then wait for the consumer task to finish.
    consumer.abort();
    let _ = consumer.await;
    result
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
