//! Producer loop: one batch of process samples per tick, each appended to the
//! metrics stream in order.

use anyhow::Context;
use tokio::time::sleep;
use tracing::{error, trace};

use crate::broker::BrokerClient;
use crate::config::{BATCH_SIZE, METRICS_STREAM, TICK_INTERVAL};
use crate::probe::MetricProbe;

/// Runs until the append connection dies. A server-side rejection only skips
/// that sample; a dead connection ends the loop, and with it the agent.
pub async fn run(
    mut client: BrokerClient,
    mut probe: Box<dyn MetricProbe + Send>,
) -> anyhow::Result<()> {
    loop {
        let batch = probe.sample(BATCH_SIZE);
        for sample in &batch {
            let payload = serde_json::to_vec(sample).context("serialize process sample")?;
            match client.append(METRICS_STREAM, &payload).await {
                Ok(id) => trace!(%id, pid = sample.pid, "appended sample"),
                Err(err) if err.is_fatal() => {
                    error!("{err}");
                    return Err(err).context("metrics stream connection lost");
                }
                Err(err) => error!("append rejected: {err}"),
            }
        }
        sleep(TICK_INTERVAL).await;
    }
}
