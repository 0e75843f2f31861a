//! Consumer loop: keeps the command subscription drained and hands every
//! well-formed payload to the dispatcher.

use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use crate::broker::BrokerSubscriber;
use crate::commands;

/// Runs until the subscription dies. Errors stay inside this loop; the
/// producer holds its own connection and notices loss on its own.
pub async fn run(mut subscriber: BrokerSubscriber, channel: &str) {
    if let Err(err) = subscriber.subscribe(channel).await {
        error!("{err}");
        return;
    }
    info!("subscribed to {channel}");

    let mut frames = subscriber.messages();
    while let Some(frame) = frames.next().await {
        // Only published message frames reach this point; a payload that is
        // not non-empty UTF-8 text is skipped without a diagnostic.
        let payload: String = match frame.get_payload() {
            Ok(p) => p,
            Err(_) => {
                debug!("skipping non-text frame");
                continue;
            }
        };
        if payload.is_empty() {
            continue;
        }
        commands::dispatch(&payload);
    }
    warn!("command subscription closed");
}
