use std::time::Instant;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::state::SharedState;

/// Periodically discard sessions idle for longer than the configured TTL.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().session_sweep());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let purged = state.sessions().purge_expired(Instant::now());
        if purged > 0 {
            info!(
                purged,
                remaining = state.sessions().len(),
                "expired random play sessions discarded"
            );
        } else {
            debug!(remaining = state.sessions().len(), "no expired session");
        }
    }
}
