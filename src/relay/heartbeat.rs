use std::sync::Arc;
use std::time::Duration;

use super::manager::RoomManager;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every relay session periodically.
///
/// Abort the returned handle on shutdown.
pub fn start_heartbeat(rooms: Arc<RoomManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = rooms.session_count().await;
            tracing::trace!(count, "Relay heartbeat ping");
            rooms.ping_all().await;
        }
    })
}
