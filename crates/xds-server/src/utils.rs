//! Shared utilities for xds-server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global counter for generating unique nonces.
static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique nonce for a discovery response.
///
/// The format is `{timestamp_hex}-{counter_hex}`. The counter alone keeps
/// nonces unique within a process; the timestamp keeps them from repeating
/// across restarts, which a proxy reconnecting to a new instance would
/// otherwise see.
pub fn generate_nonce() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let count = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:x}", timestamp, count)
}
