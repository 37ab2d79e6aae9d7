//! Builders for individual Envoy messages.
//!
//! Each function turns one graph node, or a piece of one, into the message
//! Envoy expects. The visitors in the crate root decide what to build; these
//! functions only decide how.

pub mod cluster;
pub mod endpoint;
pub mod listener;
pub mod lua;
pub mod route;
pub mod secret;
pub mod tls;

use std::time::Duration;

/// Convert to the protobuf duration, saturating at the protobuf range.
pub(crate) fn duration(d: Duration) -> prost_types::Duration {
    prost_types::Duration {
        seconds: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        nanos: i32::try_from(d.subsec_nanos()).unwrap_or(0),
    }
}
