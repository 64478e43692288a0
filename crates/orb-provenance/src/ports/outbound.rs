//! # Driven Ports (SPI - Outbound)
//!
//! What the engine needs from its host. Events go out through
//! `orb_bus::EventPublisher`, which is defined with the event schema.

use orb_types::Timestamp;
use std::sync::Arc;

/// Source of the current time for closure checks.
///
/// The host's transactional substrate decides what "now" is for a call
/// (block time, wall clock, a replayed script). The engine reads it once
/// per call.
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
