//! # Orb Bus - Lifecycle Events for External Indexing
//!
//! Every committed lifecycle call emits exactly one event; failed calls emit
//! nothing. Indexers subscribe with an [`EventFilter`] and consume the stream.
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────┐
//! │ LifecycleEngine  │                    │   Indexer    │
//! │                  │    publish()       │              │
//! │                  │ ──────┐            │              │
//! └──────────────────┘       │            └──────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │ ─────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! Publishing is synchronous so the engine never suspends mid-call;
//! receiving is async (`recv`) or polling (`try_recv`).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, OrbEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
