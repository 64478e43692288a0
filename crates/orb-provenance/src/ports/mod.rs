//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Port (Inbound)**: `OrbApi`
//! - **Driven Port (Outbound)**: `Clock`, plus `orb_bus::EventPublisher`
//!   for lifecycle events

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
