//! # Orb Types Crate
//!
//! Primitive types shared by the Orb crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that appears in an event, a CLI
//!   script or an engine signature is defined here.
//! - **Stable Wire Shapes**: token ids serialize as decimal strings and
//!   addresses as `0x`-prefixed hex, matching how indexers and wallets print
//!   them.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
