//! # Orb Provenance - Identity & Lifecycle Engine
//!
//! ## Purpose
//!
//! An Orb token's identifier IS its artwork: a 256-bit packing of a radial
//! gradient's color map. This crate owns that packing and the economic
//! lifecycle around each identifier: loading supply and price terms,
//! minting against them, forking terms onto a new identifier, forfeiting
//! them, burning units and withdrawing vault funds.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | BitCodec | `domain/codec.rs` | Color map ⇄ identifier, packed supply and price |
//! | Validator | `domain/validator.rs` | Structural validity of an identifier |
//! | ProvenanceStore | `domain/provenance.rs` | Per-identifier terms and state tag |
//! | Ledger | `domain/ledger.rs` | Unit balances, vault funds, approvals |
//! | LifecycleEngine | `service.rs` | Atomic lifecycle calls, events, metrics |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Round-trip: `decode(encode(m)) == m` | `domain/codec.rs` |
//! | Encode fails iff every color is empty | `domain/codec.rs` - `encode()` |
//! | Every entry point validates its identifiers first | `service.rs` |
//! | Minted units never pass the cap | `domain/provenance.rs` - `plan_mint()` |
//! | Claimed terms change only by their vault | `domain/provenance.rs` - `check_controller()` |
//! | An active closure never moves earlier | `domain/provenance.rs` - `check_closure()` |
//! | Failed calls change nothing | `domain/changes.rs`, `service.rs` - `run()` |
//!
//! ## Outbound Dependencies
//!
//! | Port | Trait | Purpose |
//! |------|-------|---------|
//! | Time | `Clock` | Closure checks |
//! | Events | `orb_bus::EventPublisher` | Indexer feed |
//!
//! ## Usage Example
//!
//! ```ignore
//! use orb_provenance::prelude::*;
//!
//! let mut engine = LifecycleEngine::new(SystemClock, InMemoryEventBus::new(), EngineConfig::default());
//!
//! let id = encode(&map)?;
//! engine.load(id, provenance, U256::zero(), vault)?;
//! engine.mint(holder, id, 1, &[], U256::zero(), holder)?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Identity
    pub use crate::domain::codec::{
        decode, encode, pack_max_supply, pack_price, unpack_max_supply, unpack_price, MaxSupply,
        Price,
    };
    pub use crate::domain::color_map::{ColorEntry, ColorMap, COLOR_SLOTS, MAX_COORDINATE};
    pub use crate::domain::validator::is_valid;

    // Provenance
    pub use crate::domain::ledger::Ledger;
    pub use crate::domain::metadata::{Attribute, AttributeValue, TokenMetadata};
    pub use crate::domain::provenance::{
        ProvenanceEntry, ProvenanceState, ProvenanceStore, Terms,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, check_invariants_for, InvariantCheckResult, InvariantViolation,
    };

    // Ports & adapters
    pub use crate::adapters::{FixedClock, SystemClock};
    pub use crate::ports::inbound::OrbApi;
    pub use crate::ports::outbound::Clock;

    // Service
    pub use crate::config::EngineConfig;
    pub use crate::errors::{ErrorKind, OrbError};
    pub use crate::service::{EngineStats, LifecycleEngine};

    // Shared types
    pub use orb_bus::{EventFilter, EventPublisher, EventTopic, InMemoryEventBus, OrbEvent};
    pub use orb_types::{Address, Provenance, Timestamp, TokenId, U256};
}

// =============================================================================
// VERSION INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
