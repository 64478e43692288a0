//! # Domain Layer (Inner Hexagon)
//!
//! Pure logic for Orb identity and provenance.
//! NO I/O, NO clock, NO event publishing.
//!
//! - `color_map`, `codec`, `validator`: the identifier and its meaning
//! - `provenance`, `ledger`, `changes`: per-identifier state and how it moves
//! - `metadata`, `invariants`: derived views and consistency checks

pub mod changes;
pub mod codec;
pub mod color_map;
pub mod invariants;
pub mod ledger;
pub mod metadata;
pub mod provenance;
pub mod validator;

pub use changes::*;
pub use codec::*;
pub use color_map::*;
pub use invariants::*;
pub use ledger::*;
pub use metadata::*;
pub use provenance::*;
pub use validator::*;
