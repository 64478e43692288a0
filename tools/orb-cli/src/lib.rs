//! # Orb CLI
//!
//! Command line access to the Orb identity codec and lifecycle engine.
//!
//! ## Modules
//!
//! - `commands`: one-shot codec, validation, metadata and packing commands
//! - `script`: replay of a JSON script of lifecycle calls on a controlled clock

pub mod commands;
pub mod script;
