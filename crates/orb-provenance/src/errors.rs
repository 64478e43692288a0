//! # Error Types
//!
//! All error types for the identity codec and the lifecycle engine.

use orb_types::{Timestamp, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ORB ERRORS
// =============================================================================

/// Errors returned by the codec, the validator and every lifecycle call.
///
/// A failed lifecycle call never leaves partial state behind, so every
/// variant is safe to surface to the caller verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrbError {
    /// Encoding a color map with no non-empty color.
    #[error("invalid color map: every color is empty")]
    InvalidColorMap,

    /// The identifier carries no color bits, or no stop is in use.
    #[error("isValid: no colors")]
    NoColors,

    /// An addressed color slot has the reserved domain 0.
    #[error("isValid: invalid color domain (slot {slot})")]
    InvalidColorDomain {
        /// First offending slot, `0..7`.
        slot: usize,
    },

    /// Declared color count disagrees with the non-empty colors.
    #[error("isValid: invalid color count: declared {declared}, found {actual}")]
    InvalidColorCount {
        /// Count stored in the metadata bits.
        declared: u8,
        /// Stops actually in use.
        actual: u8,
    },

    /// Gradient focal point outside the polar range.
    #[error("isValid: invalid gradient coordinates ({x}, {y})")]
    InvalidCoordinates {
        /// Decoded x.
        x: u16,
        /// Decoded y.
        y: u16,
    },

    /// Caller may not install terms, or the new vault is zero.
    #[error("load: invalid vault configuration")]
    InvalidVaultConfiguration,

    /// Supply cap is malformed: zero units, or a closure without a cap.
    #[error("load: invalid max supply configuration")]
    InvalidMaxSupplyConfiguration,

    /// Closure lies in the past or shortens an active closure.
    #[error("load: invalid closure configuration: closure {closure}, now {now}")]
    InvalidClosureConfiguration {
        /// Requested closure.
        closure: Timestamp,
        /// Clock reading for the call.
        now: Timestamp,
    },

    /// Funds sent differ from the exact amount owed.
    #[error("invalid funding: expected {expected}, got {actual}")]
    InvalidFunding {
        /// Exact amount owed.
        expected: U256,
        /// Amount sent.
        actual: U256,
    },

    /// Minting would pass the supply cap.
    #[error("mint: totalSupply exceeded: {minted} minted + {requested} requested > {max}")]
    TotalSupplyExceeded {
        /// Units asked for.
        requested: u64,
        /// Units minted before the call.
        minted: u64,
        /// Cap of the active terms.
        max: U256,
    },

    /// Fork source and destination are the same identifier.
    #[error("fork: forked provenance is same as new")]
    ForkedProvenanceSameAsNew,

    /// Fork source has no active terms.
    #[error("fork: forked provenance not found")]
    ForkedProvenanceNotFound,

    /// Only the vault of active terms may forfeit them.
    #[error("forfeit: invalid caller")]
    InvalidCaller,

    /// Holder owns fewer units than requested.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Units asked for.
        required: u64,
        /// Units held.
        available: u64,
    },

    /// Zero units requested.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Minting after the closure timestamp.
    #[error("mint: provenance closed at {closure}, now {now}")]
    ProvenanceClosed {
        /// Closure of the active terms.
        closure: Timestamp,
        /// Clock reading for the call.
        now: Timestamp,
    },

    /// Transfer by someone who is neither the holder nor an approved operator.
    #[error("caller is not owner nor approved")]
    NotAuthorized,

    /// Units sent to the zero address.
    #[error("invalid recipient: zero address")]
    InvalidRecipient,

    /// Batch inputs of different lengths.
    #[error("batch length mismatch: {ids} ids, {values} values")]
    BatchLengthMismatch {
        /// Number of ids.
        ids: usize,
        /// Number of amounts.
        values: usize,
    },
}

impl OrbError {
    /// The fieldless kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidColorMap => ErrorKind::InvalidColorMap,
            Self::NoColors => ErrorKind::NoColors,
            Self::InvalidColorDomain { .. } => ErrorKind::InvalidColorDomain,
            Self::InvalidColorCount { .. } => ErrorKind::InvalidColorCount,
            Self::InvalidCoordinates { .. } => ErrorKind::InvalidCoordinates,
            Self::InvalidVaultConfiguration => ErrorKind::InvalidVaultConfiguration,
            Self::InvalidMaxSupplyConfiguration => ErrorKind::InvalidMaxSupplyConfiguration,
            Self::InvalidClosureConfiguration { .. } => ErrorKind::InvalidClosureConfiguration,
            Self::InvalidFunding { .. } => ErrorKind::InvalidFunding,
            Self::TotalSupplyExceeded { .. } => ErrorKind::TotalSupplyExceeded,
            Self::ForkedProvenanceSameAsNew => ErrorKind::ForkedProvenanceSameAsNew,
            Self::ForkedProvenanceNotFound => ErrorKind::ForkedProvenanceNotFound,
            Self::InvalidCaller => ErrorKind::InvalidCaller,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::InvalidAmount => ErrorKind::InvalidAmount,
            Self::ProvenanceClosed { .. } => ErrorKind::ProvenanceClosed,
            Self::NotAuthorized => ErrorKind::NotAuthorized,
            Self::InvalidRecipient => ErrorKind::InvalidRecipient,
            Self::BatchLengthMismatch { .. } => ErrorKind::BatchLengthMismatch,
        }
    }

    /// Returns true if the identifier itself was rejected.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NoColors
                | ErrorKind::InvalidColorDomain
                | ErrorKind::InvalidColorCount
                | ErrorKind::InvalidCoordinates
        )
    }
}

// =============================================================================
// ERROR KIND
// =============================================================================

/// Tag of an [`OrbError`] without its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Encoding a blank color map.
    InvalidColorMap,
    /// No color bits or no stop in use.
    NoColors,
    /// Addressed slot at domain 0.
    InvalidColorDomain,
    /// Declared count disagrees with the stops.
    InvalidColorCount,
    /// Focal point out of range.
    InvalidCoordinates,
    /// Caller may not install the vault.
    InvalidVaultConfiguration,
    /// Malformed supply cap.
    InvalidMaxSupplyConfiguration,
    /// Closure in the past or shortened.
    InvalidClosureConfiguration,
    /// Funds differ from the amount owed.
    InvalidFunding,
    /// Mint passes the cap.
    TotalSupplyExceeded,
    /// Fork onto the same identifier.
    ForkedProvenanceSameAsNew,
    /// Fork from inactive terms.
    ForkedProvenanceNotFound,
    /// Forfeit by someone other than the vault.
    InvalidCaller,
    /// Too few units held.
    InsufficientBalance,
    /// Zero units.
    InvalidAmount,
    /// Mint after closure.
    ProvenanceClosed,
    /// Transfer without ownership or approval.
    NotAuthorized,
    /// Zero address recipient.
    InvalidRecipient,
    /// Batch inputs differ in length.
    BatchLengthMismatch,
}

impl ErrorKind {
    /// Stable name, used as a metric label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidColorMap => "InvalidColorMap",
            Self::NoColors => "NoColors",
            Self::InvalidColorDomain => "InvalidColorDomain",
            Self::InvalidColorCount => "InvalidColorCount",
            Self::InvalidCoordinates => "InvalidCoordinates",
            Self::InvalidVaultConfiguration => "InvalidVaultConfiguration",
            Self::InvalidMaxSupplyConfiguration => "InvalidMaxSupplyConfiguration",
            Self::InvalidClosureConfiguration => "InvalidClosureConfiguration",
            Self::InvalidFunding => "InvalidFunding",
            Self::TotalSupplyExceeded => "TotalSupplyExceeded",
            Self::ForkedProvenanceSameAsNew => "ForkedProvenanceSameAsNew",
            Self::ForkedProvenanceNotFound => "ForkedProvenanceNotFound",
            Self::InvalidCaller => "InvalidCaller",
            Self::InsufficientBalance => "InsufficientBalance",
            Self::InvalidAmount => "InvalidAmount",
            Self::ProvenanceClosed => "ProvenanceClosed",
            Self::NotAuthorized => "NotAuthorized",
            Self::InvalidRecipient => "InvalidRecipient",
            Self::BatchLengthMismatch => "BatchLengthMismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
