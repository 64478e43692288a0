//! # Driving Ports (API - Inbound)
//!
//! The public surface of the engine. Every mutating call is all-or-nothing:
//! it either commits every write and returns the event it published, or
//! returns an error and changes nothing.
//!
//! The acting identity is always the last argument.

use crate::domain::color_map::ColorMap;
use crate::domain::metadata::TokenMetadata;
use crate::domain::provenance::ProvenanceState;
use crate::domain::{codec, validator};
use crate::errors::OrbError;
use orb_bus::OrbEvent;
use orb_types::{Address, Provenance, TokenId, U256};

/// Identity and provenance operations.
pub trait OrbApi {
    // =========================================================================
    // IDENTITY (stateless)
    // =========================================================================

    /// Encode a color map into its identifier.
    fn encode_color_map(&self, map: &ColorMap) -> Result<TokenId, OrbError> {
        codec::encode(map)
    }

    /// Decode any identifier.
    fn decode_color_map(&self, id: TokenId) -> ColorMap {
        codec::decode(id)
    }

    /// Decode and validate an identifier.
    fn is_valid(&self, id: TokenId) -> Result<ColorMap, OrbError> {
        validator::is_valid(id)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Install terms on `id`. Emits `Load`.
    fn load(
        &mut self,
        id: TokenId,
        provenance: Provenance,
        funds: U256,
        caller: Address,
    ) -> Result<OrbEvent, OrbError>;

    /// Mint `amount` units of `id` to `to`. Emits `TransferSingle`.
    fn mint(
        &mut self,
        to: Address,
        id: TokenId,
        amount: u64,
        data: &[u8],
        funds: U256,
        caller: Address,
    ) -> Result<OrbEvent, OrbError>;

    /// Install terms on `to_id` on the strength of `from_id`'s. Emits `Fork`.
    fn fork(
        &mut self,
        from_id: TokenId,
        to_id: TokenId,
        provenance: Provenance,
        funds: U256,
        caller: Address,
    ) -> Result<OrbEvent, OrbError>;

    /// Give up the terms of `id`. Emits `Forfeit`.
    fn forfeit(&mut self, id: TokenId, caller: Address) -> Result<OrbEvent, OrbError>;

    /// Destroy `amount` of the caller's units of `id`. Emits `TransferSingle`.
    fn burn(&mut self, id: TokenId, amount: u64, caller: Address) -> Result<OrbEvent, OrbError>;

    /// Pay out and zero the caller's withdrawable funds. Zero is not an error.
    fn withdraw(&mut self, caller: Address) -> U256;

    // =========================================================================
    // TRANSFERS & APPROVALS
    // =========================================================================

    /// Move units of one identifier. Emits `TransferSingle`.
    fn safe_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        id: TokenId,
        amount: u64,
        data: &[u8],
        caller: Address,
    ) -> Result<OrbEvent, OrbError>;

    /// Move units of several identifiers at once. Emits `TransferBatch`.
    fn safe_batch_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        ids: &[TokenId],
        amounts: &[u64],
        data: &[u8],
        caller: Address,
    ) -> Result<OrbEvent, OrbError>;

    /// Grant or revoke an operator for all the caller's units.
    /// Emits `ApprovalForAll`.
    fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
        caller: Address,
    ) -> Result<OrbEvent, OrbError>;

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Units of `id` held by `owner`.
    fn balance_of(&self, owner: Address, id: TokenId) -> u64;

    /// Balances for parallel lists of owners and ids.
    fn balance_of_batch(&self, owners: &[Address], ids: &[TokenId]) -> Result<Vec<u64>, OrbError>;

    /// Whether `operator` may move `owner`'s units.
    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;

    /// Flat provenance record of `id`, zeroed terms when none are active.
    fn provenance(&self, id: TokenId) -> Provenance;

    /// Lifecycle state of `id`.
    fn state(&self, id: TokenId) -> ProvenanceState;

    /// Funds `vault` can withdraw.
    fn pending_withdrawal(&self, vault: Address) -> U256;

    /// Units of `id` ever minted.
    fn total_supply(&self, id: TokenId) -> u64;

    /// Metadata document for a valid identifier.
    fn metadata(&self, id: TokenId) -> Result<TokenMetadata, OrbError>;
}
