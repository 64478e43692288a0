//! # Provenance Store
//!
//! Per-identifier economic terms and the rules for changing them.
//!
//! Each identifier carries an explicit state tag:
//!
//! ```text
//! Unset ──load──▶ Active ──forfeit──▶ Forfeited
//!                   ▲  │                  │
//!                   └──┘ load             │ load
//!                   ▲                     │
//!                   └─────────────────────┘
//! ```
//!
//! Every mutation comes in two halves: `plan_*` computes the next entry
//! without touching the store, and the engine commits it once every other
//! check of the call has passed. `set_on_load`, `record_mint` and `reset`
//! run both halves at once for callers that need no staging.

use crate::domain::codec::{MaxSupply, Price};
use crate::errors::OrbError;
use orb_types::{Address, Provenance, Timestamp, TokenId, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// TERMS
// =============================================================================

/// Active economic terms of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terms {
    /// Packed supply cap, 0 = uncapped.
    pub max_supply: U256,
    /// Packed unit price, 0 = free.
    pub price: U256,
    /// Minting stops after this timestamp, 0 = never.
    pub closure: Timestamp,
    /// Controller and beneficiary.
    pub vault: Address,
}

impl Terms {
    /// Terms carried by a provenance record. Its supply counter is ignored.
    #[must_use]
    pub fn from_provenance(provenance: &Provenance) -> Self {
        Self {
            max_supply: provenance.max_supply,
            price: provenance.price,
            closure: provenance.closure,
            vault: provenance.vault,
        }
    }

    /// Unit cap, or `None` when uncapped.
    #[must_use]
    pub fn cap(&self) -> Option<U256> {
        if self.max_supply.is_zero() {
            None
        } else {
            Some(MaxSupply::unpack(self.max_supply).supply)
        }
    }

    /// Unpacked unit price.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::unpack(self.price)
    }

    /// Minting is over at `now`.
    #[must_use]
    pub fn is_closed_at(&self, now: Timestamp) -> bool {
        self.closure != 0 && now > self.closure
    }

    fn closure_pending_at(&self, now: Timestamp) -> bool {
        self.closure != 0 && self.closure >= now
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Lifecycle state of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "terms")]
pub enum ProvenanceState {
    /// Terms never loaded.
    #[default]
    Unset,
    /// Terms in force.
    Active(Terms),
    /// Terms given up by their vault.
    Forfeited,
}

impl ProvenanceState {
    /// Terms in force, if any.
    #[must_use]
    pub fn terms(&self) -> Option<&Terms> {
        match self {
            Self::Active(terms) => Some(terms),
            Self::Unset | Self::Forfeited => None,
        }
    }

    /// Returns true in the `Active` state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Active(_) => "active",
            Self::Forfeited => "forfeited",
        }
    }
}

/// Everything the engine remembers about one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Lifecycle state.
    pub state: ProvenanceState,
    /// Units minted over the identifier's whole life. Survives forfeit and
    /// is not reduced by burns.
    pub total_supply: u64,
    /// Funds were credited to a vault for this identifier at least once.
    pub funded: bool,
    /// `total_supply` when the terms in force were loaded. Terms may cap
    /// below units that already exist; those units stay valid.
    #[serde(default)]
    pub supply_at_load: u64,
}

impl ProvenanceEntry {
    /// Units exist or money has moved, so the terms have an owner.
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.total_supply > 0 || self.funded
    }

    /// Terms in force, if any.
    #[must_use]
    pub fn terms(&self) -> Option<&Terms> {
        self.state.terms()
    }

    /// Highest `total_supply` the terms in force allow: their cap, or the
    /// units already minted when they were loaded if that is higher.
    /// `None` when uncapped.
    #[must_use]
    pub fn supply_ceiling(&self) -> Option<U256> {
        self.terms()
            .and_then(Terms::cap)
            .map(|cap| cap.max(U256::from(self.supply_at_load)))
    }

    /// The flat record shape used on the wire. Zeroed terms when not active.
    #[must_use]
    pub fn to_provenance(&self) -> Provenance {
        let terms = self.terms();
        Provenance {
            max_supply: terms.map(|t| t.max_supply).unwrap_or_default(),
            price: terms.map(|t| t.price).unwrap_or_default(),
            total_supply: self.total_supply,
            closure: terms.map_or(0, |t| t.closure),
            vault: terms.map(|t| t.vault).unwrap_or_default(),
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Keyed store of provenance entries. Missing keys read as `Unset`.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceStore {
    entries: HashMap<TokenId, ProvenanceEntry>,
}

impl ProvenanceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entry for `id`.
    #[must_use]
    pub fn entry(&self, id: TokenId) -> ProvenanceEntry {
        self.entries.get(&id).copied().unwrap_or_default()
    }

    /// All stored entries.
    pub fn iter(&self) -> impl Iterator<Item = (&TokenId, &ProvenanceEntry)> {
        self.entries.iter()
    }

    /// Number of identifiers ever touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was ever stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite the entry for `id`.
    pub fn put(&mut self, id: TokenId, entry: ProvenanceEntry) {
        self.entries.insert(id, entry);
    }

    // -------------------------------------------------------------------------
    // LOAD
    // -------------------------------------------------------------------------

    /// Compute the entry that installing `provenance` on `id` would produce.
    ///
    /// Checks, in order: who may install terms, the supply cap, the closure.
    pub fn plan_load(
        &self,
        id: TokenId,
        provenance: &Provenance,
        caller: Address,
        now: Timestamp,
    ) -> Result<ProvenanceEntry, OrbError> {
        let current = self.entry(id);

        Self::check_controller(&current, provenance.vault, caller)?;
        Self::check_max_supply(provenance)?;
        Self::check_closure(&current, provenance.closure, now)?;

        Ok(ProvenanceEntry {
            state: ProvenanceState::Active(Terms::from_provenance(provenance)),
            supply_at_load: current.total_supply,
            ..current
        })
    }

    /// Install `provenance` on `id`.
    pub fn set_on_load(
        &mut self,
        id: TokenId,
        provenance: &Provenance,
        caller: Address,
        now: Timestamp,
    ) -> Result<(), OrbError> {
        let next = self.plan_load(id, provenance, caller, now)?;
        self.put(id, next);
        Ok(())
    }

    fn check_controller(
        current: &ProvenanceEntry,
        new_vault: Address,
        caller: Address,
    ) -> Result<(), OrbError> {
        if new_vault.is_zero() {
            return Err(OrbError::InvalidVaultConfiguration);
        }

        let allowed = match &current.state {
            ProvenanceState::Active(terms) if current.is_claimed() => caller == terms.vault,
            ProvenanceState::Active(_) => true,
            // Units already circulate from open minting: only self-claim.
            ProvenanceState::Unset | ProvenanceState::Forfeited if current.total_supply > 0 => {
                caller == new_vault
            }
            ProvenanceState::Unset | ProvenanceState::Forfeited => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(OrbError::InvalidVaultConfiguration)
        }
    }

    /// A cap below the units already minted is accepted: it only stops
    /// further mints.
    fn check_max_supply(provenance: &Provenance) -> Result<(), OrbError> {
        if provenance.max_supply.is_zero() {
            // A closure only makes sense for a capped edition.
            return if provenance.closure == 0 {
                Ok(())
            } else {
                Err(OrbError::InvalidMaxSupplyConfiguration)
            };
        }

        if MaxSupply::unpack(provenance.max_supply).supply.is_zero() {
            return Err(OrbError::InvalidMaxSupplyConfiguration);
        }
        Ok(())
    }

    fn check_closure(
        current: &ProvenanceEntry,
        closure: Timestamp,
        now: Timestamp,
    ) -> Result<(), OrbError> {
        if closure == 0 {
            return Ok(());
        }

        let invalid = OrbError::InvalidClosureConfiguration { closure, now };
        if closure < now {
            return Err(invalid);
        }

        match current.terms() {
            Some(terms) if terms.closure_pending_at(now) && closure < terms.closure => Err(invalid),
            _ => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // MINT
    // -------------------------------------------------------------------------

    /// Compute the entry after minting `amount` more units of `id`.
    pub fn plan_mint(&self, id: TokenId, amount: u64) -> Result<ProvenanceEntry, OrbError> {
        let current = self.entry(id);
        let cap = current.terms().and_then(Terms::cap);

        let exceeded = |max: U256| OrbError::TotalSupplyExceeded {
            requested: amount,
            minted: current.total_supply,
            max,
        };

        let total_supply = current
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| exceeded(cap.unwrap_or_else(|| U256::from(u64::MAX))))?;

        if let Some(max) = cap {
            if U256::from(total_supply) > max {
                return Err(exceeded(max));
            }
        }

        Ok(ProvenanceEntry {
            total_supply,
            ..current
        })
    }

    /// Count `amount` more minted units of `id`. Returns the new total.
    pub fn record_mint(&mut self, id: TokenId, amount: u64) -> Result<u64, OrbError> {
        let next = self.plan_mint(id, amount)?;
        self.put(id, next);
        Ok(next.total_supply)
    }

    // -------------------------------------------------------------------------
    // FORFEIT
    // -------------------------------------------------------------------------

    /// Compute the entry after `caller` forfeits the terms of `id`.
    pub fn plan_forfeit(&self, id: TokenId, caller: Address) -> Result<ProvenanceEntry, OrbError> {
        let current = self.entry(id);
        match current.terms() {
            Some(terms) if terms.vault == caller => Ok(ProvenanceEntry {
                state: ProvenanceState::Forfeited,
                ..current
            }),
            _ => Err(OrbError::InvalidCaller),
        }
    }

    /// Clear the terms of `id`. The supply counter is kept.
    pub fn reset(&mut self, id: TokenId, caller: Address) -> Result<(), OrbError> {
        let next = self.plan_forfeit(id, caller)?;
        self.put(id, next);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
