//! # Domain Invariants
//!
//! Properties of the store and ledger that hold after every committed call.
//! The engine re-checks the identifiers a commit touched when configured to.
//!
//! - Supply cap: an active capped identifier never has more units minted
//!   than its cap, or than the units that existed when its terms loaded.
//! - Vault: active terms always name a non-zero vault.
//! - Circulation: units held across all holders never exceed units minted.

use crate::domain::ledger::Ledger;
use crate::domain::provenance::{ProvenanceEntry, ProvenanceStore};
use orb_types::{TokenId, U256};
use std::collections::HashSet;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Minted units stay within the supply ceiling of active terms.
#[must_use]
pub fn check_supply_cap_invariant(entry: &ProvenanceEntry) -> bool {
    match entry.supply_ceiling() {
        Some(ceiling) => U256::from(entry.total_supply) <= ceiling,
        None => true,
    }
}

/// Active terms name a vault.
#[must_use]
pub fn check_vault_invariant(entry: &ProvenanceEntry) -> bool {
    entry.terms().map_or(true, |t| !t.vault.is_zero())
}

/// Units held never exceed units minted.
#[must_use]
pub fn check_circulation_invariant(entry: &ProvenanceEntry, circulating: u128) -> bool {
    circulating <= u128::from(entry.total_supply)
}

/// Check all invariants over every identifier the store or ledger knows.
#[must_use]
pub fn check_all_invariants(store: &ProvenanceStore, ledger: &Ledger) -> InvariantCheckResult {
    let ids: HashSet<TokenId> = store
        .iter()
        .map(|(id, _)| *id)
        .chain(ledger.balances().map(|(_, id, _)| id))
        .collect();

    check_invariants_for(store, ledger, ids)
}

/// Check all invariants for the given identifiers only.
///
/// Cost is linear in the number of ids, independent of store size.
#[must_use]
pub fn check_invariants_for(
    store: &ProvenanceStore,
    ledger: &Ledger,
    ids: impl IntoIterator<Item = TokenId>,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    for id in ids {
        let entry = store.entry(id);

        if !check_supply_cap_invariant(&entry) {
            violations.push(InvariantViolation::SupplyCapExceeded {
                id,
                total_supply: entry.total_supply,
                cap: entry.supply_ceiling().unwrap_or_default(),
            });
        }

        if !check_vault_invariant(&entry) {
            violations.push(InvariantViolation::ZeroVault { id });
        }

        let circulating = ledger.circulating(id);
        if !check_circulation_invariant(&entry, circulating) {
            violations.push(InvariantViolation::CirculationExceedsSupply {
                id,
                circulating,
                total_supply: entry.total_supply,
            });
        }
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More units minted than the cap allows.
    SupplyCapExceeded {
        /// Offending identifier.
        id: TokenId,
        /// Units minted so far.
        total_supply: u64,
        /// Ceiling in force: the cap, or the units minted at load if higher.
        cap: U256,
    },
    /// Active terms with the zero vault.
    ZeroVault {
        /// Offending identifier.
        id: TokenId,
    },
    /// More units held than ever minted.
    CirculationExceedsSupply {
        /// Offending identifier.
        id: TokenId,
        /// Units held across all holders.
        circulating: u128,
        /// Units minted so far.
        total_supply: u64,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SupplyCapExceeded {
                id,
                total_supply,
                cap,
            } => write!(f, "supply cap exceeded for {id}: {total_supply} > {cap}"),
            Self::ZeroVault { id } => write!(f, "active terms without vault for {id}"),
            Self::CirculationExceedsSupply {
                id,
                circulating,
                total_supply,
            } => write!(
                f,
                "circulation exceeds supply for {id}: {circulating} > {total_supply}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::pack_max_supply;
    use crate::domain::provenance::{ProvenanceState, Terms};
    use orb_types::Address;

    fn capped(cap: u64, minted: u64) -> ProvenanceEntry {
        ProvenanceEntry {
            state: ProvenanceState::Active(Terms {
                max_supply: pack_max_supply(cap, 0),
                price: U256::zero(),
                closure: 0,
                vault: Address::repeat_byte(1),
            }),
            total_supply: minted,
            funded: false,
            supply_at_load: 0,
        }
    }

    #[test]
    fn test_empty_state_valid() {
        assert!(check_all_invariants(&ProvenanceStore::new(), &Ledger::new()).is_valid());
    }

    #[test]
    fn test_cap_violation_detected() {
        let id = TokenId::from(1u64);
        let mut store = ProvenanceStore::new();
        store.put(id, capped(2, 3));

        assert_eq!(
            check_all_invariants(&store, &Ledger::new()),
            InvariantCheckResult::Invalid(vec![InvariantViolation::SupplyCapExceeded {
                id,
                total_supply: 3,
                cap: U256::from(2u64),
            }])
        );
    }

    #[test]
    fn test_zero_vault_detected() {
        let mut entry = capped(2, 0);
        if let ProvenanceState::Active(terms) = &mut entry.state {
            terms.vault = Address::ZERO;
        }
        assert!(!check_vault_invariant(&entry));
    }

    #[test]
    fn test_circulation_without_mint_detected() {
        let id = TokenId::from(1u64);
        let mut ledger = Ledger::new();
        ledger.set_balance(Address::repeat_byte(2), id, 1);

        let result = check_all_invariants(&ProvenanceStore::new(), &ledger);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_cap_below_units_at_load_is_valid() {
        let id = TokenId::from(1u64);
        let mut entry = capped(2, 5);
        entry.supply_at_load = 5;

        let mut store = ProvenanceStore::new();
        store.put(id, entry);
        assert!(check_all_invariants(&store, &Ledger::new()).is_valid());
    }

    #[test]
    fn test_check_for_ignores_untouched_ids() {
        let broken = TokenId::from(1u64);
        let healthy = TokenId::from(2u64);
        let mut store = ProvenanceStore::new();
        store.put(broken, capped(2, 3));
        store.put(healthy, capped(2, 1));

        assert!(check_invariants_for(&store, &Ledger::new(), [healthy]).is_valid());
        assert!(!check_invariants_for(&store, &Ledger::new(), [healthy, broken]).is_valid());
    }
}
