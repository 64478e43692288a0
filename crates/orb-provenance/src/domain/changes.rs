//! # Staged State Changes
//!
//! A lifecycle call records its writes in a [`ChangeSet`] while it runs its
//! checks. Reads through the change set see earlier staged writes. Nothing
//! reaches the store or the ledger until the engine commits the set, so a
//! failed call leaves no trace.

use crate::domain::ledger::Ledger;
use crate::domain::provenance::ProvenanceEntry;
use crate::errors::OrbError;
use orb_types::{Address, TokenId, U256};

/// One write to apply on commit. Values are absolute, not deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// Replace a provenance entry.
    Provenance {
        /// Identifier.
        id: TokenId,
        /// New entry.
        entry: ProvenanceEntry,
    },
    /// Replace a unit balance.
    Balance {
        /// Holder.
        holder: Address,
        /// Identifier.
        id: TokenId,
        /// New balance.
        units: u64,
    },
    /// Replace a vault's withdrawable funds.
    Pending {
        /// Vault.
        vault: Address,
        /// New amount.
        amount: U256,
    },
    /// Set an operator approval.
    Approval {
        /// Holder.
        owner: Address,
        /// Operator.
        operator: Address,
        /// New status.
        approved: bool,
    },
}

/// Writes staged by one lifecycle call.
pub struct ChangeSet<'a> {
    ledger: &'a Ledger,
    changes: Vec<StateChange>,
}

impl<'a> ChangeSet<'a> {
    /// Start staging on top of `ledger`.
    #[must_use]
    pub fn new(ledger: &'a Ledger) -> Self {
        Self {
            ledger,
            changes: Vec::new(),
        }
    }

    /// Balance as it would be after the staged writes.
    #[must_use]
    pub fn balance_of(&self, holder: Address, id: TokenId) -> u64 {
        self.changes
            .iter()
            .rev()
            .find_map(|change| match change {
                StateChange::Balance {
                    holder: h,
                    id: i,
                    units,
                } if *h == holder && *i == id => Some(*units),
                _ => None,
            })
            .unwrap_or_else(|| self.ledger.balance_of(holder, id))
    }

    /// Withdrawable funds as they would be after the staged writes.
    #[must_use]
    pub fn pending_of(&self, vault: Address) -> U256 {
        self.changes
            .iter()
            .rev()
            .find_map(|change| match change {
                StateChange::Pending { vault: v, amount } if *v == vault => Some(*amount),
                _ => None,
            })
            .unwrap_or_else(|| self.ledger.pending_of(vault))
    }

    /// Add units to a holder.
    pub fn credit(&mut self, holder: Address, id: TokenId, units: u64) -> Result<(), OrbError> {
        let units = self
            .balance_of(holder, id)
            .checked_add(units)
            .ok_or(OrbError::InvalidAmount)?;
        self.changes.push(StateChange::Balance { holder, id, units });
        Ok(())
    }

    /// Remove units from a holder.
    pub fn debit(&mut self, holder: Address, id: TokenId, units: u64) -> Result<(), OrbError> {
        let available = self.balance_of(holder, id);
        let remaining =
            available
                .checked_sub(units)
                .ok_or(OrbError::InsufficientBalance {
                    required: units,
                    available,
                })?;
        self.changes.push(StateChange::Balance {
            holder,
            id,
            units: remaining,
        });
        Ok(())
    }

    /// Add funds to a vault. Zero is not recorded.
    pub fn add_pending(&mut self, vault: Address, amount: U256) -> Result<(), OrbError> {
        if amount.is_zero() {
            return Ok(());
        }
        let current = self.pending_of(vault);
        let amount = current
            .checked_add(amount)
            .ok_or(OrbError::InvalidFunding {
                expected: U256::MAX - current,
                actual: amount,
            })?;
        self.changes.push(StateChange::Pending { vault, amount });
        Ok(())
    }

    /// Zero a vault's funds and return what it held.
    pub fn drain_pending(&mut self, vault: Address) -> U256 {
        let amount = self.pending_of(vault);
        if !amount.is_zero() {
            self.changes.push(StateChange::Pending {
                vault,
                amount: U256::zero(),
            });
        }
        amount
    }

    /// Replace a provenance entry.
    pub fn set_provenance(&mut self, id: TokenId, entry: ProvenanceEntry) {
        self.changes.push(StateChange::Provenance { id, entry });
    }

    /// Set an operator approval.
    pub fn set_approval(&mut self, owner: Address, operator: Address, approved: bool) {
        self.changes.push(StateChange::Approval {
            owner,
            operator,
            approved,
        });
    }

    /// Number of staged writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Hand the staged writes over for commit.
    #[must_use]
    pub fn into_changes(self) -> Vec<StateChange> {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder() -> Address {
        Address::repeat_byte(1)
    }

    #[test]
    fn test_reads_see_staged_writes() {
        let mut ledger = Ledger::new();
        let id = TokenId::from(9u64);
        ledger.set_balance(holder(), id, 5);

        let mut set = ChangeSet::new(&ledger);
        set.debit(holder(), id, 2).unwrap();
        set.debit(holder(), id, 2).unwrap();

        assert_eq!(set.balance_of(holder(), id), 1);
        assert_eq!(
            set.debit(holder(), id, 2),
            Err(OrbError::InsufficientBalance {
                required: 2,
                available: 1
            })
        );
        // The ledger itself is untouched.
        assert_eq!(ledger.balance_of(holder(), id), 5);
    }

    #[test]
    fn test_pending_accumulates_and_drains() {
        let ledger = Ledger::new();
        let mut set = ChangeSet::new(&ledger);

        set.add_pending(holder(), U256::from(3u64)).unwrap();
        set.add_pending(holder(), U256::from(4u64)).unwrap();
        assert_eq!(set.pending_of(holder()), U256::from(7u64));

        assert_eq!(set.drain_pending(holder()), U256::from(7u64));
        assert!(set.pending_of(holder()).is_zero());
    }

    #[test]
    fn test_zero_funds_not_staged() {
        let ledger = Ledger::new();
        let mut set = ChangeSet::new(&ledger);
        set.add_pending(holder(), U256::zero()).unwrap();
        assert!(set.drain_pending(holder()).is_zero());
        assert!(set.is_empty());
    }
}
