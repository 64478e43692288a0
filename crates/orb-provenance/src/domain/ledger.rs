//! # Balance Ledger
//!
//! Unit balances per `(holder, id)`, withdrawable funds per vault, and
//! operator approvals. Plain data: the rules live in the engine.

use orb_types::{Address, TokenId, U256};
use std::collections::{HashMap, HashSet};

/// Multi-token balances and vault funds.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<(Address, TokenId), u64>,
    circulating: HashMap<TokenId, u128>,
    pending: HashMap<Address, U256>,
    approvals: HashSet<(Address, Address)>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units of `id` held by `holder`.
    #[must_use]
    pub fn balance_of(&self, holder: Address, id: TokenId) -> u64 {
        self.balances.get(&(holder, id)).copied().unwrap_or(0)
    }

    /// Funds `vault` can withdraw.
    #[must_use]
    pub fn pending_of(&self, vault: Address) -> U256 {
        self.pending.get(&vault).copied().unwrap_or_default()
    }

    /// Whether `operator` may move every token of `owner`.
    #[must_use]
    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.approvals.contains(&(owner, operator))
    }

    /// Units of `id` held across all holders.
    #[must_use]
    pub fn circulating(&self, id: TokenId) -> u128 {
        self.circulating.get(&id).copied().unwrap_or(0)
    }

    /// Every `(holder, id, units)` with a non-zero balance.
    pub fn balances(&self) -> impl Iterator<Item = (Address, TokenId, u64)> + '_ {
        self.balances
            .iter()
            .map(|((holder, id), units)| (*holder, *id, *units))
    }

    /// Sum of all withdrawable funds.
    #[must_use]
    pub fn total_pending(&self) -> U256 {
        self.pending
            .values()
            .fold(U256::zero(), |acc, v| acc.saturating_add(*v))
    }

    /// Overwrite a balance. Zero removes the entry.
    pub fn set_balance(&mut self, holder: Address, id: TokenId, units: u64) {
        let previous = if units == 0 {
            self.balances.remove(&(holder, id))
        } else {
            self.balances.insert((holder, id), units)
        };

        // u64 balances summed in u128 cannot overflow in practice.
        let total = self.circulating.entry(id).or_insert(0);
        *total = total
            .saturating_sub(u128::from(previous.unwrap_or(0)))
            .saturating_add(u128::from(units));
        if *total == 0 {
            self.circulating.remove(&id);
        }
    }

    /// Overwrite a vault's withdrawable funds. Zero removes the entry.
    pub fn set_pending(&mut self, vault: Address, amount: U256) {
        if amount.is_zero() {
            self.pending.remove(&vault);
        } else {
            self.pending.insert(vault, amount);
        }
    }

    /// Grant or revoke an operator.
    pub fn set_approval(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.approvals.insert((owner, operator));
        } else {
            self.approvals.remove(&(owner, operator));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_read_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance_of(Address::repeat_byte(1), TokenId::from(1u64)), 0);
        assert!(ledger.pending_of(Address::repeat_byte(1)).is_zero());
    }

    #[test]
    fn test_zero_balance_removed() {
        let mut ledger = Ledger::new();
        let holder = Address::repeat_byte(1);
        let id = TokenId::from(7u64);

        ledger.set_balance(holder, id, 3);
        ledger.set_balance(Address::repeat_byte(2), id, 4);
        assert_eq!(ledger.circulating(id), 7);

        ledger.set_balance(holder, id, 0);
        assert_eq!(ledger.balances().count(), 1);
        assert_eq!(ledger.circulating(id), 4);
    }

    #[test]
    fn test_circulating_follows_overwrites() {
        let mut ledger = Ledger::new();
        let holder = Address::repeat_byte(1);
        let id = TokenId::from(7u64);

        ledger.set_balance(holder, id, 10);
        ledger.set_balance(holder, id, 3);
        assert_eq!(ledger.circulating(id), 3);

        ledger.set_balance(holder, id, 0);
        assert_eq!(ledger.circulating(id), 0);
        assert_eq!(ledger.circulating(TokenId::from(8u64)), 0);
    }

    #[test]
    fn test_approval_toggle() {
        let mut ledger = Ledger::new();
        let owner = Address::repeat_byte(1);
        let operator = Address::repeat_byte(2);

        ledger.set_approval(owner, operator, true);
        assert!(ledger.is_approved_for_all(owner, operator));
        assert!(!ledger.is_approved_for_all(operator, owner));

        ledger.set_approval(owner, operator, false);
        assert!(!ledger.is_approved_for_all(owner, operator));
    }

    #[test]
    fn test_total_pending() {
        let mut ledger = Ledger::new();
        ledger.set_pending(Address::repeat_byte(1), U256::from(5u64));
        ledger.set_pending(Address::repeat_byte(2), U256::from(7u64));
        assert_eq!(ledger.total_pending(), U256::from(12u64));
    }
}
