//! # Lifecycle Engine
//!
//! Runs every lifecycle call as one atomic unit over the provenance store
//! and the balance ledger.
//!
//! ## Call Shape
//!
//! 1. Read the clock once.
//! 2. Validate the identifier(s).
//! 3. Run the call's checks in their fixed order, staging writes in a
//!    [`ChangeSet`].
//! 4. On success commit the staged writes, publish exactly one event.
//! 5. On failure drop the staged writes, publish nothing.
//!
//! Calls take `&mut self`: the host serializes them, so no call ever sees
//! another's partial state.

use crate::config::EngineConfig;
use crate::domain::changes::{ChangeSet, StateChange};
use crate::domain::codec::Price;
use crate::domain::invariants::{check_all_invariants, check_invariants_for, InvariantCheckResult};
use crate::domain::ledger::Ledger;
use crate::domain::metadata::{token_metadata, TokenMetadata};
use crate::domain::provenance::{ProvenanceEntry, ProvenanceState, ProvenanceStore};
use crate::domain::validator::is_valid;
use crate::errors::OrbError;
use crate::ports::inbound::OrbApi;
use crate::ports::outbound::Clock;

use orb_bus::{EventPublisher, OrbEvent};
use orb_telemetry::{
    log_token_event, HistogramTimer, LIFECYCLE_CALLS, LIFECYCLE_REJECTIONS, UNITS_BURNED,
    UNITS_MINTED, WITHDRAWALS,
};
use orb_types::{Address, Provenance, Timestamp, TokenId, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Counters kept by the engine itself.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Calls attempted, including withdraws.
    pub calls: u64,
    /// Calls rejected with an error.
    pub rejections: u64,
    /// Units minted.
    pub units_minted: u64,
    /// Units burned.
    pub units_burned: u64,
    /// Funds paid out by withdraws.
    pub funds_withdrawn: U256,
}

/// Writes and the event a successful call produces.
type Outcome = (Vec<StateChange>, OrbEvent);

/// The identity and provenance engine.
pub struct LifecycleEngine<C: Clock, P: EventPublisher> {
    config: EngineConfig,
    clock: C,
    publisher: P,
    store: ProvenanceStore,
    ledger: Ledger,
    stats: EngineStats,
}

impl<C: Clock, P: EventPublisher> LifecycleEngine<C, P> {
    /// Create an engine with empty state.
    pub fn new(clock: C, publisher: P, config: EngineConfig) -> Self {
        Self {
            config,
            clock,
            publisher,
            store: ProvenanceStore::new(),
            ledger: Ledger::new(),
            stats: EngineStats::default(),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current statistics.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Read access to the provenance store.
    pub fn store(&self) -> &ProvenanceStore {
        &self.store
    }

    /// Read access to the ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The event publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Check store and ledger invariants now.
    pub fn check_invariants(&self) -> InvariantCheckResult {
        check_all_invariants(&self.store, &self.ledger)
    }

    // =========================================================================
    // CALL PLUMBING
    // =========================================================================

    /// Run one call: stage, then commit and publish, or reject.
    fn run<F>(&mut self, operation: &'static str, stage: F) -> Result<OrbEvent, OrbError>
    where
        F: FnOnce(&Self, Timestamp) -> Result<Outcome, OrbError>,
    {
        let _timer = HistogramTimer::start(operation);
        LIFECYCLE_CALLS.with_label_values(&[operation]).inc();
        self.stats.calls += 1;

        let now = self.clock.now();
        match stage(&*self, now) {
            Ok((changes, event)) => {
                self.commit(changes);
                self.publisher.publish(event.clone());
                Ok(event)
            }
            Err(err) => {
                let kind = err.kind();
                LIFECYCLE_REJECTIONS
                    .with_label_values(&[operation, kind.as_str()])
                    .inc();
                self.stats.rejections += 1;
                warn!(operation, kind = %kind, error = %err, "Call rejected");
                Err(err)
            }
        }
    }

    fn commit(&mut self, changes: Vec<StateChange>) {
        debug!(writes = changes.len(), "Committing staged writes");

        let mut touched: Vec<TokenId> = Vec::new();
        for change in changes {
            match change {
                StateChange::Provenance { id, entry } => {
                    touched.push(id);
                    self.store.put(id, entry);
                }
                StateChange::Balance { holder, id, units } => {
                    touched.push(id);
                    self.ledger.set_balance(holder, id, units);
                }
                StateChange::Pending { vault, amount } => self.ledger.set_pending(vault, amount),
                StateChange::Approval {
                    owner,
                    operator,
                    approved,
                } => self.ledger.set_approval(owner, operator, approved),
            }
        }

        if self.config.strict_invariants {
            touched.sort_unstable();
            touched.dedup();
            if let InvariantCheckResult::Invalid(violations) =
                check_invariants_for(&self.store, &self.ledger, touched)
            {
                for violation in &violations {
                    error!(%violation, "Invariant violated after commit");
                }
            }
        }
    }

    // =========================================================================
    // STAGING
    // =========================================================================

    /// Stage the terms change shared by `load` and `fork`. The identifier
    /// must already be validated.
    fn stage_load(
        &self,
        set: &mut ChangeSet<'_>,
        id: TokenId,
        provenance: &Provenance,
        funds: U256,
        caller: Address,
        now: Timestamp,
    ) -> Result<ProvenanceEntry, OrbError> {
        let current = self.store.entry(id);
        let mut next = self.store.plan_load(id, provenance, caller, now)?;

        // Only a new, non-zero price is paid for: one unit at that price.
        let price_changed = !provenance.price.is_zero()
            && current.terms().map(|t| t.price) != Some(provenance.price);
        let expected = if price_changed {
            unit_amount(&Price::unpack(provenance.price), 1, funds)?
        } else {
            U256::zero()
        };
        check_funds(expected, funds)?;

        if !funds.is_zero() {
            set.add_pending(provenance.vault, funds)?;
            next.funded = true;
        }
        set.set_provenance(id, next);
        Ok(next)
    }
}

/// Funds owed for `units` at `price`. Overflow can never be paid.
fn unit_amount(price: &Price, units: u64, funds: U256) -> Result<U256, OrbError> {
    price.amount_for(units).ok_or(OrbError::InvalidFunding {
        expected: U256::MAX,
        actual: funds,
    })
}

fn check_funds(expected: U256, funds: U256) -> Result<(), OrbError> {
    if funds == expected {
        Ok(())
    } else {
        Err(OrbError::InvalidFunding {
            expected,
            actual: funds,
        })
    }
}

// =============================================================================
// API IMPLEMENTATION
// =============================================================================

impl<C: Clock, P: EventPublisher> OrbApi for LifecycleEngine<C, P> {
    #[instrument(skip(self, provenance), fields(id = %id, caller = %caller))]
    fn load(
        &mut self,
        id: TokenId,
        provenance: Provenance,
        funds: U256,
        caller: Address,
    ) -> Result<OrbEvent, OrbError> {
        let event = self.run("load", |engine, now| {
            is_valid(id)?;
            let mut set = ChangeSet::new(&engine.ledger);
            let next = engine.stage_load(&mut set, id, &provenance, funds, caller, now)?;
            Ok((
                set.into_changes(),
                OrbEvent::Load {
                    id,
                    provenance: next.to_provenance(),
                },
            ))
        })?;

        log_token_event!(info, "load", id, "Terms loaded", vault = %provenance.vault, funds = %funds);
        Ok(event)
    }

    #[instrument(skip(self, data), fields(id = %id, caller = %caller))]
    fn mint(
        &mut self,
        to: Address,
        id: TokenId,
        amount: u64,
        data: &[u8],
        funds: U256,
        caller: Address,
    ) -> Result<OrbEvent, OrbError> {
        let event = self.run("mint", |engine, now| {
            is_valid(id)?;
            if to.is_zero() {
                return Err(OrbError::InvalidRecipient);
            }
            if amount == 0 {
                return Err(OrbError::InvalidAmount);
            }

            let current = engine.store.entry(id);
            let terms = current.terms().copied();

            if let Some(terms) = terms {
                if terms.is_closed_at(now) {
                    return Err(OrbError::ProvenanceClosed {
                        closure: terms.closure,
                        now,
                    });
                }
            }

            let expected = match terms {
                Some(terms) if !terms.price.is_zero() => {
                    unit_amount(&terms.unit_price(), amount, funds)?
                }
                _ => U256::zero(),
            };
            check_funds(expected, funds)?;

            let mut next = engine.store.plan_mint(id, amount)?;

            let mut set = ChangeSet::new(&engine.ledger);
            set.credit(to, id, amount)?;
            if let Some(terms) = terms.filter(|_| !funds.is_zero()) {
                set.add_pending(terms.vault, funds)?;
                next.funded = true;
            }
            set.set_provenance(id, next);

            debug!(data = ?data, "Mint payload");
            Ok((
                set.into_changes(),
                OrbEvent::TransferSingle {
                    operator: caller,
                    from: Address::ZERO,
                    to,
                    id,
                    amount,
                },
            ))
        })?;

        self.stats.units_minted = self.stats.units_minted.saturating_add(amount);
        UNITS_MINTED.inc_by(amount);
        log_token_event!(info, "mint", id, "Units minted", to = %to, amount = amount);
        Ok(event)
    }

    #[instrument(skip(self, provenance), fields(from_id = %from_id, to_id = %to_id, caller = %caller))]
    fn fork(
        &mut self,
        from_id: TokenId,
        to_id: TokenId,
        provenance: Provenance,
        funds: U256,
        caller: Address,
    ) -> Result<OrbEvent, OrbError> {
        let event = self.run("fork", |engine, now| {
            is_valid(from_id)?;
            is_valid(to_id)?;
            if from_id == to_id {
                return Err(OrbError::ForkedProvenanceSameAsNew);
            }
            if !engine.store.entry(from_id).state.is_active() {
                return Err(OrbError::ForkedProvenanceNotFound);
            }

            let mut set = ChangeSet::new(&engine.ledger);
            let next = engine.stage_load(&mut set, to_id, &provenance, funds, caller, now)?;
            Ok((
                set.into_changes(),
                OrbEvent::Fork {
                    from_id,
                    to_id,
                    provenance: next.to_provenance(),
                },
            ))
        })?;

        log_token_event!(info, "fork", to_id, "Terms forked", from_id = %from_id);
        Ok(event)
    }

    #[instrument(skip(self), fields(id = %id, caller = %caller))]
    fn forfeit(&mut self, id: TokenId, caller: Address) -> Result<OrbEvent, OrbError> {
        let event = self.run("forfeit", |engine, _now| {
            is_valid(id)?;
            let next = engine.store.plan_forfeit(id, caller)?;

            let mut set = ChangeSet::new(&engine.ledger);
            set.set_provenance(id, next);
            Ok((set.into_changes(), OrbEvent::Forfeit { id }))
        })?;

        log_token_event!(info, "forfeit", id, "Terms forfeited");
        Ok(event)
    }

    #[instrument(skip(self), fields(id = %id, caller = %caller))]
    fn burn(&mut self, id: TokenId, amount: u64, caller: Address) -> Result<OrbEvent, OrbError> {
        let event = self.run("burn", |engine, _now| {
            is_valid(id)?;
            if amount == 0 {
                return Err(OrbError::InvalidAmount);
            }

            let mut set = ChangeSet::new(&engine.ledger);
            set.debit(caller, id, amount)?;
            Ok((
                set.into_changes(),
                OrbEvent::TransferSingle {
                    operator: caller,
                    from: caller,
                    to: Address::ZERO,
                    id,
                    amount,
                },
            ))
        })?;

        self.stats.units_burned = self.stats.units_burned.saturating_add(amount);
        UNITS_BURNED.inc_by(amount);
        log_token_event!(info, "burn", id, "Units burned", amount = amount);
        Ok(event)
    }

    #[instrument(skip(self), fields(caller = %caller))]
    fn withdraw(&mut self, caller: Address) -> U256 {
        let _timer = HistogramTimer::start("withdraw");
        LIFECYCLE_CALLS.with_label_values(&["withdraw"]).inc();
        self.stats.calls += 1;

        let mut set = ChangeSet::new(&self.ledger);
        let amount = set.drain_pending(caller);
        if amount.is_zero() {
            debug!("Nothing to withdraw");
            return amount;
        }

        let changes = set.into_changes();
        self.commit(changes);
        self.publisher.publish(OrbEvent::Withdraw {
            vault: caller,
            amount,
        });

        self.stats.funds_withdrawn = self.stats.funds_withdrawn.saturating_add(amount);
        WITHDRAWALS.inc();
        info!(amount = %amount, "Funds withdrawn");
        amount
    }

    #[instrument(skip(self, data), fields(id = %id, caller = %caller))]
    fn safe_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        id: TokenId,
        amount: u64,
        data: &[u8],
        caller: Address,
    ) -> Result<OrbEvent, OrbError> {
        let event = self.run("transfer", |engine, _now| {
            is_valid(id)?;
            if caller != from && !engine.ledger.is_approved_for_all(from, caller) {
                return Err(OrbError::NotAuthorized);
            }
            if to.is_zero() {
                return Err(OrbError::InvalidRecipient);
            }
            if amount == 0 {
                return Err(OrbError::InvalidAmount);
            }

            let mut set = ChangeSet::new(&engine.ledger);
            set.debit(from, id, amount)?;
            set.credit(to, id, amount)?;

            debug!(data = ?data, "Transfer payload");
            Ok((
                set.into_changes(),
                OrbEvent::TransferSingle {
                    operator: caller,
                    from,
                    to,
                    id,
                    amount,
                },
            ))
        })?;

        log_token_event!(debug, "transfer", id, "Units transferred", from = %from, to = %to, amount = amount);
        Ok(event)
    }

    #[instrument(skip(self, ids, amounts, data), fields(caller = %caller, count = ids.len()))]
    fn safe_batch_transfer_from(
        &mut self,
        from: Address,
        to: Address,
        ids: &[TokenId],
        amounts: &[u64],
        data: &[u8],
        caller: Address,
    ) -> Result<OrbEvent, OrbError> {
        self.run("batch_transfer", |engine, _now| {
            if ids.len() != amounts.len() {
                return Err(OrbError::BatchLengthMismatch {
                    ids: ids.len(),
                    values: amounts.len(),
                });
            }
            if caller != from && !engine.ledger.is_approved_for_all(from, caller) {
                return Err(OrbError::NotAuthorized);
            }
            if to.is_zero() {
                return Err(OrbError::InvalidRecipient);
            }

            let mut set = ChangeSet::new(&engine.ledger);
            for (&id, &amount) in ids.iter().zip(amounts) {
                is_valid(id)?;
                if amount == 0 {
                    return Err(OrbError::InvalidAmount);
                }
                set.debit(from, id, amount)?;
                set.credit(to, id, amount)?;
            }

            debug!(data = ?data, "Batch transfer payload");
            Ok((
                set.into_changes(),
                OrbEvent::TransferBatch {
                    operator: caller,
                    from,
                    to,
                    ids: ids.to_vec(),
                    amounts: amounts.to_vec(),
                },
            ))
        })
    }

    #[instrument(skip(self), fields(caller = %caller, operator = %operator))]
    fn set_approval_for_all(
        &mut self,
        operator: Address,
        approved: bool,
        caller: Address,
    ) -> Result<OrbEvent, OrbError> {
        self.run("approval", |engine, _now| {
            if operator == caller {
                return Err(OrbError::NotAuthorized);
            }

            let mut set = ChangeSet::new(&engine.ledger);
            set.set_approval(caller, operator, approved);
            Ok((
                set.into_changes(),
                OrbEvent::ApprovalForAll {
                    owner: caller,
                    operator,
                    approved,
                },
            ))
        })
    }

    fn balance_of(&self, owner: Address, id: TokenId) -> u64 {
        self.ledger.balance_of(owner, id)
    }

    fn balance_of_batch(&self, owners: &[Address], ids: &[TokenId]) -> Result<Vec<u64>, OrbError> {
        if owners.len() != ids.len() {
            return Err(OrbError::BatchLengthMismatch {
                ids: ids.len(),
                values: owners.len(),
            });
        }
        Ok(owners
            .iter()
            .zip(ids)
            .map(|(&owner, &id)| self.ledger.balance_of(owner, id))
            .collect())
    }

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.ledger.is_approved_for_all(owner, operator)
    }

    fn provenance(&self, id: TokenId) -> Provenance {
        self.store.entry(id).to_provenance()
    }

    fn state(&self, id: TokenId) -> ProvenanceState {
        self.store.entry(id).state
    }

    fn pending_withdrawal(&self, vault: Address) -> U256 {
        self.ledger.pending_of(vault)
    }

    fn total_supply(&self, id: TokenId) -> u64 {
        self.store.entry(id).total_supply
    }

    fn metadata(&self, id: TokenId) -> Result<TokenMetadata, OrbError> {
        let map = is_valid(id)?;
        Ok(token_metadata(
            id,
            &map,
            &self.config.collection_name,
            &self.config.ipfs_hash,
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
