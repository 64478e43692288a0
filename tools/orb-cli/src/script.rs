//! # Lifecycle Script Replay
//!
//! Replays a JSON list of lifecycle calls against a fresh engine on a
//! controlled clock and reports the outcome of every step.
//!
//! ## Script Format
//!
//! ```json
//! {
//!   "start_time": 1700000000,
//!   "config": { "collection_name": "Orb" },
//!   "calls": [
//!     { "op": "load", "id": "0xff68...", "caller": "0x11..",
//!       "provenance": { "max_supply": 322, "price": 98, "vault": "0x11.." },
//!       "funds": 300 },
//!     { "op": "advance_time", "seconds": 3600 },
//!     { "op": "withdraw", "caller": "0x11.." }
//!   ]
//! }
//! ```
//!
//! Amounts (`funds`, `max_supply`, `price`) take a JSON number or a decimal
//! or `0x` hex string. `data` is a hex string.

use anyhow::{Context, Result};
use orb_provenance::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

// =============================================================================
// SCRIPT INPUT
// =============================================================================

/// A replayable sequence of calls.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Clock value before the first call.
    #[serde(default)]
    pub start_time: Timestamp,
    /// Engine configuration for the run.
    #[serde(default)]
    pub config: EngineConfig,
    /// Calls in order.
    pub calls: Vec<Call>,
}

impl Script {
    /// Parse a script from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid replay script")
    }
}

/// Terms as written in a script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermsInput {
    /// Packed supply cap.
    #[serde(default, deserialize_with = "de_amount")]
    pub max_supply: U256,
    /// Packed unit price.
    #[serde(default, deserialize_with = "de_amount")]
    pub price: U256,
    /// Closure timestamp, 0 = none.
    #[serde(default)]
    pub closure: Timestamp,
    /// Vault.
    #[serde(default)]
    pub vault: Address,
}

impl TermsInput {
    fn provenance(&self) -> Provenance {
        Provenance {
            max_supply: self.max_supply,
            price: self.price,
            total_supply: 0,
            closure: self.closure,
            vault: self.vault,
        }
    }
}

/// One step of a script.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    Load {
        id: TokenId,
        provenance: TermsInput,
        #[serde(default, deserialize_with = "de_amount")]
        funds: U256,
        caller: Address,
    },
    Mint {
        to: Address,
        id: TokenId,
        amount: u64,
        #[serde(default, deserialize_with = "de_hex")]
        data: Vec<u8>,
        #[serde(default, deserialize_with = "de_amount")]
        funds: U256,
        caller: Address,
    },
    Fork {
        from_id: TokenId,
        to_id: TokenId,
        provenance: TermsInput,
        #[serde(default, deserialize_with = "de_amount")]
        funds: U256,
        caller: Address,
    },
    Forfeit {
        id: TokenId,
        caller: Address,
    },
    Burn {
        id: TokenId,
        amount: u64,
        caller: Address,
    },
    Withdraw {
        caller: Address,
    },
    Transfer {
        from: Address,
        to: Address,
        id: TokenId,
        amount: u64,
        #[serde(default, deserialize_with = "de_hex")]
        data: Vec<u8>,
        caller: Address,
    },
    BatchTransfer {
        from: Address,
        to: Address,
        ids: Vec<TokenId>,
        amounts: Vec<u64>,
        #[serde(default, deserialize_with = "de_hex")]
        data: Vec<u8>,
        caller: Address,
    },
    SetApproval {
        operator: Address,
        approved: bool,
        caller: Address,
    },
    AdvanceTime {
        seconds: u64,
    },
}

impl Call {
    /// Operation name as written in scripts.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Mint { .. } => "mint",
            Self::Fork { .. } => "fork",
            Self::Forfeit { .. } => "forfeit",
            Self::Burn { .. } => "burn",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
            Self::BatchTransfer { .. } => "batch_transfer",
            Self::SetApproval { .. } => "set_approval",
            Self::AdvanceTime { .. } => "advance_time",
        }
    }
}

fn de_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Text(text) => crate::commands::parse_u256(&text).map_err(serde::de::Error::custom),
        Repr::Number(n) => Ok(U256::from(n)),
    }
}

fn de_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let text = String::deserialize(deserializer)?;
    let digits = text.strip_prefix("0x").unwrap_or(&text);
    hex::decode(digits).map_err(serde::de::Error::custom)
}

// =============================================================================
// REPLAY OUTPUT
// =============================================================================

/// Result of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Zero-based position in the script.
    pub step: usize,
    /// Operation name.
    pub op: &'static str,
    /// Clock value the step ran at.
    pub now: Timestamp,
    /// What happened.
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Accepted or rejected.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        event: Option<OrbEvent>,
        #[serde(skip_serializing_if = "Option::is_none")]
        paid: Option<String>,
    },
    Rejected {
        kind: &'static str,
        error: String,
    },
}

impl StepOutcome {
    /// Returns true for an accepted step.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    fn from_result(result: Result<OrbEvent, OrbError>) -> Self {
        match result {
            Ok(event) => Self::Ok {
                event: Some(event),
                paid: None,
            },
            Err(e) => Self::Rejected {
                kind: e.kind().as_str(),
                error: e.to_string(),
            },
        }
    }
}

/// End-of-run totals.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    /// Steps replayed.
    pub steps: usize,
    /// Steps accepted.
    pub accepted: usize,
    /// Steps rejected.
    pub rejected: usize,
    /// Engine counters.
    pub stats: EngineStats,
    /// Events the bus saw.
    pub events_published: u64,
    /// Funds still waiting in vaults, decimal.
    pub pending_total: String,
    /// Whether store invariants hold at the end.
    pub invariants_ok: bool,
    /// Violations found, if any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

/// Every step plus the summary.
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    /// Per-step results in order.
    pub steps: Vec<StepReport>,
    /// Totals.
    pub summary: ReplaySummary,
}

// =============================================================================
// REPLAY
// =============================================================================

type ReplayEngine = LifecycleEngine<Arc<FixedClock>, Arc<InMemoryEventBus>>;

/// Replay `script` against a fresh engine.
pub fn replay(script: &Script) -> Replay {
    let clock = Arc::new(FixedClock::new(script.start_time));
    let bus = Arc::new(InMemoryEventBus::new());
    let mut engine = LifecycleEngine::new(clock.clone(), bus.clone(), script.config.clone());

    info!(calls = script.calls.len(), start_time = script.start_time, "Replaying script");

    let steps: Vec<StepReport> = script
        .calls
        .iter()
        .enumerate()
        .map(|(step, call)| {
            let now = clock.now();
            debug!(step, op = call.op(), now, "Replaying call");
            StepReport {
                step,
                op: call.op(),
                now,
                outcome: apply(&mut engine, &clock, call),
            }
        })
        .collect();

    let accepted = steps.iter().filter(|s| s.outcome.is_ok()).count();
    let violations = match engine.check_invariants() {
        InvariantCheckResult::Valid => Vec::new(),
        InvariantCheckResult::Invalid(found) => found.iter().map(ToString::to_string).collect(),
    };

    let summary = ReplaySummary {
        steps: steps.len(),
        accepted,
        rejected: steps.len() - accepted,
        stats: engine.stats().clone(),
        events_published: bus.events_published(),
        pending_total: engine.ledger().total_pending().to_string(),
        invariants_ok: violations.is_empty(),
        violations,
    };

    info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        "Replay finished"
    );

    Replay { steps, summary }
}

fn apply(engine: &mut ReplayEngine, clock: &FixedClock, call: &Call) -> StepOutcome {
    let result = match call {
        Call::Load {
            id,
            provenance,
            funds,
            caller,
        } => engine.load(*id, provenance.provenance(), *funds, *caller),
        Call::Mint {
            to,
            id,
            amount,
            data,
            funds,
            caller,
        } => engine.mint(*to, *id, *amount, data, *funds, *caller),
        Call::Fork {
            from_id,
            to_id,
            provenance,
            funds,
            caller,
        } => engine.fork(*from_id, *to_id, provenance.provenance(), *funds, *caller),
        Call::Forfeit { id, caller } => engine.forfeit(*id, *caller),
        Call::Burn { id, amount, caller } => engine.burn(*id, *amount, *caller),
        Call::Transfer {
            from,
            to,
            id,
            amount,
            data,
            caller,
        } => engine.safe_transfer_from(*from, *to, *id, *amount, data, *caller),
        Call::BatchTransfer {
            from,
            to,
            ids,
            amounts,
            data,
            caller,
        } => engine.safe_batch_transfer_from(*from, *to, ids, amounts, data, *caller),
        Call::SetApproval {
            operator,
            approved,
            caller,
        } => engine.set_approval_for_all(*operator, *approved, *caller),
        Call::Withdraw { caller } => {
            let paid = engine.withdraw(*caller);
            return StepOutcome::Ok {
                event: None,
                paid: Some(paid.to_string()),
            };
        }
        Call::AdvanceTime { seconds } => {
            clock.advance(*seconds);
            return StepOutcome::Ok {
                event: None,
                paid: None,
            };
        }
    };

    StepOutcome::from_result(result)
}
