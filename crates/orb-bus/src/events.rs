//! # Orb Events
//!
//! Events emitted by the lifecycle engine for external indexing. Field
//! names and shapes mirror the token contract's log events so an indexer can
//! consume either source.

use orb_types::{Address, Provenance, TokenId, U256};
use serde::{Deserialize, Serialize};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum OrbEvent {
    // =========================================================================
    // PROVENANCE
    // =========================================================================
    /// Terms were loaded (created or replaced) for a token id.
    Load {
        /// Token whose terms changed.
        id: TokenId,
        /// The terms now in force.
        provenance: Provenance,
    },

    /// A token id's terms were seeded from an existing one.
    Fork {
        /// Parent token id.
        from_id: TokenId,
        /// Newly loaded token id.
        to_id: TokenId,
        /// The terms now in force on `to_id`.
        provenance: Provenance,
    },

    /// The vault gave up its terms.
    Forfeit {
        /// Token whose terms were cleared.
        id: TokenId,
    },

    // =========================================================================
    // TRANSFERS (mint: from = zero, burn: to = zero)
    // =========================================================================
    /// Units of one token moved.
    TransferSingle {
        /// Account that initiated the move.
        operator: Address,
        /// Source holder, zero on mint.
        from: Address,
        /// Destination holder, zero on burn.
        to: Address,
        /// Token moved.
        id: TokenId,
        /// Units moved.
        amount: u64,
    },

    /// Units of several tokens moved in one call.
    TransferBatch {
        /// Account that initiated the move.
        operator: Address,
        /// Source holder.
        from: Address,
        /// Destination holder.
        to: Address,
        /// Tokens moved, parallel to `amounts`.
        ids: Vec<TokenId>,
        /// Units moved per token.
        amounts: Vec<u64>,
    },

    /// An operator approval changed.
    ApprovalForAll {
        /// Holder granting or revoking.
        owner: Address,
        /// Operator affected.
        operator: Address,
        /// New approval status.
        approved: bool,
    },

    // =========================================================================
    // FUNDS
    // =========================================================================
    /// A vault drained its pending balance.
    Withdraw {
        /// Vault paid out.
        vault: Address,
        /// Amount paid.
        amount: U256,
    },
}

impl OrbEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Load { .. } | Self::Fork { .. } | Self::Forfeit { .. } => EventTopic::Provenance,
            Self::TransferSingle { .. } | Self::TransferBatch { .. } => EventTopic::Transfer,
            Self::ApprovalForAll { .. } => EventTopic::Approval,
            Self::Withdraw { .. } => EventTopic::Funds,
        }
    }

    /// Token ids this event refers to. Empty for account-level events.
    #[must_use]
    pub fn token_ids(&self) -> Vec<TokenId> {
        match self {
            Self::Load { id, .. } | Self::Forfeit { id } | Self::TransferSingle { id, .. } => {
                vec![*id]
            }
            Self::Fork { from_id, to_id, .. } => vec![*from_id, *to_id],
            Self::TransferBatch { ids, .. } => ids.clone(),
            Self::ApprovalForAll { .. } | Self::Withdraw { .. } => Vec::new(),
        }
    }

    /// Short event name as it appears in contract logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "Load",
            Self::Fork { .. } => "Fork",
            Self::Forfeit { .. } => "Forfeit",
            Self::TransferSingle { .. } => "TransferSingle",
            Self::TransferBatch { .. } => "TransferBatch",
            Self::ApprovalForAll { .. } => "ApprovalForAll",
            Self::Withdraw { .. } => "Withdraw",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Load, fork and forfeit.
    Provenance,
    /// Mints, burns and transfers.
    Transfer,
    /// Operator approvals.
    Approval,
    /// Vault withdrawals.
    Funds,
    /// Matches every topic.
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include (empty = all topics).
    pub topics: Vec<EventTopic>,
    /// Token ids to include (empty = all tokens). Account-level events
    /// never match a non-empty id filter.
    pub token_ids: Vec<TokenId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            token_ids: Vec::new(),
        }
    }

    /// Create a filter for events touching specific token ids.
    #[must_use]
    pub fn for_tokens(token_ids: Vec<TokenId>) -> Self {
        Self {
            topics: Vec::new(),
            token_ids,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &OrbEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let token_match = self.token_ids.is_empty()
            || event
                .token_ids()
                .iter()
                .any(|id| self.token_ids.contains(id));

        topic_match && token_match
    }
}
