//! Events emitted by committed ledger and pair operations, kept in the
//! engine's event log for indexing and display.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DexEvent {
    Transfer {
        token: String,
        from: String,
        to: String,
        amount: u128,
    },
    Approval {
        token: String,
        owner: String,
        spender: String,
        amount: u128,
    },
    Swap {
        trader: String,
        token_in: String,
        amount_in: u128,
        token_out: String,
        amount_out: u128,
        fee: u128,
    },
    LiquidityAdded {
        provider: String,
        amount_a: u128,
        amount_b: u128,
        shares: u128,
    },
    LiquidityRemoved {
        provider: String,
        amount_a: u128,
        amount_b: u128,
        shares: u128,
    },
}

impl DexEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DexEvent::Transfer { .. } => "Transfer",
            DexEvent::Approval { .. } => "Approval",
            DexEvent::Swap { .. } => "Swap",
            DexEvent::LiquidityAdded { .. } => "LiquidityAdded",
            DexEvent::LiquidityRemoved { .. } => "LiquidityRemoved",
        }
    }
}

/// Synchronous acknowledgment of a committed state change.
///
/// When a call returns a `Receipt`, every read issued afterwards observes
/// the new state; there is nothing to poll for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position of this operation in the engine's commit order (1-based).
    pub seq: u64,
    pub event: DexEvent,
}
