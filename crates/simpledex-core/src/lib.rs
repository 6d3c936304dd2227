//! # SimpleDEX Core
//!
//! A single two-token constant-product pool with its two fungible token
//! ledgers, executed as a sequential state machine.
//!
//! ## Modules
//! - [`amm`]: the pair engine (swap, add/remove liquidity, quotes)
//! - [`token`]: ERC-20 style balance and allowance ledger
//! - [`pair`]: reserves, share supply and positions
//! - [`math`]: 256-bit intermediate arithmetic for the pool formulas
//! - [`units`]: decimal display units ↔ base units
//! - [`config`], [`deploy`], [`store`]: bringing a pool up and persisting it
//!
//! All amounts are `u128` base units. A returned [`Receipt`] means the
//! operation is committed; reads issued after it observe the new state.

pub mod amm;
pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod math;
pub mod pair;
pub mod store;
pub mod token;
pub mod units;

pub use amm::{
    AmmEngine, DepositPlan, LiquidityResult, SwapQuote, SwapResult, JOURNAL_CAPACITY, MAX_FEE_BPS,
};
pub use config::DexConfig;
pub use deploy::{deploy, Deployment};
pub use error::{DexError, Result};
pub use events::{DexEvent, Receipt};
pub use pair::{PairState, RatioPolicy, Side};
pub use token::TokenLedger;
