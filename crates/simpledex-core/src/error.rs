//! Error taxonomy shared by the ledgers, the pair engine and the loaders.
//!
//! Every engine failure is local to a single operation and leaves state
//! untouched; nothing here is retried internally.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexError {
    /// Input amount, deposit or share amount was zero.
    ZeroAmount,
    InsufficientAllowance {
        owner: String,
        spender: String,
        allowed: u128,
        needed: u128,
    },
    InsufficientBalance {
        account: String,
        balance: u128,
        needed: u128,
    },
    InsufficientShares {
        account: String,
        held: u128,
        needed: u128,
    },
    /// Payout would drain (or exceed) the opposite reserve.
    InsufficientReserve { reserve: u128, requested: u128 },
    /// Quote or swap against a pool with a zero reserve.
    EmptyPool,
    /// Deposit does not match the pool ratio closely enough to mint shares.
    RatioMismatch,
    SlippageExceeded { expected_min: u128, actual: u128 },
    /// Token address is neither side of the pair.
    UnknownToken(String),
    /// Malformed decimal amount string.
    InvalidAmount(String),
    Overflow,
    InvalidConfig(String),
    Io(String),
    Serialization(String),
}

impl fmt::Display for DexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DexError::ZeroAmount => write!(f, "Amount must be > 0"),
            DexError::InsufficientAllowance {
                owner,
                spender,
                allowed,
                needed,
            } => write!(
                f,
                "Insufficient allowance: {} approved {} for {} but {} is needed",
                owner, allowed, spender, needed
            ),
            DexError::InsufficientBalance {
                account,
                balance,
                needed,
            } => write!(
                f,
                "Insufficient balance for {}: have {} need {}",
                account, balance, needed
            ),
            DexError::InsufficientShares {
                account,
                held,
                needed,
            } => write!(
                f,
                "Insufficient liquidity shares for {}: have {} need {}",
                account, held, needed
            ),
            DexError::InsufficientReserve { reserve, requested } => write!(
                f,
                "Insufficient reserve: output {} would drain reserve {}",
                requested, reserve
            ),
            DexError::EmptyPool => write!(f, "Pool has no liquidity"),
            DexError::RatioMismatch => {
                write!(f, "Deposit does not match the current pool ratio")
            }
            DexError::SlippageExceeded {
                expected_min,
                actual,
            } => write!(
                f,
                "Slippage: would receive {} but minimum is {}",
                actual, expected_min
            ),
            DexError::UnknownToken(addr) => write!(f, "Token {} is not part of this pair", addr),
            DexError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            DexError::Overflow => write!(f, "Arithmetic overflow"),
            DexError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            DexError::Io(msg) => write!(f, "I/O error: {}", msg),
            DexError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for DexError {}

impl From<std::io::Error> for DexError {
    fn from(e: std::io::Error) -> Self {
        DexError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DexError {
    fn from(e: serde_json::Error) -> Self {
        DexError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for DexError {
    fn from(e: toml::de::Error) -> Self {
        DexError::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_amount() {
        assert_eq!(DexError::ZeroAmount.to_string(), "Amount must be > 0");
    }

    #[test]
    fn test_display_slippage_mentions_both_amounts() {
        let msg = DexError::SlippageExceeded {
            expected_min: 100,
            actual: 90,
        }
        .to_string();
        assert!(msg.contains("100") && msg.contains("90"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DexError = io.into();
        assert!(matches!(err, DexError::Io(_)));
    }
}
