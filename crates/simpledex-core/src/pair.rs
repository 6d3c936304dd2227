// SPDX-License-Identifier: AGPL-3.0-only
//! # Pair State
//!
//! Reserves, share supply and per-account liquidity positions of one
//! two-asset pool. All mutation goes through [`crate::amm::AmmEngine`];
//! this module only holds the numbers and answers questions about them.
//!
//! ## Macro-states
//! - **Empty**: `total_shares == 0`, both reserves zero. Only a first
//!   deposit is valid.
//! - **Active**: `total_shares > 0`, both reserves non-zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which token of the pair an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// How a deposit into an active pool is reconciled with the pool ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioPolicy {
    /// Mint against the scarcer side and pull in only what that consumes.
    #[default]
    Clamp,
    /// Reject any deposit whose ratio differs from the reserves.
    Exact,
}

impl std::str::FromStr for RatioPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(RatioPolicy::Clamp),
            "exact" => Ok(RatioPolicy::Exact),
            other => Err(format!("unknown ratio policy '{}' (clamp|exact)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairState {
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub total_shares: u128,
    /// account → share units; sums to `total_shares`
    positions: BTreeMap<String, u128>,
}

impl PairState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_shares == 0
    }

    pub fn reserve(&self, side: Side) -> u128 {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    /// `(reserve_in, reserve_out)` for a trade selling `input`.
    pub fn reserves_for(&self, input: Side) -> (u128, u128) {
        (self.reserve(input), self.reserve(input.opposite()))
    }

    pub fn shares_of(&self, account: &str) -> u128 {
        self.positions.get(account).copied().unwrap_or(0)
    }

    pub fn provider_count(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn set_reserve(&mut self, side: Side, value: u128) {
        match side {
            Side::A => self.reserve_a = value,
            Side::B => self.reserve_b = value,
        }
    }

    pub(crate) fn credit_shares(&mut self, account: &str, shares: u128) {
        let held = self.shares_of(account);
        self.positions.insert(account.to_string(), held + shares);
        self.total_shares += shares;
    }

    pub(crate) fn debit_shares(&mut self, account: &str, shares: u128) {
        let left = self.shares_of(account) - shares;
        if left == 0 {
            self.positions.remove(account);
        } else {
            self.positions.insert(account.to_string(), left);
        }
        self.total_shares -= shares;
    }

    /// Sum of all positions; equals `total_shares` at rest.
    pub fn position_sum(&self) -> u128 {
        self.positions
            .values()
            .fold(0u128, |acc, s| acc.saturating_add(*s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::A.opposite(), Side::B);
        assert_eq!(Side::B.opposite(), Side::A);
    }

    #[test]
    fn test_reserves_for_orders_by_input() {
        let pair = PairState {
            reserve_a: 10,
            reserve_b: 20,
            ..PairState::default()
        };
        assert_eq!(pair.reserves_for(Side::A), (10, 20));
        assert_eq!(pair.reserves_for(Side::B), (20, 10));
    }

    #[test]
    fn test_share_credit_and_debit() {
        let mut pair = PairState::new();
        pair.credit_shares("alice", 70);
        pair.credit_shares("bob", 30);
        assert_eq!(pair.total_shares, 100);
        pair.debit_shares("alice", 70);
        assert_eq!(pair.shares_of("alice"), 0);
        assert_eq!(pair.provider_count(), 1);
        assert_eq!(pair.position_sum(), pair.total_shares);
    }

    #[test]
    fn test_ratio_policy_from_str() {
        assert_eq!("Clamp".parse::<RatioPolicy>(), Ok(RatioPolicy::Clamp));
        assert_eq!("exact".parse::<RatioPolicy>(), Ok(RatioPolicy::Exact));
        assert!("median".parse::<RatioPolicy>().is_err());
    }
}
