// SPDX-License-Identifier: AGPL-3.0-only
//! # Token Ledger
//!
//! Fungible balance ledger with owner-approved transfer-on-behalf
//! (ERC-20 equivalent). One instance per side of the pair.
//!
//! - All amounts in base units (`u128`), never decimal display units
//! - `transfer_from` spends allowance by exactly the moved amount
//! - Every mutating call validates first and writes second, so a failed
//!   call leaves balances and allowances untouched

use crate::error::{DexError, Result};
use crate::events::DexEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest decimal precision a token may declare.
pub const MAX_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    address: String,
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: u128,
    balances: BTreeMap<String, u128>,
    /// owner → spender → remaining allowance
    allowances: BTreeMap<String, BTreeMap<String, u128>>,
}

impl TokenLedger {
    pub fn new(address: &str, name: &str, symbol: &str, decimals: u8) -> Result<Self> {
        check_metadata(address, name, symbol, decimals)?;
        Ok(Self {
            address: address.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        })
    }

    /// Re-check metadata that arrived from outside `new` (a loaded snapshot).
    pub fn validate(&self) -> Result<()> {
        check_metadata(&self.address, &self.name, &self.symbol, self.decimals)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &str) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all balances. Equals `total_supply` at rest.
    pub fn circulating(&self) -> u128 {
        self.balances.values().fold(0u128, |acc, b| acc.saturating_add(*b))
    }

    /// Create new supply. Used only when a deployment seeds the deployer.
    pub fn mint(&mut self, to: &str, amount: u128) -> Result<DexEvent> {
        if amount == 0 {
            return Err(DexError::ZeroAmount);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(DexError::Overflow)?;
        // balance <= supply, so this cannot overflow once supply didn't
        let bal = self.balance_of(to) + amount;
        self.total_supply = supply;
        self.balances.insert(to.to_string(), bal);
        Ok(DexEvent::Transfer {
            token: self.address.clone(),
            from: String::new(),
            to: to.to_string(),
            amount,
        })
    }

    /// Set `spender`'s allowance over `owner`'s balance. Zero revokes.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u128) -> Result<DexEvent> {
        if owner == spender {
            return Err(DexError::InvalidConfig("cannot approve self".to_string()));
        }
        self.set_allowance(owner, spender, amount);
        Ok(DexEvent::Approval {
            token: self.address.clone(),
            owner: owner.to_string(),
            spender: spender.to_string(),
            amount,
        })
    }

    /// Check that `from` can send `amount` without touching state.
    pub fn ensure_can_transfer(&self, from: &str, amount: u128) -> Result<()> {
        if amount == 0 {
            return Err(DexError::ZeroAmount);
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(DexError::InsufficientBalance {
                account: from.to_string(),
                balance,
                needed: amount,
            });
        }
        Ok(())
    }

    /// Check that `spender` can move `amount` out of `from` without touching state.
    pub fn ensure_can_transfer_from(&self, spender: &str, from: &str, amount: u128) -> Result<()> {
        if amount == 0 {
            return Err(DexError::ZeroAmount);
        }
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(DexError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                allowed,
                needed: amount,
            });
        }
        self.ensure_can_transfer(from, amount)
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: u128) -> Result<DexEvent> {
        if from == to {
            return Err(DexError::InvalidConfig("cannot transfer to self".to_string()));
        }
        self.ensure_can_transfer(from, amount)?;
        self.move_balance(from, to, amount);
        Ok(DexEvent::Transfer {
            token: self.address.clone(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
        })
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, spending
    /// exactly `amount` of the allowance.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<DexEvent> {
        if from == to {
            return Err(DexError::InvalidConfig("cannot transfer to self".to_string()));
        }
        self.ensure_can_transfer_from(spender, from, amount)?;
        let remaining = self.allowance(from, spender) - amount;
        self.set_allowance(from, spender, remaining);
        self.move_balance(from, to, amount);
        Ok(DexEvent::Transfer {
            token: self.address.clone(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
        })
    }

    /// Permanently destroy `amount` of `from`'s balance.
    pub fn burn(&mut self, from: &str, amount: u128) -> Result<DexEvent> {
        self.ensure_can_transfer(from, amount)?;
        self.debit(from, amount);
        self.total_supply -= amount;
        Ok(DexEvent::Transfer {
            token: self.address.clone(),
            from: from.to_string(),
            to: String::new(),
            amount,
        })
    }

    // ─────────────────────────────────────────────────────────
    // INTERNAL HELPERS (callers have validated)
    // ─────────────────────────────────────────────────────────

    fn move_balance(&mut self, from: &str, to: &str, amount: u128) {
        self.debit(from, amount);
        // total supply bounds every balance, so the credit cannot overflow
        let to_bal = self.balance_of(to) + amount;
        self.balances.insert(to.to_string(), to_bal);
    }

    fn debit(&mut self, from: &str, amount: u128) {
        let left = self.balance_of(from) - amount;
        if left == 0 {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.to_string(), left);
        }
    }

    fn set_allowance(&mut self, owner: &str, spender: &str, amount: u128) {
        if amount == 0 {
            if let Some(m) = self.allowances.get_mut(owner) {
                m.remove(spender);
                if m.is_empty() {
                    self.allowances.remove(owner);
                }
            }
        } else {
            self.allowances
                .entry(owner.to_string())
                .or_default()
                .insert(spender.to_string(), amount);
        }
    }
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────

fn check_metadata(address: &str, name: &str, symbol: &str, decimals: u8) -> Result<()> {
    if address.is_empty() {
        return Err(DexError::InvalidConfig("token address required".to_string()));
    }
    if name.is_empty() || name.len() > 64 {
        return Err(DexError::InvalidConfig(
            "token name required (1-64 chars)".to_string(),
        ));
    }
    if symbol.is_empty() || symbol.len() > 8 {
        return Err(DexError::InvalidConfig(
            "token symbol required (1-8 chars)".to_string(),
        ));
    }
    if decimals > MAX_DECIMALS {
        return Err(DexError::InvalidConfig(format!(
            "decimals must be 0-{}",
            MAX_DECIMALS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded() -> TokenLedger {
        let mut t = TokenLedger::new("0xtoken", "MyToken", "MTK", 18).unwrap();
        t.mint("alice", 1_000).unwrap();
        t
    }

    #[test]
    fn test_new_rejects_bad_decimals() {
        assert!(TokenLedger::new("0xt", "T", "T", 19).is_err());
        assert!(TokenLedger::new("0xt", "T", "T", 0).is_ok());
    }

    #[test]
    fn test_new_rejects_long_symbol() {
        assert!(TokenLedger::new("0xt", "Token", "TOOLONGSYM", 6).is_err());
    }

    #[test]
    fn test_mint_sets_supply_and_balance() {
        let t = funded();
        assert_eq!(t.total_supply(), 1_000);
        assert_eq!(t.balance_of("alice"), 1_000);
        assert_eq!(t.circulating(), t.total_supply());
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut t = funded();
        t.transfer("alice", "bob", 400).unwrap();
        assert_eq!(t.balance_of("alice"), 600);
        assert_eq!(t.balance_of("bob"), 400);
        assert_eq!(t.circulating(), 1_000);
    }

    #[test]
    fn test_transfer_insufficient_balance_leaves_state() {
        let mut t = funded();
        let before = t.clone();
        let err = t.transfer("alice", "bob", 1_001).unwrap_err();
        assert!(matches!(err, DexError::InsufficientBalance { .. }));
        assert_eq!(t, before);
    }

    #[test]
    fn test_transfer_zero_rejected() {
        let mut t = funded();
        assert_eq!(t.transfer("alice", "bob", 0), Err(DexError::ZeroAmount));
    }

    #[test]
    fn test_transfer_to_self_rejected() {
        let mut t = funded();
        assert!(t.transfer("alice", "alice", 1).is_err());
    }

    #[test]
    fn test_approve_and_allowance() {
        let mut t = funded();
        t.approve("alice", "pair", 500).unwrap();
        assert_eq!(t.allowance("alice", "pair"), 500);
        assert_eq!(t.allowance("pair", "alice"), 0);
    }

    #[test]
    fn test_approve_zero_revokes() {
        let mut t = funded();
        t.approve("alice", "pair", 500).unwrap();
        t.approve("alice", "pair", 0).unwrap();
        assert_eq!(t.allowance("alice", "pair"), 0);
    }

    #[test]
    fn test_transfer_from_spends_exact_allowance() {
        let mut t = funded();
        t.approve("alice", "pair", 500).unwrap();
        t.transfer_from("pair", "alice", "pair", 200).unwrap();
        assert_eq!(t.allowance("alice", "pair"), 300);
        assert_eq!(t.balance_of("pair"), 200);
        assert_eq!(t.balance_of("alice"), 800);
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut t = funded();
        t.approve("alice", "pair", 100).unwrap();
        let before = t.clone();
        let err = t.transfer_from("pair", "alice", "pair", 101).unwrap_err();
        assert!(matches!(
            err,
            DexError::InsufficientAllowance {
                allowed: 100,
                needed: 101,
                ..
            }
        ));
        assert_eq!(t, before);
    }

    #[test]
    fn test_transfer_from_allowance_ok_balance_short() {
        let mut t = funded();
        t.approve("alice", "pair", 5_000).unwrap();
        let err = t.transfer_from("pair", "alice", "pair", 2_000).unwrap_err();
        assert!(matches!(err, DexError::InsufficientBalance { .. }));
        assert_eq!(t.allowance("alice", "pair"), 5_000);
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut t = funded();
        t.burn("alice", 250).unwrap();
        assert_eq!(t.total_supply(), 750);
        assert_eq!(t.balance_of("alice"), 750);
    }

    #[test]
    fn test_mint_overflow() {
        let mut t = funded();
        assert_eq!(t.mint("bob", u128::MAX), Err(DexError::Overflow));
        assert_eq!(t.total_supply(), 1_000);
    }
}
