// SPDX-License-Identifier: AGPL-3.0-only
//! # AMM Engine
//!
//! Constant product (x·y=k) pair bound to two token ledgers.
//!
//! ## Operations
//! | Operation            | Kind      | Notes                                      |
//! |----------------------|-----------|--------------------------------------------|
//! | `get_reserves`       | read      | `(reserve_a, reserve_b, total_shares)`     |
//! | `get_user_liquidity` | read      | `(shares, basis_points)`                   |
//! | `get_swap_amount`    | read      | quote from the current reserve snapshot    |
//! | `swap`               | write     | pulls input via allowance, pays output     |
//! | `add_liquidity`      | write     | first deposit or ratio-reconciled deposit  |
//! | `remove_liquidity`   | write     | burns shares, pays proportional reserves   |
//!
//! ## Atomicity
//! Each write computes everything from the reserves as they stand when the
//! call begins, checks every allowance and balance it will touch, and only
//! then mutates. A rejected call leaves the pair and both ledgers exactly as
//! they were. A returned [`Receipt`] means the change is committed and
//! visible to the very next read.
//!
//! ## Fee
//! `fee_bps` is taken from the input before the formula; the whole input
//! still lands in the reserve, so fees accrue to liquidity providers.

use crate::error::{DexError, Result};
use crate::events::{DexEvent, Receipt};
use crate::math;
use crate::pair::{PairState, RatioPolicy, Side};
use crate::token::TokenLedger;
use crate::units;
use serde::{Deserialize, Serialize};

/// Default swap fee. Zero keeps quotes equal to the bare constant-product formula.
pub const DEFAULT_FEE_BPS: u128 = 0;
/// Max fee: 1000 bps = 10%
pub const MAX_FEE_BPS: u128 = 1_000;
/// Journal entries retained; older ones are dropped as new ones commit.
pub const JOURNAL_CAPACITY: usize = 1_024;

/// Read-only swap preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub amount_out: u128,
    pub fee: u128,
    pub price_impact_bps: u128,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_out: u128,
    pub fee: u128,
    pub receipt: Receipt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityResult {
    pub amount_a: u128,
    pub amount_b: u128,
    pub shares: u128,
    pub receipt: Receipt,
}

/// What a deposit would do: token amounts actually pulled in and shares minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositPlan {
    pub amount_a: u128,
    pub amount_b: u128,
    pub shares: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmEngine {
    address: String,
    token_a: TokenLedger,
    token_b: TokenLedger,
    pair: PairState,
    fee_bps: u128,
    ratio_policy: RatioPolicy,
    seq: u64,
    journal: Vec<Receipt>,
}

impl AmmEngine {
    /// Bind a fresh, empty pair at `address` to two ledgers.
    pub fn new(
        address: &str,
        token_a: TokenLedger,
        token_b: TokenLedger,
        fee_bps: u128,
        ratio_policy: RatioPolicy,
    ) -> Result<Self> {
        check_setup(address, &token_a, &token_b, fee_bps)?;
        Ok(Self {
            address: address.to_string(),
            token_a,
            token_b,
            pair: PairState::new(),
            fee_bps,
            ratio_policy,
            seq: 0,
            journal: Vec::new(),
        })
    }

    /// Re-apply the construction rules to state that did not come through
    /// `new`, such as a deserialized snapshot.
    pub fn validate(&self) -> Result<()> {
        self.token_a.validate()?;
        self.token_b.validate()?;
        check_setup(&self.address, &self.token_a, &self.token_b, self.fee_bps)
    }

    // ─────────────────────────────────────────────────────────
    // READS
    // ─────────────────────────────────────────────────────────

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn token_a(&self) -> &str {
        self.token_a.address()
    }

    pub fn token_b(&self) -> &str {
        self.token_b.address()
    }

    pub fn fee_bps(&self) -> u128 {
        self.fee_bps
    }

    pub fn ratio_policy(&self) -> RatioPolicy {
        self.ratio_policy
    }

    pub fn pair(&self) -> &PairState {
        &self.pair
    }

    pub fn ledger(&self, side: Side) -> &TokenLedger {
        match side {
            Side::A => &self.token_a,
            Side::B => &self.token_b,
        }
    }

    fn ledger_mut(&mut self, side: Side) -> &mut TokenLedger {
        match side {
            Side::A => &mut self.token_a,
            Side::B => &mut self.token_b,
        }
    }

    /// Resolve a token address (or symbol) to its side of the pair.
    pub fn side_of(&self, token: &str) -> Result<Side> {
        if token == self.token_a.address() || token == self.token_a.symbol() {
            Ok(Side::A)
        } else if token == self.token_b.address() || token == self.token_b.symbol() {
            Ok(Side::B)
        } else {
            Err(DexError::UnknownToken(token.to_string()))
        }
    }

    /// Number of committed write operations.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Every event committed so far, tagged with its operation number.
    pub fn journal(&self) -> &[Receipt] {
        &self.journal
    }

    pub fn get_reserves(&self) -> (u128, u128, u128) {
        (
            self.pair.reserve_a,
            self.pair.reserve_b,
            self.pair.total_shares,
        )
    }

    pub fn get_user_liquidity(&self, account: &str) -> (u128, u128) {
        let shares = self.pair.shares_of(account);
        (
            shares,
            math::share_basis_points(shares, self.pair.total_shares),
        )
    }

    pub fn get_swap_amount(&self, input_token: &str, amount_in: u128) -> Result<u128> {
        Ok(self.quote(input_token, amount_in)?.amount_out)
    }

    pub fn quote(&self, input_token: &str, amount_in: u128) -> Result<SwapQuote> {
        let side = self.side_of(input_token)?;
        self.quote_side(side, amount_in)
    }

    pub fn quote_side(&self, input: Side, amount_in: u128) -> Result<SwapQuote> {
        let (reserve_in, reserve_out) = self.pair.reserves_for(input);
        if reserve_in == 0 || reserve_out == 0 {
            return Err(DexError::EmptyPool);
        }
        let (after_fee, fee) = math::deduct_fee(amount_in, self.fee_bps)?;
        let amount_out = math::compute_output(after_fee, reserve_in, reserve_out)?;
        let quote = SwapQuote {
            amount_out,
            fee,
            price_impact_bps: math::price_impact_bps(amount_in, amount_out, reserve_in, reserve_out),
        };
        log::debug!(
            "quote {} {} -> {} (fee {}, impact {} bps)",
            amount_in,
            self.ledger(input).symbol(),
            amount_out,
            fee,
            quote.price_impact_bps
        );
        Ok(quote)
    }

    /// Token amounts `shares` would withdraw right now. `(0, 0)` for an empty pool.
    pub fn preview_remove(&self, shares: u128) -> Result<(u128, u128)> {
        let total = self.pair.total_shares;
        if total == 0 {
            return Ok((0, 0));
        }
        Ok((
            math::share_value(shares, self.pair.reserve_a, total)?,
            math::share_value(shares, self.pair.reserve_b, total)?,
        ))
    }

    /// Work out what `add_liquidity(amount_a, amount_b)` would pull in and mint.
    pub fn preview_add(&self, amount_a: u128, amount_b: u128) -> Result<DepositPlan> {
        if amount_a == 0 || amount_b == 0 {
            return Err(DexError::ZeroAmount);
        }
        let p = &self.pair;
        if p.is_empty() {
            // first deposit: shares start 1:1 with token A base units
            return Ok(DepositPlan {
                amount_a,
                amount_b,
                shares: amount_a,
            });
        }

        if self.ratio_policy == RatioPolicy::Exact
            && math::product(amount_a, p.reserve_b) != math::product(amount_b, p.reserve_a)
        {
            return Err(DexError::RatioMismatch);
        }

        let shares = math::shares_for_deposit(
            amount_a,
            amount_b,
            p.reserve_a,
            p.reserve_b,
            p.total_shares,
        )?;
        if shares == 0 {
            return Err(DexError::RatioMismatch);
        }
        // round consumed amounts up so existing holders are never diluted
        Ok(DepositPlan {
            amount_a: math::mul_div_ceil(shares, p.reserve_a, p.total_shares)?,
            amount_b: math::mul_div_ceil(shares, p.reserve_b, p.total_shares)?,
            shares,
        })
    }

    /// Display price of one whole `base` token in the other token.
    pub fn pool_price(&self, base: Side, places: u8) -> Option<String> {
        let quote_side = base.opposite();
        units::format_ratio(
            self.pair.reserve(quote_side),
            self.ledger(quote_side).decimals(),
            self.pair.reserve(base),
            self.ledger(base).decimals(),
            places,
        )
    }

    // ─────────────────────────────────────────────────────────
    // TOKEN PASSTHROUGH
    // ─────────────────────────────────────────────────────────

    pub fn approve(
        &mut self,
        token: &str,
        owner: &str,
        spender: &str,
        amount: u128,
    ) -> Result<Receipt> {
        let side = self.side_of(token)?;
        let event = self.ledger_mut(side).approve(owner, spender, amount)?;
        log::info!(
            "approve {} {} -> {} = {}",
            self.ledger(side).symbol(),
            owner,
            spender,
            amount
        );
        Ok(self.commit(Vec::new(), event))
    }

    /// Plain token transfer between accounts. Sending to the pair itself is
    /// refused: tokens only enter the pool through swaps and deposits, which
    /// keeps reserves equal to the pair's ledger balances.
    pub fn transfer(&mut self, token: &str, from: &str, to: &str, amount: u128) -> Result<Receipt> {
        let side = self.side_of(token)?;
        if to == self.address || from == self.address {
            return Err(DexError::InvalidConfig(
                "direct transfers to or from the pair are not allowed".to_string(),
            ));
        }
        let event = self.ledger_mut(side).transfer(from, to, amount)?;
        log::info!(
            "transfer {} {} {} -> {}",
            amount,
            self.ledger(side).symbol(),
            from,
            to
        );
        Ok(self.commit(Vec::new(), event))
    }

    /// Destroy `amount` of `from`'s balance. The pair's own balance backs its
    /// reserve and cannot be burned.
    pub fn burn(&mut self, token: &str, from: &str, amount: u128) -> Result<Receipt> {
        let side = self.side_of(token)?;
        if from == self.address {
            return Err(DexError::InvalidConfig(
                "pair balances cannot be burned".to_string(),
            ));
        }
        let event = self.ledger_mut(side).burn(from, amount)?;
        log::info!("burn {} {} from {}", amount, self.ledger(side).symbol(), from);
        Ok(self.commit(Vec::new(), event))
    }

    // ─────────────────────────────────────────────────────────
    // WRITES
    // ─────────────────────────────────────────────────────────

    /// Sell `amount_in` of `input_token` for the other token.
    ///
    /// `min_out` rejects the trade if the output would fall below it.
    pub fn swap(
        &mut self,
        trader: &str,
        input_token: &str,
        amount_in: u128,
        min_out: Option<u128>,
    ) -> Result<SwapResult> {
        self.swap_inner(trader, input_token, amount_in, min_out)
            .inspect_err(|e| log::warn!("swap rejected for {}: {}", trader, e))
    }

    fn swap_inner(
        &mut self,
        trader: &str,
        input_token: &str,
        amount_in: u128,
        min_out: Option<u128>,
    ) -> Result<SwapResult> {
        if amount_in == 0 {
            return Err(DexError::ZeroAmount);
        }
        self.reject_self(trader)?;
        let input = self.side_of(input_token)?;
        let output = input.opposite();
        let (reserve_in, reserve_out) = self.pair.reserves_for(input);
        let pair_addr = self.address.clone();

        // a short approval is reported ahead of any quote outcome
        self.ledger(input)
            .ensure_can_transfer_from(&pair_addr, trader, amount_in)?;

        let SwapQuote {
            amount_out, fee, ..
        } = self.quote_side(input, amount_in)?;
        if amount_out == 0 {
            return Err(DexError::ZeroAmount);
        }
        if amount_out >= reserve_out {
            return Err(DexError::InsufficientReserve {
                reserve: reserve_out,
                requested: amount_out,
            });
        }
        if let Some(min) = min_out {
            if amount_out < min {
                return Err(DexError::SlippageExceeded {
                    expected_min: min,
                    actual: amount_out,
                });
            }
        }
        let new_reserve_in = reserve_in.checked_add(amount_in).ok_or(DexError::Overflow)?;

        // output leg validated before either ledger is touched
        self.ledger(output).ensure_can_transfer(&pair_addr, amount_out)?;

        let leg_in = self
            .ledger_mut(input)
            .transfer_from(&pair_addr, trader, &pair_addr, amount_in)?;
        let leg_out = self
            .ledger_mut(output)
            .transfer(&pair_addr, trader, amount_out)?;
        self.pair.set_reserve(input, new_reserve_in);
        self.pair.set_reserve(output, reserve_out - amount_out);

        log::info!(
            "swap {} {} -> {} {} by {} (fee {})",
            amount_in,
            self.ledger(input).symbol(),
            amount_out,
            self.ledger(output).symbol(),
            trader,
            fee
        );
        let event = DexEvent::Swap {
            trader: trader.to_string(),
            token_in: self.ledger(input).address().to_string(),
            amount_in,
            token_out: self.ledger(output).address().to_string(),
            amount_out,
            fee,
        };
        let receipt = self.commit(vec![leg_in, leg_out], event);
        Ok(SwapResult {
            amount_out,
            fee,
            receipt,
        })
    }

    /// Deposit both tokens and mint liquidity shares to `provider`.
    pub fn add_liquidity(
        &mut self,
        provider: &str,
        amount_a: u128,
        amount_b: u128,
    ) -> Result<LiquidityResult> {
        self.add_liquidity_inner(provider, amount_a, amount_b)
            .inspect_err(|e| log::warn!("add_liquidity rejected for {}: {}", provider, e))
    }

    fn add_liquidity_inner(
        &mut self,
        provider: &str,
        amount_a: u128,
        amount_b: u128,
    ) -> Result<LiquidityResult> {
        self.reject_self(provider)?;
        let plan = self.preview_add(amount_a, amount_b)?;

        let new_a = self
            .pair
            .reserve_a
            .checked_add(plan.amount_a)
            .ok_or(DexError::Overflow)?;
        let new_b = self
            .pair
            .reserve_b
            .checked_add(plan.amount_b)
            .ok_or(DexError::Overflow)?;
        self.pair
            .total_shares
            .checked_add(plan.shares)
            .ok_or(DexError::Overflow)?;

        let pair_addr = self.address.clone();
        self.token_a
            .ensure_can_transfer_from(&pair_addr, provider, plan.amount_a)?;
        self.token_b
            .ensure_can_transfer_from(&pair_addr, provider, plan.amount_b)?;

        let leg_a = self
            .token_a
            .transfer_from(&pair_addr, provider, &pair_addr, plan.amount_a)?;
        let leg_b = self
            .token_b
            .transfer_from(&pair_addr, provider, &pair_addr, plan.amount_b)?;
        let was_empty = self.pair.is_empty();
        self.pair.reserve_a = new_a;
        self.pair.reserve_b = new_b;
        self.pair.credit_shares(provider, plan.shares);

        if was_empty {
            log::info!("pool activated by {}", provider);
        }
        log::info!(
            "add_liquidity {} {} + {} {} -> {} shares for {}",
            plan.amount_a,
            self.token_a.symbol(),
            plan.amount_b,
            self.token_b.symbol(),
            plan.shares,
            provider
        );
        let event = DexEvent::LiquidityAdded {
            provider: provider.to_string(),
            amount_a: plan.amount_a,
            amount_b: plan.amount_b,
            shares: plan.shares,
        };
        let receipt = self.commit(vec![leg_a, leg_b], event);
        Ok(LiquidityResult {
            amount_a: plan.amount_a,
            amount_b: plan.amount_b,
            shares: plan.shares,
            receipt,
        })
    }

    /// Burn `shares` of `provider`'s position and pay out the backing reserves.
    pub fn remove_liquidity(&mut self, provider: &str, shares: u128) -> Result<LiquidityResult> {
        self.remove_liquidity_inner(provider, shares)
            .inspect_err(|e| log::warn!("remove_liquidity rejected for {}: {}", provider, e))
    }

    fn remove_liquidity_inner(&mut self, provider: &str, shares: u128) -> Result<LiquidityResult> {
        if shares == 0 {
            return Err(DexError::ZeroAmount);
        }
        self.reject_self(provider)?;
        let held = self.pair.shares_of(provider);
        if held < shares {
            return Err(DexError::InsufficientShares {
                account: provider.to_string(),
                held,
                needed: shares,
            });
        }

        let (out_a, out_b) = self.preview_remove(shares)?;
        if out_a == 0 || out_b == 0 {
            // the burn would be a pure donation to the remaining holders
            return Err(DexError::ZeroAmount);
        }

        let pair_addr = self.address.clone();
        self.token_a.ensure_can_transfer(&pair_addr, out_a)?;
        self.token_b.ensure_can_transfer(&pair_addr, out_b)?;

        let leg_a = self.token_a.transfer(&pair_addr, provider, out_a)?;
        let leg_b = self.token_b.transfer(&pair_addr, provider, out_b)?;
        self.pair.debit_shares(provider, shares);
        self.pair.reserve_a -= out_a;
        self.pair.reserve_b -= out_b;

        log::info!(
            "remove_liquidity {} shares -> {} {} + {} {} for {}",
            shares,
            out_a,
            self.token_a.symbol(),
            out_b,
            self.token_b.symbol(),
            provider
        );
        if self.pair.is_empty() {
            log::info!("pool drained; back to empty");
        }
        let event = DexEvent::LiquidityRemoved {
            provider: provider.to_string(),
            amount_a: out_a,
            amount_b: out_b,
            shares,
        };
        let receipt = self.commit(vec![leg_a, leg_b], event);
        Ok(LiquidityResult {
            amount_a: out_a,
            amount_b: out_b,
            shares,
            receipt,
        })
    }

    // ─────────────────────────────────────────────────────────
    // INVARIANTS
    // ─────────────────────────────────────────────────────────

    /// Verify the pair's bookkeeping against the ledgers.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let p = &self.pair;
        let held_a = self.token_a.balance_of(&self.address);
        let held_b = self.token_b.balance_of(&self.address);
        if p.reserve_a != held_a || p.reserve_b != held_b {
            return Err(format!(
                "reserves ({}, {}) differ from pair balances ({}, {})",
                p.reserve_a, p.reserve_b, held_a, held_b
            ));
        }
        let empty = p.total_shares == 0;
        if empty != (p.reserve_a == 0 && p.reserve_b == 0) {
            return Err(format!(
                "total_shares {} inconsistent with reserves ({}, {})",
                p.total_shares, p.reserve_a, p.reserve_b
            ));
        }
        if !empty && (p.reserve_a == 0 || p.reserve_b == 0) {
            return Err("active pool with a zero reserve".to_string());
        }
        if p.position_sum() != p.total_shares {
            return Err(format!(
                "positions sum to {} but total_shares is {}",
                p.position_sum(),
                p.total_shares
            ));
        }
        for ledger in [&self.token_a, &self.token_b] {
            if ledger.circulating() != ledger.total_supply() {
                return Err(format!(
                    "{} balances sum to {} but supply is {}",
                    ledger.symbol(),
                    ledger.circulating(),
                    ledger.total_supply()
                ));
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // INTERNAL HELPERS
    // ─────────────────────────────────────────────────────────

    fn reject_self(&self, account: &str) -> Result<()> {
        if account == self.address {
            return Err(DexError::InvalidConfig(
                "the pair cannot act as its own counterparty".to_string(),
            ));
        }
        Ok(())
    }

    /// Journal the token legs and the headline event under one sequence
    /// number; the receipt carries the headline event.
    fn commit(&mut self, legs: Vec<DexEvent>, event: DexEvent) -> Receipt {
        self.seq += 1;
        let seq = self.seq;
        self.journal
            .extend(legs.into_iter().map(|event| Receipt { seq, event }));
        let receipt = Receipt { seq, event };
        self.journal.push(receipt.clone());
        if self.journal.len() > JOURNAL_CAPACITY {
            let excess = self.journal.len() - JOURNAL_CAPACITY;
            self.journal.drain(..excess);
        }
        receipt
    }

    /// Seed a ledger balance. Only deployment calls this.
    pub(crate) fn mint(&mut self, side: Side, to: &str, amount: u128) -> Result<Receipt> {
        let event = self.ledger_mut(side).mint(to, amount)?;
        Ok(self.commit(Vec::new(), event))
    }
}

fn check_setup(
    address: &str,
    token_a: &TokenLedger,
    token_b: &TokenLedger,
    fee_bps: u128,
) -> Result<()> {
    if address.is_empty() {
        return Err(DexError::InvalidConfig("pair address required".to_string()));
    }
    if token_a.address() == token_b.address() {
        return Err(DexError::InvalidConfig(
            "cannot create pair with identical tokens".to_string(),
        ));
    }
    if token_a.symbol() == token_b.symbol() {
        return Err(DexError::InvalidConfig(format!(
            "both tokens use symbol '{}'",
            token_a.symbol()
        )));
    }
    if address == token_a.address() || address == token_b.address() {
        return Err(DexError::InvalidConfig(
            "pair address collides with a token address".to_string(),
        ));
    }
    if fee_bps > MAX_FEE_BPS {
        return Err(DexError::InvalidConfig(format!(
            "fee too high (max {} bps)",
            MAX_FEE_BPS
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
