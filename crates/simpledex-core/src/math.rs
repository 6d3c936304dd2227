// SPDX-License-Identifier: AGPL-3.0-only
//! # Pair Math
//!
//! Integer-only constant product (x·y=k) arithmetic. Every product of two
//! `u128` amounts is carried in a 256-bit intermediate, so 18-decimal token
//! amounts never overflow mid-formula. Results that do not fit back into a
//! `u128` surface as [`DexError::Overflow`].
//!
//! No f32/f64 anywhere: quotes must be bit-identical to executed swaps.

use crate::error::{DexError, Result};

// kept apart from the crate's one-parameter `Result` alias, which the
// macro expansion would otherwise pick up
mod wide {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer for intermediate products.
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Basis point denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

fn narrow(v: U256) -> Result<u128> {
    if v.bits() > 128 {
        return Err(DexError::Overflow);
    }
    Ok(v.low_u128())
}

/// `floor(a * b / d)` without intermediate overflow.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128> {
    if d == 0 {
        return Err(DexError::Overflow);
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(d))
}

/// `ceil(a * b / d)` without intermediate overflow.
pub fn mul_div_ceil(a: u128, b: u128, d: u128) -> Result<u128> {
    if d == 0 {
        return Err(DexError::Overflow);
    }
    let num = U256::from(a) * U256::from(b);
    let d = U256::from(d);
    let q = num / d;
    let q = if (num % d).is_zero() { q } else { q + U256::one() };
    narrow(q)
}

/// Deduct fee from input amount. Returns `(after_fee, fee)`.
pub fn deduct_fee(amount: u128, fee_bps: u128) -> Result<(u128, u128)> {
    let fee = mul_div(amount, fee_bps, BPS_DENOMINATOR)?;
    let after_fee = amount.checked_sub(fee).ok_or(DexError::Overflow)?;
    Ok((after_fee, fee))
}

/// Constant product output: `out = in * reserve_out / (reserve_in + in)`.
///
/// `amount_in` is the post-fee amount. Fails with `EmptyPool` if either
/// reserve is zero. The result is always strictly below `reserve_out`.
pub fn compute_output(amount_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(DexError::EmptyPool);
    }
    if amount_in == 0 {
        return Ok(0);
    }
    let num = U256::from(amount_in) * U256::from(reserve_out);
    let den = U256::from(reserve_in) + U256::from(amount_in);
    narrow(num / den)
}

/// Price impact of a trade in bps: how far the execution price
/// (`out / in`) falls below the spot price (`reserve_out / reserve_in`).
pub fn price_impact_bps(
    amount_in: u128,
    amount_out: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> u128 {
    if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
        return 0;
    }
    // exec/spot = out * reserve_in / (in * reserve_out); never above 1
    let num = product(amount_out, reserve_in);
    let den = product(amount_in, reserve_out);
    let bps = U256::from(BPS_DENOMINATOR);
    let ratio = match num.checked_mul(bps) {
        Some(scaled) => scaled / den,
        None => num / (den / bps).max(U256::one()),
    };
    let ratio = ratio.min(bps).low_u128();
    BPS_DENOMINATOR - ratio
}

/// Shares minted for a non-initial deposit:
/// `min(amount_a * total / reserve_a, amount_b * total / reserve_b)`.
pub fn shares_for_deposit(
    amount_a: u128,
    amount_b: u128,
    reserve_a: u128,
    reserve_b: u128,
    total_shares: u128,
) -> Result<u128> {
    if reserve_a == 0 || reserve_b == 0 || total_shares == 0 {
        return Err(DexError::EmptyPool);
    }
    let from_a = mul_div(amount_a, total_shares, reserve_a)?;
    let from_b = mul_div(amount_b, total_shares, reserve_b)?;
    Ok(from_a.min(from_b))
}

/// Token amount backing `shares` out of `total_shares`, rounded down.
pub fn share_value(shares: u128, reserve: u128, total_shares: u128) -> Result<u128> {
    mul_div(shares, reserve, total_shares)
}

/// `shares * 10_000 / total_shares`, truncated; 0 for an empty pool.
pub fn share_basis_points(shares: u128, total_shares: u128) -> u128 {
    if total_shares == 0 {
        return 0;
    }
    mul_div(shares, BPS_DENOMINATOR, total_shares).unwrap_or(0)
}

/// `a * b` as a 256-bit value (used for k comparisons).
pub fn product(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

// ─────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────
