//! Fuzz target: pool operation sequences
//!
//! Drives random swaps, deposits, withdrawals, approvals and transfers
//! against one pool. Verifies nothing panics, rejected calls leave state
//! untouched, and the bookkeeping invariants hold after every step.
//!
//! Run: cargo +nightly fuzz run fuzz_pool_ops

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use simpledex_core::{AmmEngine, RatioPolicy, TokenLedger};

const PAIR: &str = "0xpair";
const TOKEN_A: &str = "0xalpha";
const TOKEN_B: &str = "0xbeta";
const ACCOUNTS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Swap { who: u8, a_in: bool, amount: u128, min_out: Option<u128> },
    Add { who: u8, amount_a: u128, amount_b: u128 },
    Remove { who: u8, shares: u128 },
    Approve { who: u8, a: bool, amount: u128 },
    Transfer { from: u8, to: u8, a: bool, amount: u128 },
}

#[derive(Arbitrary, Debug)]
struct FuzzPoolInput {
    fee_bps: u16,
    exact: bool,
    funding: [u128; 3],
    ops: Vec<FuzzOp>,
}

fn account(i: u8) -> &'static str {
    ACCOUNTS[i as usize % ACCOUNTS.len()]
}

fn token(a: bool) -> &'static str {
    if a {
        TOKEN_A
    } else {
        TOKEN_B
    }
}

fuzz_target!(|input: FuzzPoolInput| {
    let mut a = TokenLedger::new(TOKEN_A, "Alpha", "ALP", 18).unwrap();
    let mut b = TokenLedger::new(TOKEN_B, "Beta", "BET", 6).unwrap();
    for (who, fund) in ACCOUNTS.iter().zip(input.funding) {
        // keep total supply within u128
        let fund = fund / 4;
        if fund > 0 {
            a.mint(who, fund).unwrap();
            b.mint(who, fund).unwrap();
        }
    }
    let policy = if input.exact {
        RatioPolicy::Exact
    } else {
        RatioPolicy::Clamp
    };
    let fee = (input.fee_bps % 1_001) as u128;
    let mut engine = match AmmEngine::new(PAIR, a, b, fee, policy) {
        Ok(e) => e,
        Err(_) => return,
    };
    for who in ACCOUNTS {
        engine.approve(TOKEN_A, who, PAIR, u128::MAX).unwrap();
        engine.approve(TOKEN_B, who, PAIR, u128::MAX).unwrap();
    }

    // Bound sequence length (prevent timeouts)
    for op in input.ops.into_iter().take(64) {
        let before = engine.clone();
        let ok = match op {
            FuzzOp::Swap { who, a_in, amount, min_out } => {
                engine.swap(account(who), token(a_in), amount, min_out).is_ok()
            }
            FuzzOp::Add { who, amount_a, amount_b } => {
                engine.add_liquidity(account(who), amount_a, amount_b).is_ok()
            }
            FuzzOp::Remove { who, shares } => engine.remove_liquidity(account(who), shares).is_ok(),
            FuzzOp::Approve { who, a, amount } => {
                engine.approve(token(a), account(who), PAIR, amount).is_ok()
            }
            FuzzOp::Transfer { from, to, a, amount } => {
                engine.transfer(token(a), account(from), account(to), amount).is_ok()
            }
        };
        if ok {
            assert_eq!(engine.seq(), before.seq() + 1);
        } else {
            assert_eq!(engine, before, "rejected operation mutated state");
        }
        if let Err(e) = engine.check_invariants() {
            panic!("invariant broken: {}", e);
        }
    }
});
