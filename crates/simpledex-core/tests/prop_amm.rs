// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS - simpledex-core
//
// Pool invariants that MUST hold for ALL reserves, fees and trade sizes.
// proptest generates hundreds of random pools and operations per property.
//
// Run: cargo test --release -p simpledex-core --test prop_amm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use proptest::prelude::*;
use simpledex_core::math::{compute_output, mul_div_ceil, product};
use simpledex_core::{AmmEngine, RatioPolicy, Side, TokenLedger};

const PAIR: &str = "0xpair";
const TOKEN_A: &str = "0xalpha";
const TOKEN_B: &str = "0xbeta";
const FUND: u128 = u128::MAX / 16;
const MAX_RESERVE: u128 = 1_000_000_000_000_000_000_000_000; // 1e24

fn funded_engine(fee_bps: u128, policy: RatioPolicy, accounts: &[&str]) -> AmmEngine {
    let mut a = TokenLedger::new(TOKEN_A, "Alpha", "ALP", 18).unwrap();
    let mut b = TokenLedger::new(TOKEN_B, "Beta", "BET", 6).unwrap();
    for who in accounts {
        a.mint(who, FUND).unwrap();
        b.mint(who, FUND).unwrap();
    }
    let mut e = AmmEngine::new(PAIR, a, b, fee_bps, policy).unwrap();
    for who in accounts {
        e.approve(TOKEN_A, who, PAIR, u128::MAX).unwrap();
        e.approve(TOKEN_B, who, PAIR, u128::MAX).unwrap();
    }
    e
}

/// Active pool seeded by "lp" with exactly `(reserve_a, reserve_b)`.
fn pool(reserve_a: u128, reserve_b: u128, fee_bps: u128) -> AmmEngine {
    let mut e = funded_engine(fee_bps, RatioPolicy::Clamp, &["lp", "trader"]);
    e.add_liquidity("lp", reserve_a, reserve_b).unwrap();
    e
}

fn token_of(side: Side) -> &'static str {
    match side {
        Side::A => TOKEN_A,
        Side::B => TOKEN_B,
    }
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::A), Just(Side::B)]
}

fn arb_reserve() -> impl Strategy<Value = u128> {
    1_000u128..=MAX_RESERVE
}

// ─────────────────────────────────────────────────────────────────
// SWAP PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: k = reserve_a * reserve_b never decreases across a swap
    #[test]
    fn prop_swap_k_non_decreasing(
        ra in arb_reserve(),
        rb in arb_reserve(),
        fee in 0u128..=1_000,
        amount in 1u128..=MAX_RESERVE,
        side in arb_side(),
    ) {
        let mut e = pool(ra, rb, fee);
        let before = e.clone();
        let (a0, b0, _) = e.get_reserves();
        match e.swap("trader", token_of(side), amount, None) {
            Ok(_) => {
                let (a1, b1, _) = e.get_reserves();
                prop_assert!(product(a1, b1) >= product(a0, b0), "k decreased");
                prop_assert!(e.check_invariants().is_ok());
            }
            Err(_) => prop_assert_eq!(e, before, "rejected swap changed state"),
        }
    }

    /// PROPERTY: quote is monotonic in input and strictly below reserve_out
    #[test]
    fn prop_quote_monotonic_and_bounded(
        ra in arb_reserve(),
        rb in arb_reserve(),
        fee in 0u128..=1_000,
        x in 0u128..=MAX_RESERVE,
        dx in 0u128..=MAX_RESERVE,
        side in arb_side(),
    ) {
        let e = pool(ra, rb, fee);
        let q1 = e.get_swap_amount(token_of(side), x).unwrap();
        let q2 = e.get_swap_amount(token_of(side), x + dx).unwrap();
        let reserve_out = e.pair().reserve(side.opposite());
        prop_assert!(q1 <= q2, "quote not monotonic: {} > {}", q1, q2);
        prop_assert!(q2 < reserve_out, "quote {} reached reserve {}", q2, reserve_out);
    }

    /// PROPERTY: the raw formula never pays out the whole reserve, even for huge inputs
    #[test]
    fn prop_compute_output_below_reserve(
        amount in any::<u128>(),
        reserve_in in 1u128..=u128::MAX,
        reserve_out in 1u128..=u128::MAX,
    ) {
        let out = compute_output(amount, reserve_in, reserve_out).unwrap();
        prop_assert!(out < reserve_out);
    }

    /// PROPERTY: A→B then B→A with the quoted amount never returns more than was sold
    #[test]
    fn prop_round_trip_no_gain(
        ra in arb_reserve(),
        rb in arb_reserve(),
        fee in 0u128..=1_000,
        amount in 1u128..=MAX_RESERVE,
        side in arb_side(),
    ) {
        let mut e = pool(ra, rb, fee);
        let first = match e.swap("trader", token_of(side), amount, None) {
            Ok(r) => r,
            Err(_) => return Ok(()),
        };
        let quoted_back = e.get_swap_amount(token_of(side.opposite()), first.amount_out).unwrap();
        prop_assert!(quoted_back <= amount, "round trip gained: {} -> {}", amount, quoted_back);
        if let Ok(second) = e.swap("trader", token_of(side.opposite()), first.amount_out, None) {
            prop_assert_eq!(second.amount_out, quoted_back);
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// LIQUIDITY PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: remove then re-add the returned amounts restores shares and reserves
    #[test]
    fn prop_remove_then_add_restores_state(
        ra in 1u128..=1_000_000_000_000_000_000u128,
        k in 1u128..=1_000,
        frac_bps in 1u128..=10_000,
    ) {
        // shares 1:1 with token A and an integral B:A ratio keep every division exact
        let mut e = pool(ra, ra * k, 0);
        let before = e.get_reserves();
        let shares = (ra * frac_bps / 10_000).max(1);

        let removed = e.remove_liquidity("lp", shares).unwrap();
        let added = e.add_liquidity("lp", removed.amount_a, removed.amount_b).unwrap();

        prop_assert_eq!(added.shares, shares);
        prop_assert_eq!(e.get_reserves(), before);
        prop_assert!(e.check_invariants().is_ok());
    }

    /// PROPERTY: after arbitrary trading, remove + re-add never mints more shares
    /// than were burned. The shortfall is at most one base unit of the scarcer
    /// reserve, priced in shares, and each reserve loses only that many shares' worth
    #[test]
    fn prop_remove_then_add_never_gains(
        ra in 1_000_000u128..=MAX_RESERVE,
        rb in 1_000_000u128..=MAX_RESERVE,
        trade in 1u128..=MAX_RESERVE,
        frac_bps in 100u128..=9_999,
    ) {
        let mut e = pool(ra, rb, 30);
        let _ = e.swap("trader", TOKEN_A, trade, None);
        let (a0, b0, t0) = e.get_reserves();
        let shares = t0 * frac_bps / 10_000;
        prop_assume!(shares > 0);

        let removed = match e.remove_liquidity("lp", shares) {
            Ok(r) => r,
            Err(_) => return Ok(()),
        };
        let (a_mid, b_mid, t_mid) = e.get_reserves();
        if let Ok(added) = e.add_liquidity("lp", removed.amount_a, removed.amount_b) {
            prop_assert!(added.shares <= shares);
            let (a1, b1, t1) = e.get_reserves();
            prop_assert!(t1 <= t0 && a1 <= a0 && b1 <= b0);

            let share_drift = t0 - t1;
            let share_bound = mul_div_ceil(t0, 1, a_mid.min(b_mid)).unwrap() + 1;
            prop_assert!(
                share_drift <= share_bound,
                "shares drifted {} (bound {})", share_drift, share_bound
            );
            prop_assert!(a0 - a1 <= mul_div_ceil(share_drift, a_mid, t_mid).unwrap());
            prop_assert!(b0 - b1 <= mul_div_ceil(share_drift, b_mid, t_mid).unwrap());
        }
        prop_assert!(e.check_invariants().is_ok());
    }

    /// PROPERTY: holders' basis points sum to 10000 within one unit per holder
    #[test]
    fn prop_basis_points_sum(
        ra in 1_000u128..=MAX_RESERVE,
        k in 1u128..=1_000,
        deposits in proptest::collection::vec(1u128..=1_000_000_000_000u128, 1..8),
    ) {
        let holders = ["h0", "h1", "h2", "h3", "h4", "h5", "h6", "h7"];
        let mut accounts = vec!["lp"];
        accounts.extend_from_slice(&holders);
        let mut e = funded_engine(0, RatioPolicy::Clamp, &accounts);
        e.add_liquidity("lp", ra, ra * k).unwrap();
        for (who, amount) in holders.iter().zip(&deposits) {
            e.add_liquidity(who, *amount, amount * k).unwrap();
        }

        let mut sum = e.get_user_liquidity("lp").1;
        for who in holders.iter().take(deposits.len()) {
            sum += e.get_user_liquidity(who).1;
        }
        let n = deposits.len() as u128 + 1;
        prop_assert!(sum <= 10_000, "bps sum {} exceeds 10000", sum);
        prop_assert!(sum + n >= 10_000, "bps sum {} too far below 10000", sum);
    }
}

// ─────────────────────────────────────────────────────────────────
// SEQUENCE PROPERTIES
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Swap(usize, Side, u128),
    Add(usize, u128, u128),
    Remove(usize, u128),
    Approve(usize, Side, u128),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, arb_side(), 0u128..=MAX_RESERVE).prop_map(|(w, s, a)| Op::Swap(w, s, a)),
        (0usize..3, 0u128..=MAX_RESERVE, 0u128..=MAX_RESERVE)
            .prop_map(|(w, a, b)| Op::Add(w, a, b)),
        (0usize..3, 0u128..=MAX_RESERVE).prop_map(|(w, s)| Op::Remove(w, s)),
        (0usize..3, arb_side(), 0u128..=MAX_RESERVE).prop_map(|(w, s, a)| Op::Approve(w, s, a)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// PROPERTY: any operation sequence keeps invariants; rejections change nothing
    #[test]
    fn prop_random_ops_keep_invariants(
        policy in prop_oneof![Just(RatioPolicy::Clamp), Just(RatioPolicy::Exact)],
        fee in 0u128..=1_000,
        ops in proptest::collection::vec(arb_op(), 1..40),
    ) {
        let who = ["alice", "bob", "carol"];
        let mut e = funded_engine(fee, policy, &who);
        for op in ops {
            let before = e.clone();
            let res = match op {
                Op::Swap(w, side, amt) => e.swap(who[w], token_of(side), amt, None).map(|_| ()),
                Op::Add(w, a, b) => e.add_liquidity(who[w], a, b).map(|_| ()),
                Op::Remove(w, s) => e.remove_liquidity(who[w], s).map(|_| ()),
                Op::Approve(w, side, amt) => e.approve(token_of(side), who[w], PAIR, amt).map(|_| ()),
            };
            if res.is_err() {
                prop_assert_eq!(&e, &before);
            } else {
                prop_assert_eq!(e.seq(), before.seq() + 1);
            }
            prop_assert!(e.check_invariants().is_ok(), "{:?}", e.check_invariants());
        }
    }
}
