use crate::commands::common::{
    committed, fmt_amount, fmt_shares, load_state, parse_amount, save_state, DISPLAY_PLACES,
};
use crate::{print_error, print_info, print_success, DexCommands};
use colored::Colorize;
use simpledex_core::Side;
use std::path::Path;

/// Handle DEX subcommands.
pub fn handle(action: DexCommands, state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DexCommands::Pool => pool_info(state_dir),
        DexCommands::Quote {
            token_in,
            amount_in,
        } => get_quote(&token_in, &amount_in, state_dir),
        DexCommands::Swap {
            account,
            token_in,
            amount_in,
            min_out,
        } => dex_swap(&account, &token_in, &amount_in, min_out.as_deref(), state_dir),
        DexCommands::AddLiquidity {
            account,
            amount_a,
            amount_b,
        } => dex_add_liquidity(&account, &amount_a, &amount_b, state_dir),
        DexCommands::RemoveLiquidity { account, shares } => {
            dex_remove_liquidity(&account, &shares, state_dir)
        }
        DexCommands::Position { account } => get_position(&account, state_dir),
    }
}

fn pool_info(state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let engine = &snapshot.engine;
    let (reserve_a, reserve_b, total) = engine.get_reserves();
    let sym_a = engine.ledger(Side::A).symbol();
    let sym_b = engine.ledger(Side::B).symbol();

    println!("{}", "Pool Info".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Pair:        {}", engine.address().yellow());
    println!("  Token A:     {} ({})", engine.token_a().green(), sym_a);
    println!("  Token B:     {} ({})", engine.token_b().green(), sym_b);
    println!("  Reserve A:   {}", fmt_amount(engine, Side::A, reserve_a));
    println!("  Reserve B:   {}", fmt_amount(engine, Side::B, reserve_b));
    println!("  Total LP:    {}", fmt_shares(engine, total));
    println!("  Providers:   {}", engine.pair().provider_count());
    println!("  Fee (bps):   {}", engine.fee_bps());
    match (
        engine.pool_price(Side::A, DISPLAY_PLACES),
        engine.pool_price(Side::B, DISPLAY_PLACES),
    ) {
        (Some(a_in_b), Some(b_in_a)) => {
            println!("  Price:       1 {} = {} {}", sym_a, a_in_b, sym_b);
            println!("               1 {} = {} {}", sym_b, b_in_a, sym_a);
        }
        _ => println!("  {}", "Pool is empty (no liquidity yet)".dimmed()),
    }
    Ok(())
}

fn get_quote(
    token_in: &str,
    amount_in: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let engine = &snapshot.engine;
    let side = engine.side_of(token_in)?;
    let amount = parse_amount(engine, side, amount_in)?;
    let quote = engine.quote_side(side, amount)?;

    println!("{}", "Swap Quote".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Sell:         {}", fmt_amount(engine, side, amount));
    println!(
        "  Receive:      {}",
        fmt_amount(engine, side.opposite(), quote.amount_out)
            .green()
            .bold()
    );
    println!("  Fee:          {}", fmt_amount(engine, side, quote.fee));
    let impact = format!(
        "{}.{:02}%",
        quote.price_impact_bps / 100,
        quote.price_impact_bps % 100
    );
    if quote.price_impact_bps > 500 {
        println!("  Price Impact: {}", impact.red().bold());
    } else {
        println!("  Price Impact: {}", impact);
    }
    Ok(())
}

fn dex_swap(
    account: &str,
    token_in: &str,
    amount_in: &str,
    min_out: Option<&str>,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = load_state(state_dir)?;
    let engine = &mut snapshot.engine;
    let side = engine.side_of(token_in)?;
    let amount = parse_amount(engine, side, amount_in)?;
    let min_out = match min_out {
        Some(m) => Some(parse_amount(engine, side.opposite(), m)?),
        None => None,
    };

    let result = match engine.swap(account, token_in, amount, min_out) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("Swap failed: {}", e));
            return Err(e.into());
        }
    };
    println!(
        "  Swapped {} → {}",
        fmt_amount(engine, side, amount),
        fmt_amount(engine, side.opposite(), result.amount_out)
            .green()
            .bold()
    );
    save_state(state_dir, &snapshot)?;
    print_success(&committed(&result.receipt));
    Ok(())
}

fn dex_add_liquidity(
    account: &str,
    amount_a: &str,
    amount_b: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = load_state(state_dir)?;
    let engine = &mut snapshot.engine;
    let amount_a = parse_amount(engine, Side::A, amount_a)?;
    let amount_b = parse_amount(engine, Side::B, amount_b)?;
    if engine.pair().is_empty() {
        print_info("Pool is empty: this deposit sets the initial price");
    }

    let result = match engine.add_liquidity(account, amount_a, amount_b) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("Add liquidity failed: {}", e));
            return Err(e.into());
        }
    };
    println!(
        "  Deposited {} + {}",
        fmt_amount(engine, Side::A, result.amount_a),
        fmt_amount(engine, Side::B, result.amount_b)
    );
    if result.amount_a < amount_a || result.amount_b < amount_b {
        print_info("Deposit clamped to the pool ratio; the excess stays in your wallet");
    }
    println!(
        "  Minted {} LP shares",
        fmt_shares(engine, result.shares).green().bold()
    );
    save_state(state_dir, &snapshot)?;
    print_success(&committed(&result.receipt));
    Ok(())
}

fn dex_remove_liquidity(
    account: &str,
    shares: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = load_state(state_dir)?;
    let engine = &mut snapshot.engine;
    let shares = if shares.eq_ignore_ascii_case("all") {
        engine.get_user_liquidity(account).0
    } else {
        parse_amount(engine, Side::A, shares)?
    };
    let (preview_a, preview_b) = engine.preview_remove(shares)?;
    print_info(&format!(
        "You will receive {} + {}",
        fmt_amount(engine, Side::A, preview_a),
        fmt_amount(engine, Side::B, preview_b)
    ));

    let result = match engine.remove_liquidity(account, shares) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("Remove liquidity failed: {}", e));
            return Err(e.into());
        }
    };
    println!(
        "  Burned {} LP shares → {} + {}",
        fmt_shares(engine, result.shares),
        fmt_amount(engine, Side::A, result.amount_a).green(),
        fmt_amount(engine, Side::B, result.amount_b).green()
    );
    save_state(state_dir, &snapshot)?;
    print_success(&committed(&result.receipt));
    Ok(())
}

fn get_position(account: &str, state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let engine = &snapshot.engine;
    let (shares, bps) = engine.get_user_liquidity(account);
    let (value_a, value_b) = engine.preview_remove(shares)?;

    println!("{}", "LP Position".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Account:     {}", account);
    println!("  Shares:      {}", fmt_shares(engine, shares).green());
    println!("  Pool Share:  {}.{:02}%", bps / 100, bps % 100);
    println!("  Backed By:   {}", fmt_amount(engine, Side::A, value_a));
    println!("               {}", fmt_amount(engine, Side::B, value_b));
    Ok(())
}
