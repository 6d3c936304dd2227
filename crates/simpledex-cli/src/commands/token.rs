use crate::commands::common::{committed, fmt_amount, load_state, parse_amount, save_state};
use crate::{print_error, print_success, TokenCommands};
use colored::*;
use std::path::Path;

pub fn handle(action: TokenCommands, state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TokenCommands::Info { token } => token_info(&token, state_dir)?,
        TokenCommands::Balance { token, holder } => token_balance(&token, &holder, state_dir)?,
        TokenCommands::Allowance {
            token,
            owner,
            spender,
        } => token_allowance(&token, &owner, spender.as_deref(), state_dir)?,
        TokenCommands::Approve {
            account,
            token,
            spender,
            amount,
        } => token_approve(&account, &token, spender.as_deref(), &amount, state_dir)?,
        TokenCommands::Transfer {
            account,
            token,
            to,
            amount,
        } => token_transfer(&account, &token, &to, &amount, state_dir)?,
        TokenCommands::Burn {
            account,
            token,
            amount,
        } => token_burn(&account, &token, &amount, state_dir)?,
    }
    Ok(())
}

fn token_info(token: &str, state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let engine = &snapshot.engine;
    let side = engine.side_of(token)?;
    let ledger = engine.ledger(side);

    println!("{}", "Token Info".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Address:      {}", ledger.address().green());
    println!("  Name:         {}", ledger.name());
    println!("  Symbol:       {}", ledger.symbol().yellow());
    println!("  Decimals:     {}", ledger.decimals());
    println!(
        "  Total Supply: {}",
        fmt_amount(engine, side, ledger.total_supply())
    );
    println!("  Pair Side:    {}", side);
    Ok(())
}

fn token_balance(
    token: &str,
    holder: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let engine = &snapshot.engine;
    let side = engine.side_of(token)?;
    let balance = engine.ledger(side).balance_of(holder);
    println!(
        "  {} balance: {}",
        holder,
        fmt_amount(engine, side, balance).green().bold()
    );
    Ok(())
}

fn token_allowance(
    token: &str,
    owner: &str,
    spender: Option<&str>,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let engine = &snapshot.engine;
    let side = engine.side_of(token)?;
    let spender = spender.unwrap_or(engine.address());
    let allowed = engine.ledger(side).allowance(owner, spender);
    let shown = if allowed == u128::MAX {
        "unlimited".to_string()
    } else {
        fmt_amount(engine, side, allowed)
    };
    println!("  Allowance {} → {}: {}", owner, spender, shown.green());
    Ok(())
}

fn token_approve(
    account: &str,
    token: &str,
    spender: Option<&str>,
    amount: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = load_state(state_dir)?;
    let engine = &mut snapshot.engine;
    let side = engine.side_of(token)?;
    let spender = spender.unwrap_or(engine.address()).to_string();
    let amount = if amount.eq_ignore_ascii_case("max") {
        u128::MAX
    } else {
        parse_amount(engine, side, amount)?
    };

    let receipt = match engine.approve(token, account, &spender, amount) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("Approve failed: {}", e));
            return Err(e.into());
        }
    };
    save_state(state_dir, &snapshot)?;
    print_success(&committed(&receipt));
    Ok(())
}

fn token_transfer(
    account: &str,
    token: &str,
    to: &str,
    amount: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = load_state(state_dir)?;
    let engine = &mut snapshot.engine;
    let side = engine.side_of(token)?;
    let amount = parse_amount(engine, side, amount)?;

    let receipt = match engine.transfer(token, account, to, amount) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("Transfer failed: {}", e));
            return Err(e.into());
        }
    };
    println!(
        "  Sent {} from {} to {}",
        fmt_amount(engine, side, amount),
        account,
        to
    );
    save_state(state_dir, &snapshot)?;
    print_success(&committed(&receipt));
    Ok(())
}

fn token_burn(
    account: &str,
    token: &str,
    amount: &str,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = load_state(state_dir)?;
    let engine = &mut snapshot.engine;
    let side = engine.side_of(token)?;
    let amount = parse_amount(engine, side, amount)?;

    let receipt = match engine.burn(token, account, amount) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("Burn failed: {}", e));
            return Err(e.into());
        }
    };
    println!(
        "  Burned {} from {}",
        fmt_amount(engine, side, amount),
        account
    );
    save_state(state_dir, &snapshot)?;
    print_success(&committed(&receipt));
    Ok(())
}
