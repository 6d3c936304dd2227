use crate::commands::common::{fmt_amount, save_state, state_file};
use crate::{print_info, print_success};
use colored::*;
use simpledex_core::store::{Snapshot, SNAPSHOT_VERSION};
use simpledex_core::{DexConfig, Side};
use std::path::{Path, PathBuf};

pub fn handle(
    config: Option<PathBuf>,
    force: bool,
    state_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = state_file(state_dir);
    if path.exists() && !force {
        return Err(format!(
            "A deployment already exists at {} (use --force to replace it)",
            path.display()
        )
        .into());
    }

    let config = match config {
        Some(file) => {
            print_info(&format!("Loading config from {}", file.display()));
            DexConfig::load_from_file(&file)?
        }
        None => DexConfig::load_from_env()?,
    };

    println!("Deploying contracts with the account: {}", config.deployer.yellow());
    let (engine, deployment) = simpledex_core::deploy(&config)?;

    println!("{}", "Deployment".cyan().bold());
    println!("{}", "─".repeat(60));
    println!(
        "  {:<12} {} ({}, {} decimals)",
        "Token A:",
        deployment.token_a.address.green(),
        deployment.token_a.symbol,
        deployment.token_a.decimals
    );
    println!(
        "  {:<12} {} ({}, {} decimals)",
        "Token B:",
        deployment.token_b.address.green(),
        deployment.token_b.symbol,
        deployment.token_b.decimals
    );
    println!("  {:<12} {}", "SimpleDEX:", deployment.pair.green());
    println!("  {:<12} {} bps", "Fee:", deployment.fee_bps);
    println!("  {:<12} {:?}", "Ratio:", deployment.ratio_policy);
    println!(
        "  {:<12} {} / {}",
        "Minted:",
        fmt_amount(&engine, Side::A, engine.ledger(Side::A).total_supply()),
        fmt_amount(&engine, Side::B, engine.ledger(Side::B).total_supply())
    );

    save_state(
        state_dir,
        &Snapshot {
            version: SNAPSHOT_VERSION,
            deployment,
            engine,
        },
    )?;
    print_success(&format!("State saved to {}", path.display()));
    Ok(())
}
