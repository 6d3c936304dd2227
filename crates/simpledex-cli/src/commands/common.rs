use simpledex_core::store::{self, Snapshot};
use simpledex_core::units::{format_units_fixed, parse_units};
use simpledex_core::{AmmEngine, Receipt, Side};
use std::path::{Path, PathBuf};

/// Places shown for balances and reserves.
pub const DISPLAY_PLACES: u8 = 4;

pub fn state_file(state_dir: &Path) -> PathBuf {
    state_dir.join("pool.json")
}

/// Shared snapshot loader. Fails with a hint when nothing has been deployed yet.
pub fn load_state(state_dir: &Path) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let path = state_file(state_dir);
    if !path.exists() {
        return Err(format!(
            "No deployment found at {} (run `simpledex deploy` first)",
            path.display()
        )
        .into());
    }
    Ok(store::load(&path)?)
}

pub fn save_state(state_dir: &Path, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
    store::save(
        &state_file(state_dir),
        &snapshot.deployment,
        &snapshot.engine,
    )?;
    Ok(())
}

/// Parse a display amount with the decimals of `side`'s token.
pub fn parse_amount(
    engine: &AmmEngine,
    side: Side,
    input: &str,
) -> Result<u128, Box<dyn std::error::Error>> {
    Ok(parse_units(input, engine.ledger(side).decimals())?)
}

/// "181.8181 sUSDC"
pub fn fmt_amount(engine: &AmmEngine, side: Side, amount: u128) -> String {
    let ledger = engine.ledger(side);
    format!(
        "{} {}",
        format_units_fixed(amount, ledger.decimals(), DISPLAY_PLACES),
        ledger.symbol()
    )
}

/// Shares are minted 1:1 with token A's base units on the first deposit,
/// so they display with token A's decimals.
pub fn fmt_shares(engine: &AmmEngine, shares: u128) -> String {
    format_units_fixed(shares, engine.ledger(Side::A).decimals(), DISPLAY_PLACES)
}

pub fn committed(receipt: &Receipt) -> String {
    format!("Committed {} (seq {})", receipt.event.name(), receipt.seq)
}
