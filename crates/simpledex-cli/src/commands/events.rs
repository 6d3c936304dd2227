use crate::commands::common::load_state;
use colored::*;
use simpledex_core::{DexEvent, Receipt};
use std::path::Path;

pub fn handle(limit: usize, json: bool, state_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_state(state_dir)?;
    let journal = snapshot.engine.journal();
    let recent = &journal[journal.len().saturating_sub(limit)..];

    if json {
        println!("{}", serde_json::to_string_pretty(recent)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Events ({} of {})", recent.len(), journal.len())
            .cyan()
            .bold()
    );
    println!("{}", "─".repeat(70));
    for receipt in recent {
        println!("  {}", describe(receipt));
    }
    if journal.is_empty() {
        println!("  {}", "No events yet".dimmed());
    }
    Ok(())
}

fn short(addr: &str) -> &str {
    addr.get(..12).unwrap_or(addr)
}

fn describe(receipt: &Receipt) -> String {
    let seq = format!("#{:<4}", receipt.seq).yellow();
    let body = match &receipt.event {
        DexEvent::Transfer {
            token,
            from,
            to,
            amount,
        } => {
            let from = if from.is_empty() { "mint" } else { from.as_str() };
            let to = if to.is_empty() { "burn" } else { to.as_str() };
            format!("Transfer  {} {} → {} [{}]", amount, from, to, short(token))
        }
        DexEvent::Approval {
            token,
            owner,
            spender,
            amount,
        } => format!(
            "Approval  {} → {} = {} [{}]",
            owner,
            short(spender),
            amount,
            short(token)
        ),
        DexEvent::Swap {
            trader,
            amount_in,
            amount_out,
            fee,
            ..
        } => format!(
            "Swap      {} sold {} for {} (fee {})",
            trader, amount_in, amount_out, fee
        ),
        DexEvent::LiquidityAdded {
            provider,
            amount_a,
            amount_b,
            shares,
        } => format!(
            "Add       {} +{} / +{} → {} shares",
            provider, amount_a, amount_b, shares
        ),
        DexEvent::LiquidityRemoved {
            provider,
            amount_a,
            amount_b,
            shares,
        } => format!(
            "Remove    {} -{} / -{} ← {} shares",
            provider, amount_a, amount_b, shares
        ),
    };
    format!("{} {}", seq, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::deploy;
    use tempfile::TempDir;

    #[test]
    fn test_events_after_deploy() {
        let dir = TempDir::new().unwrap();
        deploy::handle(None, false, dir.path()).unwrap();
        assert!(handle(5, false, dir.path()).is_ok());
        assert!(handle(5, true, dir.path()).is_ok());
    }

    #[test]
    fn test_describe_mint() {
        let receipt = Receipt {
            seq: 1,
            event: DexEvent::Transfer {
                token: "0xabcdef0123456789".to_string(),
                from: String::new(),
                to: "deployer".to_string(),
                amount: 5,
            },
        };
        let line = describe(&receipt);
        assert!(line.contains("mint → deployer"));
    }
}
