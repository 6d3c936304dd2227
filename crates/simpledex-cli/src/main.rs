// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SIMPLEDEX CLI - Deploy, trade and provide liquidity on a local pool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "simpledex")]
#[command(about = "SimpleDEX CLI - Constant-product pool for two tokens", long_about = None)]
#[command(version)]
struct Cli {
    /// State directory (reads SIMPLEDEX_STATE_DIR env var, default: ~/.simpledex)
    #[arg(short, long, env = "SIMPLEDEX_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy token A, token B and the DEX pair
    Deploy {
        /// TOML deployment config (default: built-in MTK/sUSDC + SIMPLEDEX_* env vars)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Replace an existing deployment
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Token ledger operations
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// DEX pool operations
    Dex {
        #[command(subcommand)]
        action: DexCommands,
    },

    /// Show committed events
    Events {
        /// Number of most recent entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print raw JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Show token metadata
    Info {
        /// Token address or symbol
        token: String,
    },
    /// Query token balance for a holder
    Balance {
        /// Token address or symbol
        #[arg(short, long)]
        token: String,
        /// Holder address
        #[arg(long)]
        holder: String,
    },
    /// Query token allowance
    Allowance {
        /// Token address or symbol
        #[arg(short, long)]
        token: String,
        /// Owner address
        #[arg(short, long)]
        owner: String,
        /// Spender address (default: the DEX pair)
        #[arg(short, long)]
        spender: Option<String>,
    },
    /// Approve spender allowance
    Approve {
        /// Acting account
        #[arg(short, long)]
        account: String,
        /// Token address or symbol
        #[arg(short, long)]
        token: String,
        /// Spender address (default: the DEX pair)
        #[arg(long)]
        spender: Option<String>,
        /// Amount in display units, or "max"
        #[arg(long)]
        amount: String,
    },
    /// Transfer tokens to another address
    Transfer {
        /// Acting account
        #[arg(short, long)]
        account: String,
        /// Token address or symbol
        #[arg(short, long)]
        token: String,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in display units
        #[arg(long)]
        amount: String,
    },
    /// Burn tokens from the acting account
    Burn {
        /// Acting account
        #[arg(short, long)]
        account: String,
        /// Token address or symbol
        #[arg(short, long)]
        token: String,
        /// Amount in display units
        #[arg(long)]
        amount: String,
    },
}

#[derive(Subcommand)]
enum DexCommands {
    /// Show reserves, total shares and pool price
    Pool,
    /// Quote a swap without executing it
    Quote {
        /// Token to sell (address or symbol)
        #[arg(long)]
        token_in: String,
        /// Amount to sell (display units)
        #[arg(long)]
        amount_in: String,
    },
    /// Execute a token swap
    Swap {
        /// Acting account
        #[arg(short, long)]
        account: String,
        /// Token to sell (address or symbol)
        #[arg(long)]
        token_in: String,
        /// Amount to sell (display units)
        #[arg(long)]
        amount_in: String,
        /// Minimum amount to receive (display units, slippage protection)
        #[arg(long)]
        min_out: Option<String>,
    },
    /// Add liquidity to the pool
    AddLiquidity {
        /// Acting account
        #[arg(short, long)]
        account: String,
        /// Amount of token A (display units)
        #[arg(long)]
        amount_a: String,
        /// Amount of token B (display units)
        #[arg(long)]
        amount_b: String,
    },
    /// Remove liquidity from the pool
    RemoveLiquidity {
        /// Acting account
        #[arg(short, long)]
        account: String,
        /// Shares to burn (display units, same decimals as token A), or "all"
        #[arg(long)]
        shares: String,
    },
    /// Show an account's liquidity position
    Position {
        /// Account address
        #[arg(short, long)]
        account: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // Print banner
    print_banner();

    // Get state directory
    let state_dir = cli.state_dir.unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".simpledex")
    });

    // Ensure state directory exists
    std::fs::create_dir_all(&state_dir)?;

    match cli.command {
        Commands::Deploy { config, force } => {
            commands::deploy::handle(config, force, &state_dir)?;
        }
        Commands::Token { action } => {
            commands::token::handle(action, &state_dir)?;
        }
        Commands::Dex { action } => commands::dex::handle(action, &state_dir)?,
        Commands::Events { limit, json } => {
            commands::events::handle(limit, json, &state_dir)?;
        }
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║            SIMPLEDEX - CLI v0.1.0             ║"
            .cyan()
            .bold()
    );
    println!(
        "{}",
        "║       Constant Product | x * y = k            ║".cyan()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════╝".cyan()
    );
    println!();
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────
