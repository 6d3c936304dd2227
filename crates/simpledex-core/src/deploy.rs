//! # Deployment
//!
//! Brings a pool into existence in dependency order: token A, token B,
//! then the pair bound to both addresses. Each token's initial supply is
//! minted to the deployer.

use crate::amm::AmmEngine;
use crate::config::{DexConfig, TokenConfig};
use crate::error::Result;
use crate::pair::{RatioPolicy, Side};
use crate::token::TokenLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Addresses and parameters of a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub deployer: String,
    pub token_a: DeployedToken,
    pub token_b: DeployedToken,
    pub pair: String,
    pub fee_bps: u128,
    pub ratio_policy: RatioPolicy,
}

impl std::fmt::Display for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{} deployed to: {}", self.token_a.name, self.token_a.address)?;
        writeln!(f, "{} deployed to: {}", self.token_b.name, self.token_b.address)?;
        write!(f, "SimpleDEX deployed to: {}", self.pair)
    }
}

/// Deterministic address for the `nonce`-th deployment by `deployer`.
///
/// Format: "0x" + first 20 bytes of blake3(deployer:nonce), hex encoded.
pub fn derive_address(deployer: &str, nonce: u64) -> String {
    let input = format!("{}:{}", deployer, nonce);
    let hash = blake3::hash(input.as_bytes());
    format!("0x{}", hex::encode(&hash.as_bytes()[0..20]))
}

pub fn deploy(config: &DexConfig) -> Result<(AmmEngine, Deployment)> {
    config.validate()?;
    let deployer = config.deployer.as_str();

    let token_a = deploy_token(deployer, 0, &config.token_a)?;
    log::info!("{} deployed to: {}", token_a.name(), token_a.address());
    let token_b = deploy_token(deployer, 1, &config.token_b)?;
    log::info!("{} deployed to: {}", token_b.name(), token_b.address());

    let pair_address = derive_address(deployer, 2);
    let mut engine = AmmEngine::new(
        &pair_address,
        token_a,
        token_b,
        config.pool.fee_bps as u128,
        config.pool.ratio_policy,
    )?;
    log::info!("SimpleDEX deployed to: {}", pair_address);

    engine.mint(Side::A, deployer, config.token_a.initial_supply_base()?)?;
    engine.mint(Side::B, deployer, config.token_b.initial_supply_base()?)?;

    let describe = |side: Side| {
        let t = engine.ledger(side);
        DeployedToken {
            address: t.address().to_string(),
            name: t.name().to_string(),
            symbol: t.symbol().to_string(),
            decimals: t.decimals(),
        }
    };
    let deployment = Deployment {
        deployer: deployer.to_string(),
        token_a: describe(Side::A),
        token_b: describe(Side::B),
        pair: pair_address,
        fee_bps: engine.fee_bps(),
        ratio_policy: engine.ratio_policy(),
    };
    Ok((engine, deployment))
}

fn deploy_token(deployer: &str, nonce: u64, token: &TokenConfig) -> Result<TokenLedger> {
    TokenLedger::new(
        &derive_address(deployer, nonce),
        &token.name,
        &token.symbol,
        token.decimals,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_address_is_deterministic() {
        let a = derive_address("deployer", 0);
        assert_eq!(a, derive_address("deployer", 0));
        assert_ne!(a, derive_address("deployer", 1));
        assert_ne!(a, derive_address("other", 0));
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), 42);
    }

    #[test]
    fn test_deploy_default_config() {
        let config = DexConfig::default();
        let (engine, deployment) = deploy(&config).unwrap();

        assert_eq!(deployment.token_a.symbol, "MTK");
        assert_eq!(deployment.token_b.symbol, "sUSDC");
        assert_eq!(engine.token_a(), deployment.token_a.address);
        assert_eq!(engine.address(), deployment.pair);
        assert_eq!(engine.get_reserves(), (0, 0, 0));
        assert_eq!(
            engine.ledger(Side::A).balance_of("deployer"),
            1_000_000 * 10u128.pow(18)
        );
        assert_eq!(
            engine.ledger(Side::B).balance_of("deployer"),
            1_000_000 * 10u128.pow(6)
        );
        assert!(engine.check_invariants().is_ok());
    }

    #[test]
    fn test_deploy_is_reproducible() {
        let config = DexConfig::default();
        let (_, first) = deploy(&config).unwrap();
        let (_, second) = deploy(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_deploy_rejects_invalid_config() {
        let mut config = DexConfig::default();
        config.pool.fee_bps = 5_000;
        assert!(deploy(&config).is_err());
    }

    #[test]
    fn test_deployment_display() {
        let (_, deployment) = deploy(&DexConfig::default()).unwrap();
        let text = deployment.to_string();
        assert!(text.contains("MyToken deployed to: 0x"));
        assert!(text.contains("SimpleDEX deployed to: 0x"));
    }
}
