use crate::amm::{DEFAULT_FEE_BPS, MAX_FEE_BPS};
use crate::error::{DexError, Result};
use crate::pair::RatioPolicy;
use crate::token::MAX_DECIMALS;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Serde adapter for u128 ↔ TOML: serialize as string, deserialize from string or integer.
/// The toml crate has no native u128, so supplies round-trip through strings.
mod u128_toml {
    use super::*;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u128, D::Error> {
        use serde::de::{self, Visitor};
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<u128, E> {
                v.replace('_', "").parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}

/// Deployment configuration: the two tokens, who deploys them, and pool parameters.
///
/// ```toml
/// deployer = "deployer"
///
/// [token_a]
/// name = "MyToken"
/// symbol = "MTK"
/// decimals = 18
/// initial_supply = "1000000"
///
/// [token_b]
/// name = "SimpleUSDC"
/// symbol = "sUSDC"
/// decimals = 6
/// initial_supply = 1000000
///
/// [pool]
/// fee_bps = 0
/// ratio_policy = "clamp"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexConfig {
    pub deployer: String,
    pub token_a: TokenConfig,
    pub token_b: TokenConfig,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Whole tokens minted to the deployer (scaled by `10^decimals`).
    #[serde(with = "u128_toml")]
    pub initial_supply: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default)]
    pub fee_bps: u32,
    #[serde(default)]
    pub ratio_policy: RatioPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            fee_bps: DEFAULT_FEE_BPS as u32,
            ratio_policy: RatioPolicy::Clamp,
        }
    }
}

impl TokenConfig {
    /// Initial supply in base units.
    pub fn initial_supply_base(&self) -> Result<u128> {
        10u128
            .checked_pow(self.decimals as u32)
            .and_then(|unit| self.initial_supply.checked_mul(unit))
            .ok_or_else(|| {
                DexError::InvalidConfig(format!(
                    "{} initial supply too large for {} decimals",
                    self.symbol, self.decimals
                ))
            })
    }
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            deployer: "deployer".to_string(),
            token_a: TokenConfig {
                name: "MyToken".to_string(),
                symbol: "MTK".to_string(),
                decimals: 18,
                initial_supply: 1_000_000,
            },
            token_b: TokenConfig {
                name: "SimpleUSDC".to_string(),
                symbol: "sUSDC".to_string(),
                decimals: 6,
                initial_supply: 1_000_000,
            },
            pool: PoolConfig::default(),
        }
    }
}

impl DexConfig {
    /// Load config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: DexConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `SIMPLEDEX_DEPLOYER`, `SIMPLEDEX_FEE_BPS`
    /// and `SIMPLEDEX_RATIO_POLICY`.
    pub fn load_from_env() -> Result<Self> {
        let mut config = DexConfig::default();

        if let Ok(deployer) = std::env::var("SIMPLEDEX_DEPLOYER") {
            config.deployer = deployer;
        }
        if let Ok(fee) = std::env::var("SIMPLEDEX_FEE_BPS") {
            config.pool.fee_bps = fee.trim().parse().map_err(|_| {
                DexError::InvalidConfig(format!("SIMPLEDEX_FEE_BPS '{}' is not a number", fee))
            })?;
        }
        if let Ok(policy) = std::env::var("SIMPLEDEX_RATIO_POLICY") {
            config.pool.ratio_policy = policy.parse().map_err(DexError::InvalidConfig)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DexError::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.deployer.trim().is_empty() {
            return Err(DexError::InvalidConfig("deployer must not be empty".to_string()));
        }
        for token in [&self.token_a, &self.token_b] {
            if token.decimals > MAX_DECIMALS {
                return Err(DexError::InvalidConfig(format!(
                    "{} decimals must be 0-{}",
                    token.symbol, MAX_DECIMALS
                )));
            }
            if token.initial_supply == 0 {
                return Err(DexError::InvalidConfig(format!(
                    "{} initial supply must be > 0",
                    token.symbol
                )));
            }
            token.initial_supply_base()?;
        }
        if self.token_a.symbol == self.token_b.symbol {
            return Err(DexError::InvalidConfig(format!(
                "both tokens use symbol '{}'",
                self.token_a.symbol
            )));
        }
        if self.pool.fee_bps as u128 > MAX_FEE_BPS {
            return Err(DexError::InvalidConfig(format!(
                "fee_bps {} exceeds max {}",
                self.pool.fee_bps, MAX_FEE_BPS
            )));
        }
        Ok(())
    }
}
