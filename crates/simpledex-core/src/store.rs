//! JSON snapshots of a deployed pool (deployment record + full engine state).
//!
//! Writes go to `<path>.tmp` first and are renamed into place, so a crash
//! mid-write never leaves a truncated snapshot behind.

use crate::amm::AmmEngine;
use crate::deploy::Deployment;
use crate::error::{DexError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub deployment: Deployment,
    pub engine: AmmEngine,
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

pub fn save(path: &Path, deployment: &Deployment, engine: &AmmEngine) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        deployment: deployment.clone(),
        engine: engine.clone(),
    };
    let data = serde_json::to_string_pretty(&snapshot)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    log::debug!("snapshot saved to {} (seq {})", path.display(), engine.seq());
    Ok(())
}

/// Load a snapshot and verify it is internally consistent: the same rules
/// `AmmEngine::new` enforces, then the reserve and supply invariants.
pub fn load(path: &Path) -> Result<Snapshot> {
    let data = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&data)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(DexError::Serialization(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    if snapshot.engine.address() != snapshot.deployment.pair {
        return Err(DexError::Serialization(
            "deployment record does not match engine".to_string(),
        ));
    }
    snapshot
        .engine
        .validate()
        .map_err(|e| DexError::Serialization(format!("corrupt snapshot: {}", e)))?;
    snapshot
        .engine
        .check_invariants()
        .map_err(|e| DexError::Serialization(format!("corrupt snapshot: {}", e)))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DexConfig;
    use crate::deploy::deploy;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state").join("pool.json");

        let (mut engine, deployment) = deploy(&DexConfig::default()).unwrap();
        let pair = deployment.pair.clone();
        let mtk = deployment.token_a.address.clone();
        let usdc = deployment.token_b.address.clone();
        engine.approve(&mtk, "deployer", &pair, u128::MAX).unwrap();
        engine.approve(&usdc, "deployer", &pair, u128::MAX).unwrap();
        engine
            .add_liquidity("deployer", 1_000 * 10u128.pow(18), 2_000 * 10u128.pow(6))
            .unwrap();

        save(&path, &deployment, &engine).unwrap();
        assert!(!tmp_path(&path).exists());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.deployment, deployment);
        assert_eq!(loaded.engine, engine);
    }

    #[test]
    fn test_load_rejects_tampered_reserves() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pool.json");
        let (engine, deployment) = deploy(&DexConfig::default()).unwrap();
        save(&path, &deployment, &engine).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        assert!(data.contains("\"reserve_a\": 0"));
        fs::write(&path, data.replace("\"reserve_a\": 0", "\"reserve_a\": 5")).unwrap();

        assert!(matches!(load(&path), Err(DexError::Serialization(_))));
    }

    #[test]
    fn test_load_rejects_tampered_fee() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pool.json");
        let (engine, deployment) = deploy(&DexConfig::default()).unwrap();
        save(&path, &deployment, &engine).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        assert_eq!(data.matches("\"fee_bps\": 0").count(), 2);
        fs::write(&path, data.replace("\"fee_bps\": 0", "\"fee_bps\": 20000")).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(&err, DexError::Serialization(m) if m.contains("fee too high")));
    }

    #[test]
    fn test_load_rejects_tampered_decimals() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pool.json");
        let (engine, deployment) = deploy(&DexConfig::default()).unwrap();
        save(&path, &deployment, &engine).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        fs::write(&path, data.replace("\"decimals\": 6", "\"decimals\": 40")).unwrap();

        assert!(matches!(load(&path), Err(DexError::Serialization(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DexError::Io(_)));
    }
}
