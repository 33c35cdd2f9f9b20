//! Node configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warden_collateral::CollateralConfig;
use warden_liveness::LivenessConfig;

use crate::error::{NodeError, Result};

/// Default block spacing in seconds.
pub const DEFAULT_TARGET_SPACING_SECS: u32 = 16;

/// Top-level node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Directory for durable state; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,

    /// Whether this node produces blocks.
    pub mining: bool,

    /// Slot length in seconds.
    pub target_spacing_secs: u32,

    /// Idle member detection.
    pub liveness: LivenessConfig,

    /// Counter-chain collateral.
    pub collateral: CollateralConfig,
}

impl NodeConfig {
    /// Create a configuration for the counter chain with the given magic.
    pub fn new(counter_chain_magic: u32) -> Self {
        Self {
            data_dir: None,
            mining: false,
            target_spacing_secs: DEFAULT_TARGET_SPACING_SECS,
            liveness: LivenessConfig::default(),
            collateral: CollateralConfig::new(counter_chain_magic),
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Persist state under `dir`.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Enable or disable block production.
    pub fn with_mining(mut self, mining: bool) -> Self {
        self.mining = mining;
        self
    }

    /// Set the slot length.
    pub fn with_target_spacing(mut self, secs: u32) -> Self {
        self.target_spacing_secs = secs;
        self
    }

    /// Set the liveness configuration.
    pub fn with_liveness(mut self, liveness: LivenessConfig) -> Self {
        self.liveness = liveness;
        self
    }

    /// Set the collateral configuration.
    pub fn with_collateral(mut self, collateral: CollateralConfig) -> Self {
        self.collateral = collateral;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.target_spacing_secs == 0 {
            return Err(NodeError::Config(
                "target_spacing_secs must be at least 1".into(),
            ));
        }
        self.liveness.validate()?;
        self.collateral.validate()?;
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_needs_magic() {
        assert!(NodeConfig::default().validate().is_err());
        assert!(NodeConfig::new(7).validate().is_ok());
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let config = NodeConfig::new(7).with_target_spacing(0);
        assert!(matches!(config.validate(), Err(NodeError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "data_dir": "/var/lib/warden",
                "mining": true,
                "liveness": {{ "max_idle_seconds": 3600 }},
                "collateral": {{ "counter_chain_magic": 168496141, "max_reorg_length": 240 }}
            }}"#
        )
        .unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/warden")));
        assert!(config.mining);
        assert_eq!(config.target_spacing_secs, DEFAULT_TARGET_SPACING_SECS);
        assert_eq!(config.liveness.max_idle_seconds, 3600);
        assert!(config.liveness.auto_kick_idle_members);
        assert_eq!(config.collateral.counter_chain_magic, 0x0A0B_0C0D);
        assert_eq!(config.collateral.max_reorg_length, 240);
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "mining": "yes" }}"#).unwrap();
        assert!(matches!(
            NodeConfig::from_file(file.path()),
            Err(NodeError::Json(_))
        ));

        assert!(matches!(
            NodeConfig::from_file("/nonexistent/warden.json"),
            Err(NodeError::Io(_))
        ));
    }
}
