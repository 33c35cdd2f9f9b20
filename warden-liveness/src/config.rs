//! Liveness tracker configuration.

use serde::{Deserialize, Serialize};

use crate::error::LivenessError;

/// Default idle window: two days.
pub const DEFAULT_MAX_IDLE_SECONDS: u32 = 60 * 60 * 24 * 2;

/// Configuration for idle member detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// A member idle for strictly longer than this is proposed for kicking.
    pub max_idle_seconds: u32,

    /// Whether this node tracks liveness and schedules kick votes at all.
    pub auto_kick_idle_members: bool,
}

impl LivenessConfig {
    /// Create a configuration with the given idle window.
    pub fn new(max_idle_seconds: u32) -> Self {
        Self {
            max_idle_seconds,
            auto_kick_idle_members: true,
        }
    }

    /// Set the idle window.
    pub fn with_max_idle_seconds(mut self, secs: u32) -> Self {
        self.max_idle_seconds = secs;
        self
    }

    /// Enable or disable automatic kicking.
    pub fn with_auto_kick(mut self, enabled: bool) -> Self {
        self.auto_kick_idle_members = enabled;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), LivenessError> {
        if self.max_idle_seconds == 0 {
            return Err(LivenessError::Config(
                "max_idle_seconds must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LivenessConfig::default();
        assert_eq!(config.max_idle_seconds, 172_800);
        assert!(config.auto_kick_idle_members);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LivenessConfig::default()
            .with_max_idle_seconds(60)
            .with_auto_kick(false);
        assert_eq!(config.max_idle_seconds, 60);
        assert!(!config.auto_kick_idle_members);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(LivenessConfig::new(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LivenessConfig =
            serde_json::from_str(r#"{"auto_kick_idle_members": false}"#).unwrap();
        assert_eq!(config.max_idle_seconds, DEFAULT_MAX_IDLE_SECONDS);
        assert!(!config.auto_kick_idle_members);
    }
}
