//! Engine configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What happens when a wizard is started while another one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardPolicy {
    /// The new wizard silently replaces the active one.
    Replace,
    /// The start is rejected with a "finish or cancel first" notice.
    Reject,
}

/// Tunables for the session engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entries per page on list screens.
    pub page_size: usize,
    /// Seconds of inactivity after which a session may be swept.
    pub idle_timeout_secs: u64,
    /// Replacement policy for concurrent wizard starts.
    pub wizard_policy: WizardPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            idle_timeout_secs: 24 * 60 * 60,
            wizard_policy: WizardPolicy::Replace,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML document, filling omitted keys with
    /// defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Idle threshold as a duration usable against session timestamps.
    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.idle_timeout_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.wizard_policy, WizardPolicy::Replace);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("page_size = 3\n").unwrap();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.idle_timeout_secs, 24 * 60 * 60);
    }

    #[test]
    fn test_wizard_policy_from_toml() {
        let config = EngineConfig::from_toml_str("wizard_policy = \"reject\"\n").unwrap();
        assert_eq!(config.wizard_policy, WizardPolicy::Reject);
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("page_size = \"many\"").unwrap_err();
        assert!(matches!(err, crate::BazaarError::Config(_)));
    }
}
