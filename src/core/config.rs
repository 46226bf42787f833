use crate::core::brand::DEFAULT_TRIM;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_CORE: &str = "SIMD_DETECT_CORE";
pub const ENV_TRIM: &str = "SIMD_DETECT_TRIM";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid core index: {0}")]
    InvalidCore(String),
}

/// Detector settings. Everything defaults to the unpinned, space/tab/CR/LF-trimming behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Characters stripped from both ends of the brand string.
    pub trim: String,
    /// Logical core to pin to before probing.
    pub pin_core: Option<usize>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            trim: DEFAULT_TRIM.iter().collect(),
            pin_core: None,
        }
    }
}

impl DetectorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::var(ENV_CORE).ok(), std::env::var(ENV_TRIM).ok())
    }

    fn from_vars(core: Option<String>, trim: Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = core {
            let parsed = raw.trim().parse().map_err(|_| ConfigError::InvalidCore(raw.clone()))?;
            config.pin_core = Some(parsed);
        }
        if let Some(trim) = trim {
            config.trim = trim;
        }
        Ok(config)
    }

    pub fn trim_set(&self) -> Vec<char> {
        self.trim.chars().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.trim_set(), DEFAULT_TRIM.to_vec());
        assert_eq!(config.pin_core, None);
    }

    #[test]
    fn test_from_vars() {
        let config = DetectorConfig::from_vars(Some(" 3 ".into()), Some("-".into())).unwrap();
        assert_eq!(config.pin_core, Some(3));
        assert_eq!(config.trim_set(), vec!['-']);

        let err = DetectorConfig::from_vars(Some("first".into()), None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidCore("first".into()));
    }

    #[test]
    fn test_from_env() {
        // The only test that touches these variables.
        std::env::set_var(ENV_CORE, "2");
        std::env::set_var(ENV_TRIM, "#");
        let config = DetectorConfig::from_env();
        std::env::set_var(ENV_CORE, "two");
        let bad = DetectorConfig::from_env();
        std::env::remove_var(ENV_CORE);
        std::env::remove_var(ENV_TRIM);
        let unset = DetectorConfig::from_env();

        let config = config.unwrap();
        assert_eq!(config.pin_core, Some(2));
        assert_eq!(config.trim_set(), vec!['#']);
        assert_eq!(bad, Err(ConfigError::InvalidCore("two".into())));
        assert_eq!(unset, Ok(DetectorConfig::default()));
    }

    #[test]
    fn test_json_partial() -> Result<(), Box<dyn std::error::Error>> {
        let config: DetectorConfig = serde_json::from_str(r#"{ "pin_core": 1 }"#)?;
        assert_eq!(config.pin_core, Some(1));
        assert_eq!(config.trim, DetectorConfig::default().trim);
        Ok(())
    }
}
