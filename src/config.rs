use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no API key configured (set GEMINI_API_KEY or API_KEY)")]
    MissingApiKey,
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    /// Overrides the platform data directory for the storage database.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            api_base: get("ETSY_FLOW_API_BASE").unwrap_or(defaults.api_base),
            text_model: get("ETSY_FLOW_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: get("ETSY_FLOW_IMAGE_MODEL").unwrap_or(defaults.image_model),
            data_dir: get("ETSY_FLOW_DATA_DIR").map(PathBuf::from),
        }
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.require_api_key(), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]));
        assert_eq!(config.require_api_key(), Ok("g"));

        let config = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", " "), ("API_KEY", "a")]));
        assert_eq!(config.require_api_key(), Ok("a"));
    }

    #[test]
    fn overrides_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ETSY_FLOW_API_BASE", "http://localhost:9000"),
            ("ETSY_FLOW_TEXT_MODEL", "text-model"),
            ("ETSY_FLOW_IMAGE_MODEL", "image-model"),
            ("ETSY_FLOW_DATA_DIR", "/tmp/etsy"),
        ]));
        assert_eq!(config.api_base, "http://localhost:9000");
        assert_eq!(config.text_model, "text-model");
        assert_eq!(config.image_model, "image-model");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/etsy")));
    }
}
