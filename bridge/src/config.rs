use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

/// Top-level bridge configuration, loaded from concord-bridge.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub gateway: GatewaySection,
    pub log: LogSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct GatewaySection {
    /// Gateway endpoint. Overrides the one recorded in a snapshot.
    pub url: Option<String>,
    /// Session credential. Overrides the one recorded in a snapshot.
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `tracing` filter directive, used when RUST_LOG is unset.
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

impl BridgeConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply GATEWAY_URL, GATEWAY_TOKEN and LOG_FILTER from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GATEWAY_URL") {
            self.gateway.url = Some(v);
        }
        if let Some(v) = lookup("GATEWAY_TOKEN") {
            self.gateway.token = Some(v);
        }
        if let Some(v) = lookup("LOG_FILTER")
            && !v.trim().is_empty()
        {
            self.log.filter = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.gateway.url, None);
        assert_eq!(config.gateway.token, None);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_parse_full() {
        let config = BridgeConfig::from_toml(
            r#"
            [gateway]
            url = "wss://gateway.test"
            token = "abc"

            [log]
            filter = "concord_bridge=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.url.as_deref(), Some("wss://gateway.test"));
        assert_eq!(config.gateway.token.as_deref(), Some("abc"));
        assert_eq!(config.log.filter, "concord_bridge=debug");
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config = BridgeConfig::from_toml("[gateway]\nurl = \"wss://g\"\n").unwrap();
        assert_eq!(config.gateway.token, None);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_malformed_toml() {
        assert!(BridgeConfig::from_toml("[gateway\nurl = 1").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GATEWAY_TOKEN", "from-env"),
            ("LOG_FILTER", "warn"),
        ]);
        let mut config = BridgeConfig::from_toml("[gateway]\nurl = \"wss://g\"\ntoken = \"t\"\n")
            .unwrap();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.gateway.url.as_deref(), Some("wss://g"));
        assert_eq!(config.gateway.token.as_deref(), Some("from-env"));
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn test_blank_log_filter_override_ignored() {
        let mut config = BridgeConfig::default();
        config.apply_overrides(|k| (k == "LOG_FILTER").then(|| "  ".to_string()));
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        assert!(BridgeConfig::load(Path::new("/nonexistent/concord-bridge.toml")).is_ok());
    }
}
