use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HiderConfig {
    pub storage: StorageConfig,
    pub highlight: HighlightConfig,
    pub surface: SurfaceConfig,
    pub notification: NotificationConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Prefix of the per-domain rule key, followed by the hostname
    pub key_prefix: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HighlightConfig {
    /// Inline outline painted on the hovered element
    pub outline: String,
    /// Page cursor while picking
    pub cursor: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SurfaceConfig {
    /// Id of the floating controls container; clicks inside it never hide anything
    pub container_id: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NotificationConfig {
    /// How long a notification stays visible, in milliseconds
    pub duration_ms: u32,
}

/// Default configuration embedded in the extension
pub const DEFAULT_CONFIG: &str = r##"
[storage]
key_prefix = "hiddenElements_"

[highlight]
outline = "2px solid #ff0000"
cursor = "crosshair"

[surface]
container_id = "element-hider-fab-container"

[notification]
duration_ms = 3000
"##;

/// Parse a configuration document
pub fn parse_config(contents: &str) -> Result<HiderConfig, toml::de::Error> {
    toml::from_str(contents)
}

impl HiderConfig {
    /// Configuration embedded in the extension
    pub fn embedded() -> Result<Self, toml::de::Error> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Load configuration
///
/// Uses `override_toml` when it parses, the embedded default otherwise.
pub fn load_config(override_toml: Option<&str>) -> Result<HiderConfig, toml::de::Error> {
    if let Some(contents) = override_toml {
        match parse_config(contents) {
            Ok(config) => {
                log::info!("Using configuration override");
                return Ok(config);
            }
            Err(err) => log::warn!("Invalid configuration override, using defaults: {}", err),
        }
    }
    log::debug!("Using default embedded configuration");
    HiderConfig::embedded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::storage::STORAGE_KEY_PREFIX;

    #[test]
    fn test_default_config_loads() {
        let config: Result<HiderConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.storage.key_prefix, STORAGE_KEY_PREFIX);
        assert_eq!(config.highlight.outline, "2px solid #ff0000");
        assert_eq!(config.surface.container_id, "element-hider-fab-container");
        assert_eq!(config.notification.duration_ms, 3000);
    }

    #[test]
    fn test_override_replaces_defaults() {
        let config = load_config(Some(
            r##"
[storage]
key_prefix = "hidden:"

[highlight]
outline = "3px dashed #00ff00"
cursor = "cell"

[surface]
container_id = "hider-controls"

[notification]
duration_ms = 1500
"##,
        ))
        .unwrap();
        assert_eq!(config.storage.key_prefix, "hidden:");
        assert_eq!(config.highlight.cursor, "cell");
        assert_eq!(config.notification.duration_ms, 1500);
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let config = load_config(Some("[highlight]\noutline = 5")).unwrap();
        assert_eq!(config, HiderConfig::embedded().unwrap());
    }

    #[test]
    fn test_no_override_uses_embedded() {
        assert_eq!(load_config(None).unwrap(), HiderConfig::embedded().unwrap());
    }
}
