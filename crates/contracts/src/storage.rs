//! Layout of persisted hiding rules in extension storage.
//!
//! Every domain owns a single key, `<prefix><domain>` with the prefix
//! defaulting to `hiddenElements_`, whose value is a list of selector strings.
//! Order carries no meaning.

use serde::{Deserialize, Serialize};

/// Default prefix of every per-domain rule key
pub const STORAGE_KEY_PREFIX: &str = "hiddenElements_";

/// Key of the optional TOML configuration override, stored as a string
pub const CONFIG_OVERRIDE_KEY: &str = "elementHiderConfig";

/// Storage key holding the rules of `domain`
pub fn storage_key(prefix: &str, domain: &str) -> String {
    format!("{}{}", prefix, domain)
}

/// Selector list as stored under a domain key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredSelectors(pub Vec<String>);

impl StoredSelectors {
    /// Parse a stored value; anything that is not a list of strings reads as empty
    pub fn from_json_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_key() {
        assert_eq!(
            storage_key(STORAGE_KEY_PREFIX, "example.com"),
            "hiddenElements_example.com"
        );
        assert_eq!(storage_key("rules:", "news.example.org"), "rules:news.example.org");
        assert_ne!(storage_key(STORAGE_KEY_PREFIX, "example.com"), CONFIG_OVERRIDE_KEY);
    }

    #[test]
    fn test_stored_selectors_is_plain_list() {
        let stored = StoredSelectors(vec!["#ad".to_string(), "div > p".to_string()]);
        assert_eq!(serde_json::to_value(&stored).unwrap(), json!(["#ad", "div > p"]));
    }

    #[test]
    fn test_malformed_value_reads_empty() {
        assert_eq!(StoredSelectors::from_json_value(json!(null)), StoredSelectors::default());
        assert_eq!(StoredSelectors::from_json_value(json!({"a": 1})), StoredSelectors::default());
        assert_eq!(
            StoredSelectors::from_json_value(json!(["#x"])).into_inner(),
            vec!["#x".to_string()]
        );
    }
}
