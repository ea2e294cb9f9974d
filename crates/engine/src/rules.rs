//! Persisted per-domain hiding rules.

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Key-value persistence surface.
///
/// Values are selector lists. `write` replaces the stored list as a whole, so
/// merging is the caller's job. Reading a missing key yields an empty list.
#[async_trait(?Send)]
pub trait RuleStore {
    async fn read(&self, key: &str) -> Result<Vec<String>, StoreError>;

    async fn write(&self, key: &str, selectors: &[String]) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Deduplicated union of stored and new selectors, sorted for stable output
pub fn merge_selectors<I>(existing: Vec<String>, fresh: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    existing
        .into_iter()
        .chain(fresh)
        .filter(|selector| !selector.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_union() {
        let merged = merge_selectors(
            vec!["#c".to_string(), "div > p".to_string()],
            vec!["#a".to_string(), "#c".to_string()],
        );
        assert_eq!(merged, vec!["#a", "#c", "div > p"]);
    }

    #[test]
    fn test_merge_drops_blank_entries() {
        let merged = merge_selectors(vec!["".to_string(), "  ".to_string()], vec!["#a".to_string()]);
        assert_eq!(merged, vec!["#a"]);
    }
}
