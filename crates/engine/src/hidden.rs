//! Elements hidden by the current session and their pre-hide display values.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct HiddenElements<H> {
    hidden: HashSet<H>,
    original_display: HashMap<H, String>,
}

impl<H: Clone + Eq + Hash> HiddenElements<H> {
    pub fn new() -> Self {
        Self {
            hidden: HashSet::new(),
            original_display: HashMap::new(),
        }
    }

    pub fn insert(&mut self, element: H, original_display: String) {
        self.original_display.insert(element.clone(), original_display);
        self.hidden.insert(element);
    }

    /// Drops the element from both the set and the display map
    pub fn remove(&mut self, element: &H) -> bool {
        self.original_display.remove(element);
        self.hidden.remove(element)
    }

    pub fn contains(&self, element: &H) -> bool {
        self.hidden.contains(element)
    }

    pub fn original_display(&self, element: &H) -> Option<&str> {
        self.original_display.get(element).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.hidden.iter()
    }

    /// Empties both collections, pairing every hidden element with the value to
    /// restore. A missing map entry restores to the empty value.
    pub fn drain_for_restore(&mut self) -> Vec<(H, String)> {
        let mut display = std::mem::take(&mut self.original_display);
        self.hidden
            .drain()
            .map(|element| {
                let value = display.remove(&element).unwrap_or_default();
                (element, value)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.hidden.clear();
        self.original_display.clear();
    }
}

impl<H: Clone + Eq + Hash> Default for HiddenElements<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_keep_map_in_step() {
        let mut hidden = HiddenElements::new();
        hidden.insert(1u32, "flex".to_string());
        assert!(hidden.contains(&1));
        assert_eq!(hidden.original_display(&1), Some("flex"));

        assert!(hidden.remove(&1));
        assert!(!hidden.contains(&1));
        assert_eq!(hidden.original_display(&1), None);
        assert!(!hidden.remove(&1));
    }

    #[test]
    fn test_drain_for_restore() {
        let mut hidden = HiddenElements::new();
        hidden.insert(1u32, "block".to_string());
        hidden.insert(2u32, "inline".to_string());

        let mut drained = hidden.drain_for_restore();
        drained.sort();
        assert_eq!(
            drained,
            vec![(1, "block".to_string()), (2, "inline".to_string())]
        );
        assert!(hidden.is_empty());
        assert_eq!(hidden.original_display(&1), None);
    }
}
