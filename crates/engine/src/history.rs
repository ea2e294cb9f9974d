//! Linear undo/redo log of hide actions.

/// One hide operation, carrying the display value observed before hiding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideAction<H> {
    pub element: H,
    pub original_display: String,
}

/// Ordered log with a cursor on the last applied action.
///
/// The cursor is kept as the number of applied actions, so the conventional
/// index (`-1` when nothing is applied) is `applied - 1`.
#[derive(Debug, Clone)]
pub struct History<H> {
    actions: Vec<HideAction<H>>,
    applied: usize,
}

impl<H> History<H> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            applied: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Position of the last applied action, `-1` when none is applied
    pub fn index(&self) -> isize {
        self.applied as isize - 1
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.actions.len()
    }

    /// Appends an action, discarding everything that could still be redone
    pub fn record(&mut self, action: HideAction<H>) {
        self.actions.truncate(self.applied);
        self.actions.push(action);
        self.applied = self.actions.len();
    }

    /// Moves the cursor back and returns the action that must be reverted
    pub fn step_back(&mut self) -> Option<&HideAction<H>> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        self.actions.get(self.applied)
    }

    /// Moves the cursor forward and returns the action that must be re-applied
    pub fn step_forward(&mut self) -> Option<&HideAction<H>> {
        if self.applied >= self.actions.len() {
            return None;
        }
        self.applied += 1;
        self.actions.get(self.applied - 1)
    }

    pub fn actions(&self) -> &[HideAction<H>] {
        &self.actions
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.applied = 0;
    }
}

impl<H> Default for History<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(element: u32) -> HideAction<u32> {
        HideAction {
            element,
            original_display: "block".to_string(),
        }
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::<u32>::new();
        assert_eq!(history.index(), -1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.step_back().is_none());
        assert!(history.step_forward().is_none());
        assert_eq!(history.index(), -1);
    }

    #[test]
    fn test_step_back_and_forward() {
        let mut history = History::new();
        history.record(action(1));
        history.record(action(2));
        assert_eq!(history.index(), 1);

        assert_eq!(history.step_back().map(|a| a.element), Some(2));
        assert_eq!(history.step_back().map(|a| a.element), Some(1));
        assert!(history.step_back().is_none());
        assert_eq!(history.index(), -1);
        assert!(history.can_redo());

        assert_eq!(history.step_forward().map(|a| a.element), Some(1));
        assert_eq!(history.step_forward().map(|a| a.element), Some(2));
        assert!(history.step_forward().is_none());
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn test_record_truncates_redo_tail() {
        let mut history = History::new();
        history.record(action(1));
        history.record(action(2));
        history.record(action(3));
        history.step_back();
        history.step_back();

        history.record(action(4));

        let elements: Vec<u32> = history.actions().iter().map(|a| a.element).collect();
        assert_eq!(elements, vec![1, 4]);
        assert_eq!(history.index(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.record(action(1));
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.index(), -1);
    }
}
