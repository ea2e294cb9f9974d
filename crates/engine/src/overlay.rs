//! On-page controls and user notifications.

/// Enablement of the history controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub hidden_count: usize,
}

/// Transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Rules saved; `persisted` is the number of selectors now stored for the domain
    Accepted { persisted: usize },
    NothingToSave,
    SaveFailed,
    Cancelled { restored: usize },
    RulesReset { cleared: usize },
    ResetFailed,
}

impl Notification {
    pub fn message(&self) -> String {
        match self {
            Notification::Accepted { persisted } => format!(
                "Changes saved! {} hidden element rule{} for this site.",
                persisted,
                if *persisted == 1 { "" } else { "s" }
            ),
            Notification::NothingToSave => "No elements hidden. Nothing to save.".to_string(),
            Notification::SaveFailed => {
                "Could not save hidden elements. Your changes are kept, try again.".to_string()
            }
            Notification::Cancelled { .. } => {
                "All changes cancelled. Elements restored.".to_string()
            }
            Notification::RulesReset { cleared } => {
                format!("All hiding rules for this site were reset ({} restored).", cleared)
            }
            Notification::ResetFailed => {
                "Elements restored, but saved rules could not be removed.".to_string()
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::SaveFailed | Notification::ResetFailed)
    }
}

/// Controls shown while a session is active.
///
/// `attach` installs the pointer and keyboard listeners together with the
/// floating controls; `detach` removes both. The session never attaches twice
/// without detaching in between.
pub trait Overlay {
    fn attach(&mut self);

    fn detach(&mut self);

    fn refresh(&mut self, state: HistoryState);

    /// Fire and forget
    fn notify(&self, notification: &Notification);
}
