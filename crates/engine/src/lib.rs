//! Interactive element hiding: history, hide/show engine, selector
//! generation and per-domain rule persistence.
//!
//! The engine never touches a browser directly. The page, the rule storage and
//! the on-page controls are reached through the [`PageDom`], [`RuleStore`] and
//! [`Overlay`] traits so the whole state machine runs natively under test.

pub mod config;
pub mod dom;
pub mod error;
pub mod hidden;
pub mod history;
pub mod overlay;
pub mod rules;
pub mod selector;
pub mod session;
pub mod shortcut;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::HiderConfig;
pub use dom::PageDom;
pub use error::{DomError, SelectorError, StoreError};
pub use overlay::{HistoryState, Notification, Overlay};
pub use rules::RuleStore;
pub use session::{Activation, Command, HidingSession};
pub use shortcut::Shortcut;
