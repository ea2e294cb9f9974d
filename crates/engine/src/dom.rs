//! The page as seen by the engine.

use crate::error::DomError;
use std::fmt::Debug;
use std::hash::Hash;

/// Display value that hides an element
pub const DISPLAY_NONE: &str = "none";

/// Query and mutation surface of a live page.
///
/// Handles are non-owning references into a tree the engine does not
/// control. Any handle may go stale when the page mutates, so callers check
/// [`PageDom::is_live`] before writing through one.
pub trait PageDom {
    type Handle: Clone + Eq + Hash + Debug;

    /// Whether the handle still points at an element attached to the page
    fn is_live(&self, element: &Self::Handle) -> bool;

    /// Effective display value after all style rules; `None` when it cannot be computed
    fn computed_display(&self, element: &Self::Handle) -> Option<String>;

    /// Sets the inline display override. An empty value removes the override.
    fn set_inline_display(&self, element: &Self::Handle, value: &str);

    /// All elements matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Handle>, DomError>;

    /// Sets the inline outline. An empty value removes it.
    fn set_outline(&self, element: &Self::Handle, value: &str);

    fn element_id(&self, element: &Self::Handle) -> Option<String>;

    /// Lowercase local name of the element
    fn tag_name(&self, element: &Self::Handle) -> Option<String>;

    fn class_names(&self, element: &Self::Handle) -> Result<Vec<String>, DomError>;

    fn parent(&self, element: &Self::Handle) -> Option<Self::Handle>;

    /// Element children in document order
    fn children(&self, element: &Self::Handle) -> Vec<Self::Handle>;

    /// Whether the element is the page's top-level content container
    fn is_content_root(&self, element: &Self::Handle) -> bool;

    /// Toggles the page-wide picking cursor
    fn set_crosshair(&self, enabled: bool);
}
