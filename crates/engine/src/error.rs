use thiserror::Error;

/// Failures of the persistence surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read `{key}`: {message}")]
    Read { key: String, message: String },

    #[error("Failed to write `{key}`: {message}")]
    Write { key: String, message: String },

    #[error("Failed to remove `{key}`: {message}")]
    Remove { key: String, message: String },
}

/// Failures reported by the page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Invalid selector `{0}`")]
    InvalidSelector(String),

    #[error("Element is no longer attached to the page")]
    Detached,

    #[error("Unsupported node: {0}")]
    Unsupported(String),
}

/// Failures while building a selector for one element
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("Element is no longer attached to the page")]
    Detached,

    #[error("Element has no tag name")]
    MissingTag,

    #[error(transparent)]
    Dom(#[from] DomError),
}
