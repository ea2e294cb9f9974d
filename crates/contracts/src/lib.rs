//! Types shared between the background script and the content script.

pub mod messages;
pub mod storage;
