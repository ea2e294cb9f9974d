use serde::{Deserialize, Serialize};

/// Actions the background script can ask a content script to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAction {
    Toggle,
    Reset,
}

impl MessageAction {
    /// Wire code of the action
    pub fn code(&self) -> &'static str {
        match self {
            MessageAction::Toggle => "toggle",
            MessageAction::Reset => "reset",
        }
    }
}

/// Runtime message, `{ "action": "toggle" }` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMessage {
    pub action: MessageAction,
}

impl RuntimeMessage {
    pub fn toggle() -> Self {
        Self {
            action: MessageAction::Toggle,
        }
    }

    pub fn reset() -> Self {
        Self {
            action: MessageAction::Reset,
        }
    }
}

/// Trivial acknowledgement returned to the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_wire_shape() {
        let json = serde_json::to_string(&RuntimeMessage::toggle()).unwrap();
        assert_eq!(json, r#"{"action":"toggle"}"#);
    }

    #[test]
    fn test_parse_incoming_message() {
        let msg: RuntimeMessage = serde_json::from_str(r#"{"action":"reset"}"#).unwrap();
        assert_eq!(msg, RuntimeMessage::reset());

        let unknown: Result<RuntimeMessage, _> = serde_json::from_str(r#"{"action":"explode"}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_action_code_matches_wire_name() {
        for action in [MessageAction::Toggle, MessageAction::Reset] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json.as_str(), Some(action.code()));
        }
    }

    #[test]
    fn test_ack_shape() {
        let json = serde_json::to_string(&Ack::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}
