//! Wire payloads carried by the agent's SSE frames.

use serde::Deserialize;

// Event names the upstream emits during one chat turn.
pub const CHAT_CREATED: &str = "conversation.chat.created";
pub const CHAT_IN_PROGRESS: &str = "conversation.chat.in_progress";
pub const CHAT_COMPLETED: &str = "conversation.chat.completed";
pub const CHAT_FAILED: &str = "conversation.chat.failed";
pub const MESSAGE_DELTA: &str = "conversation.message.delta";
pub const MESSAGE_COMPLETED: &str = "conversation.message.completed";
pub const ERROR: &str = "error";
pub const DONE: &str = "done";

/// Sentinel data payload marking end-of-stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Payload of chat-level events (`created`, `in_progress`, `completed`,
/// `failed`). Every field defaults so partial payloads still parse;
/// unrecognized fields (status, timestamps, bot id) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ChatEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub conversation_id: String,
    /// Failure description, present on `conversation.chat.failed` and `error`.
    #[serde(default)]
    pub msg: Option<String>,
}

/// Payload of message-level events (`delta`, `completed`).
#[derive(Debug, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

impl MessageEvent {
    /// Only assistant-authored answer messages contribute to the reply;
    /// verbose/tool events share the same payload shape and are skipped.
    pub fn is_assistant_answer(&self) -> bool {
        self.kind == "answer" && self.role == "assistant"
    }
}
