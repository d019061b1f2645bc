//! Folds the SSE frame sequence into a single consolidated chat outcome.

use tracing::debug;

use crate::agent::events::{self, ChatEvent, MessageEvent};
use crate::errors::AppError;
use crate::sse::SseFrame;

/// Final result of one streamed chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub conversation_id: String,
    pub reply: String,
}

/// Per-stream accumulator, mutated in frame arrival order.
#[derive(Debug, Default)]
pub struct ChatState {
    conversation_id: String,
    chat_id: String,
    /// message id → accumulated delta content, in first-seen order.
    answer_contents: Vec<(String, String)>,
    /// Completed answers, blank-line joined.
    final_reply: String,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one frame. Returns `Ok(true)` to keep consuming, `Ok(false)`
    /// when the stream declared itself finished, or an error for a
    /// backend-declared failure.
    pub fn apply(&mut self, frame: &SseFrame) -> Result<bool, AppError> {
        let data = frame.data.trim();
        if data == events::DONE_MARKER {
            return Ok(false);
        }
        if data.is_empty() {
            return Ok(true);
        }

        match frame.event.as_str() {
            events::CHAT_CREATED => {
                if let Ok(chat) = serde_json::from_str::<ChatEvent>(data) {
                    if !chat.conversation_id.is_empty() {
                        self.conversation_id = chat.conversation_id;
                    }
                    if !chat.id.is_empty() {
                        self.chat_id = chat.id;
                    }
                    debug!(
                        conversation_id = %self.conversation_id,
                        chat_id = %self.chat_id,
                        "chat created"
                    );
                }
            }
            events::CHAT_IN_PROGRESS | events::CHAT_COMPLETED => {
                if let Ok(chat) = serde_json::from_str::<ChatEvent>(data) {
                    if self.conversation_id.is_empty() && !chat.conversation_id.is_empty() {
                        self.conversation_id = chat.conversation_id;
                    }
                }
            }
            events::MESSAGE_DELTA => {
                if let Ok(msg) = serde_json::from_str::<MessageEvent>(data) {
                    if msg.is_assistant_answer() {
                        self.append_delta(&msg.id, &msg.content);
                    }
                }
            }
            events::MESSAGE_COMPLETED => {
                if let Ok(msg) = serde_json::from_str::<MessageEvent>(data) {
                    if msg.is_assistant_answer() {
                        // The completed event carries the full accumulated
                        // content; fall back to our own delta accumulator.
                        let full = if !msg.content.is_empty() {
                            msg.content
                        } else {
                            self.accumulated(&msg.id).unwrap_or_default()
                        };
                        if !full.is_empty() {
                            if !self.final_reply.is_empty() {
                                self.final_reply.push_str("\n\n");
                            }
                            self.final_reply.push_str(&full);
                        }
                    }
                }
            }
            events::CHAT_FAILED => {
                return Err(AppError::UpstreamFailure {
                    detail: format!("Chat failed: {}", failure_detail(data)),
                });
            }
            events::ERROR => {
                return Err(AppError::UpstreamFailure {
                    detail: format!("SSE error: {}", failure_detail(data)),
                });
            }
            events::DONE => {}
            other => {
                debug!("ignoring unrecognized SSE event: {other}");
            }
        }
        Ok(true)
    }

    /// Enforce the post-conditions and produce the result. The reply falls
    /// back to the raw delta accumulators when no `completed` event carried
    /// content.
    pub fn finish(self) -> Result<ChatOutcome, AppError> {
        if self.conversation_id.is_empty() {
            return Err(AppError::NoConversationId);
        }
        let reply = if !self.final_reply.is_empty() {
            self.final_reply
        } else {
            self.answer_contents
                .iter()
                .map(|(_, content)| content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        if reply.is_empty() {
            return Err(AppError::NoReplyContent);
        }
        Ok(ChatOutcome { conversation_id: self.conversation_id, reply })
    }

    fn append_delta(&mut self, id: &str, content: &str) {
        match self.answer_contents.iter_mut().find(|(k, _)| k == id) {
            Some((_, acc)) => acc.push_str(content),
            None => self.answer_contents.push((id.to_string(), content.to_string())),
        }
    }

    fn accumulated(&self, id: &str) -> Option<String> {
        self.answer_contents
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.clone())
    }
}

fn failure_detail(data: &str) -> String {
    serde_json::from_str::<ChatEvent>(data)
        .ok()
        .and_then(|chat| chat.msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame { event: event.to_string(), data: data.to_string() }
    }

    fn reduce(frames: &[SseFrame]) -> Result<ChatOutcome, AppError> {
        let mut state = ChatState::new();
        for f in frames {
            if !state.apply(f)? {
                break;
            }
        }
        state.finish()
    }

    fn created() -> SseFrame {
        frame(
            events::CHAT_CREATED,
            r#"{"id":"chat-1","conversation_id":"conv-1","bot_id":"bot-1"}"#,
        )
    }

    #[test]
    fn completed_content_wins_over_deltas() {
        let outcome = reduce(&[
            created(),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"Hello"}"#,
            ),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":" world"}"#,
            ),
            frame(
                events::MESSAGE_COMPLETED,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"Hello world"}"#,
            ),
        ])
        .unwrap();
        assert_eq!(outcome.conversation_id, "conv-1");
        assert_eq!(outcome.reply, "Hello world");
    }

    #[test]
    fn completed_without_content_falls_back_to_accumulator() {
        let outcome = reduce(&[
            created(),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"partial"}"#,
            ),
            frame(
                events::MESSAGE_COMPLETED,
                r#"{"id":"m1","role":"assistant","type":"answer"}"#,
            ),
        ])
        .unwrap();
        assert_eq!(outcome.reply, "partial");
    }

    #[test]
    fn no_completed_event_joins_delta_accumulators_in_first_seen_order() {
        let outcome = reduce(&[
            created(),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"A"}"#,
            ),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m2","role":"assistant","type":"answer","content":"B"}"#,
            ),
        ])
        .unwrap();
        assert_eq!(outcome.reply, "A\n\nB");
    }

    #[test]
    fn non_answer_and_non_assistant_messages_are_ignored() {
        let err = reduce(&[
            created(),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"verbose","content":"x"}"#,
            ),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m2","role":"user","type":"answer","content":"y"}"#,
            ),
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::NoReplyContent));
    }

    #[test]
    fn chat_failed_raises_with_backend_detail() {
        let err = reduce(&[
            created(),
            frame(events::CHAT_FAILED, r#"{"msg":"quota exceeded"}"#),
        ])
        .unwrap_err();
        match err {
            AppError::UpstreamFailure { detail } => assert!(detail.contains("quota exceeded")),
            other => panic!("expected UpstreamFailure, got {other:?}"),
        }
    }

    #[test]
    fn error_event_without_msg_carries_the_raw_payload() {
        let err = reduce(&[created(), frame(events::ERROR, r#"{"code":4000}"#)]).unwrap_err();
        match err {
            AppError::UpstreamFailure { detail } => assert!(detail.contains("4000")),
            other => panic!("expected UpstreamFailure, got {other:?}"),
        }
    }

    #[test]
    fn done_marker_truncates_the_sequence() {
        let outcome = reduce(&[
            created(),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"kept"}"#,
            ),
            frame(events::DONE, "[DONE]"),
            // Well-formed but after [DONE]: must be ignored.
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":" dropped"}"#,
            ),
        ])
        .unwrap();
        assert_eq!(outcome.reply, "kept");
    }

    #[test]
    fn malformed_frame_is_skipped_not_fatal() {
        let outcome = reduce(&[
            created(),
            frame(events::MESSAGE_DELTA, "not json at all"),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"ok"}"#,
            ),
        ])
        .unwrap();
        assert_eq!(outcome.reply, "ok");
    }

    #[test]
    fn conversation_id_is_never_cleared_by_later_empty_values() {
        let outcome = reduce(&[
            created(),
            frame(events::CHAT_IN_PROGRESS, r#"{"conversation_id":""}"#),
            frame(events::CHAT_COMPLETED, r#"{"conversation_id":"conv-other"}"#),
            frame(
                events::MESSAGE_COMPLETED,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"hi"}"#,
            ),
        ])
        .unwrap();
        assert_eq!(outcome.conversation_id, "conv-1");
    }

    #[test]
    fn missing_conversation_id_is_a_post_condition_error() {
        let err = reduce(&[frame(
            events::MESSAGE_COMPLETED,
            r#"{"id":"m1","role":"assistant","type":"answer","content":"hi"}"#,
        )])
        .unwrap_err();
        assert!(matches!(err, AppError::NoConversationId));
    }

    #[test]
    fn reduction_is_deterministic_across_runs() {
        let frames = vec![
            created(),
            frame(
                events::MESSAGE_DELTA,
                r#"{"id":"m1","role":"assistant","type":"answer","content":"same"}"#,
            ),
        ];
        let a = reduce(&frames).unwrap();
        let b = reduce(&frames).unwrap();
        assert_eq!(a, b);
    }
}
