//! Client for the upstream conversational-agent API and the stream
//! orchestrator that turns its SSE response into one consolidated reply.

pub mod events;
pub mod reducer;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::config::AgentConfig;
use crate::errors::AppError;
use crate::sse::FrameDecoder;

pub use reducer::ChatOutcome;

const CHAT_API_VERSION: &str = "v3";
/// Upstream error bodies are truncated to this many characters in details.
const ERROR_BODY_PREVIEW: usize = 200;
/// Cap on simultaneous upstream chat calls; the upstream itself imposes no
/// backpressure, so the cap lives here.
const MAX_CONCURRENT_CHATS: usize = 32;

#[derive(Serialize)]
struct ChatRequest<'a> {
    bot_id: &'a str,
    user_id: &'a str,
    custom_variables: CustomVariables<'a>,
    additional_messages: [AdditionalMessage<'a>; 1],
    stream: bool,
}

#[derive(Serialize)]
struct CustomVariables<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Serialize)]
struct AdditionalMessage<'a> {
    role: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    content: &'a str,
    content_type: &'a str,
}

/// Service that runs a single chat turn against the agent API. Credentials
/// are resolved from the environment per call; the HTTP client and the
/// concurrency limiter are shared across requests.
#[derive(Clone)]
pub struct AgentService {
    http: reqwest::Client,
    limiter: Arc<Semaphore>,
}

impl Default for AgentService {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentService {
    pub fn new() -> Self {
        Self::with_cap(MAX_CONCURRENT_CHATS)
    }

    /// Service with an explicit cap on simultaneous upstream chat calls.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            limiter: Arc::new(Semaphore::new(cap)),
        }
    }

    /// Sends one user message and consumes the streamed response down to a
    /// `{conversation_id, reply}` pair. Single pass, no retries.
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<&str>,
        user_id: &str,
    ) -> Result<ChatOutcome, AppError> {
        let config = AgentConfig::from_env()?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| AppError::Unexpected("chat limiter closed".to_string()))?;

        let url = format!("{}/{}/chat", config.api_base, CHAT_API_VERSION);
        let body = ChatRequest {
            bot_id: &config.bot_id,
            user_id,
            custom_variables: CustomVariables { user_id },
            additional_messages: [AdditionalMessage {
                role: "user",
                kind: "question",
                content: message,
                content_type: "text",
            }],
            stream: true,
        };

        let mut request = self.http.post(&url).bearer_auth(&config.api_key).json(&body);
        // Continuing an existing conversation goes via query parameter, not
        // the request body.
        if let Some(cid) = conversation_id.map(str::trim).filter(|c| !c.is_empty()) {
            request = request.query(&[("conversation_id", cid)]);
        }

        debug!(user_id, "sending chat request to agent API");
        let response = request.send().await.map_err(|e| {
            error!("agent request failed: {e}");
            AppError::AgentRequestFailed { detail: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            error!("agent rejected chat request: status={status} detail={detail}");
            return Err(AppError::AgentRejected { status: status.as_u16(), detail });
        }

        consume_stream(response).await
    }
}

/// Stream orchestrator: drives the frame decoder and the event reducer over
/// a live response body, then enforces the post-conditions.
async fn consume_stream(response: reqwest::Response) -> Result<ChatOutcome, AppError> {
    let mut decoder = FrameDecoder::new();
    let mut state = reducer::ChatState::new();
    let mut stream = response.bytes_stream();
    let mut finished = false;

    'read: while let Some(chunk) = stream.next().await {
        let chunk: Bytes = chunk.map_err(|e| {
            error!("failed to read agent stream: {e}");
            AppError::StreamReadFailed { detail: e.to_string() }
        })?;
        for frame in decoder.feed(&chunk) {
            if !state.apply(&frame)? {
                finished = true;
                break 'read;
            }
        }
    }
    if !finished {
        for frame in decoder.finish() {
            if !state.apply(&frame)? {
                break;
            }
        }
    }

    state.finish()
}
