//! In-process backend.
//!
//! Answers with queued responses first and echoes the text of the last user
//! message once the queue is drained. A recording backend also keeps every
//! request so callers can inspect what would have been sent upstream.

use super::*;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

pub struct MockBackend {
    model_id: String,
    responses: Mutex<VecDeque<String>>,
    failure: Option<String>,
    record: bool,
    requests: Mutex<Vec<CompletionRequest>>,
    call_count: AtomicU32,
}

impl MockBackend {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            responses: Mutex::new(VecDeque::new()),
            failure: None,
            record: false,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn echo() -> Self {
        Self::new("echo")
    }

    /// Queue a response returned by the next unanswered call.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(content.into());
        }
        self
    }

    /// Make every call fail with `LlmError::Unavailable`.
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Keep a copy of every request, see [`MockBackend::requests`].
    pub fn recording(mut self) -> Self {
        self.record = true;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

/// User messages are `<instruction>\n\n<text>`, only the text is echoed.
fn echo_text(message: &str) -> &str {
    message
        .split_once("\n\n")
        .map_or(message, |(_, text)| text)
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.record {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
        }

        if let Some(reason) = &self.failure {
            return Err(LlmError::Unavailable(reason.clone()));
        }

        let queued = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());

        let content = match queued {
            Some(content) => content,
            None => echo_text(request.last_user_message().unwrap_or_default()).to_string(),
        };

        let prompt_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum();
        let completion_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}
