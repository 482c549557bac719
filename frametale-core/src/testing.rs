//! Testing utilities.
//!
//! [`ScriptedBackend`] stands in for the chat API: it replays queued replies
//! in order and records every request it was sent, so the whole narrator
//! loop can be exercised without network access.

use crate::narrator::ChatBackend;
use async_trait::async_trait;
use openrouter::{Request, Response, ToolCall};
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// One queued reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Answer with this response.
    Respond(Response),
    /// Fail the call with a network error carrying this text.
    Fail(String),
}

impl ScriptedReply {
    /// A prose reply.
    pub fn text(content: impl Into<String>) -> Self {
        ScriptedReply::Respond(Response::text(content))
    }

    /// A reply that only calls tools.
    pub fn tools(calls: Vec<ToolCall>) -> Self {
        ScriptedReply::Respond(Response::tool_use(calls))
    }

    /// A reply calling a single tool.
    pub fn tool(id: &str, name: &str, arguments: serde_json::Value) -> Self {
        Self::tools(vec![ToolCall::function(id, name, arguments.to_string())])
    }

    /// A transport failure.
    pub fn fail(message: impl Into<String>) -> Self {
        ScriptedReply::Fail(message.into())
    }
}

/// A chat backend that replays scripted replies.
///
/// When the script runs out, further calls fail with a network error so a
/// test never hangs on an unexpected extra call.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a reply to the end of the script.
    pub async fn push(&self, reply: ScriptedReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Requests that named `model`.
    pub async fn requests_for_model(&self, model: &str) -> Vec<Request> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| request.model.as_deref() == Some(model))
            .cloned()
            .collect()
    }

    /// Requests that carried tool schemas (i.e. narration calls).
    pub async fn narration_requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| !request.tools.is_empty())
            .cloned()
            .collect()
    }

    /// Replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: Request) -> Result<Response, openrouter::Error> {
        self.requests.lock().await.push(request);
        match self.replies.lock().await.pop_front() {
            Some(ScriptedReply::Respond(response)) => Ok(response),
            Some(ScriptedReply::Fail(message)) => Err(openrouter::Error::Network(message)),
            None => Err(openrouter::Error::Network(
                "scripted backend has no more replies".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openrouter::Message;
    use serde_json::json;

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let backend = ScriptedBackend::new([
            ScriptedReply::text("first"),
            ScriptedReply::tool("call_1", "change_player_hp", json!({"amount": -1})),
        ]);

        let first = backend
            .complete(Request::new(vec![Message::user("a")]).with_model("m1"))
            .await
            .unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));

        let second = backend
            .complete(Request::new(vec![Message::user("b")]))
            .await
            .unwrap();
        assert_eq!(second.tool_calls[0].name(), "change_player_hp");
        assert_eq!(second.tool_calls[0].arguments(), r#"{"amount":-1}"#);

        assert_eq!(backend.request_count().await, 2);
        assert_eq!(backend.requests_for_model("m1").await.len(), 1);
        assert_eq!(backend.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_fails_when_script_is_exhausted() {
        let backend = ScriptedBackend::new([ScriptedReply::fail("boom")]);
        let err = backend.complete(Request::new(vec![])).await.unwrap_err();
        assert!(matches!(err, openrouter::Error::Network(ref m) if m == "boom"));

        let err = backend.complete(Request::new(vec![])).await.unwrap_err();
        assert!(matches!(err, openrouter::Error::Network(_)));
    }
}
