//! The seam between the narrator and a chat completions service.

use async_trait::async_trait;
use openrouter::{OpenRouter, Request, Response};

/// Something that can answer a chat completion request.
///
/// Implemented by the [`OpenRouter`] client and by
/// [`ScriptedBackend`](crate::testing::ScriptedBackend) for tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: Request) -> Result<Response, openrouter::Error>;
}

#[async_trait]
impl ChatBackend for OpenRouter {
    async fn complete(&self, request: Request) -> Result<Response, openrouter::Error> {
        OpenRouter::complete(self, &request).await
    }
}
