// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible provider client
//!
//! Implements both [`EmbeddingProvider`] (`POST /embeddings`) and
//! [`ChatProvider`] (`POST /chat/completions`, optionally SSE-streamed).

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

use super::{
    ChatMessage, ChatProvider, CompletionRequest, EmbeddingProvider, ProviderError, TextStream,
};
use crate::config::ProviderConfig;

const PROVIDER_NAME: &str = "openai";

/// HTTP client for an OpenAI-compatible API
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    embedding_model: String,
    chat_model: String,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// One parsed line of a server-sent event stream
#[derive(Debug, PartialEq)]
enum SseEvent {
    Fragment(String),
    Done,
    Skip,
    Invalid(String),
}

impl OpenAiClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        // No client-wide total timeout: it would also cap SSE body reads
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!(
            "OpenAI client configured: base_url={}, embedding_model={}, chat_model={}",
            base_url, config.embedding_model, config.chat_model
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            timeout_ms: config.request_timeout_ms,
        })
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: PROVIDER_NAME.to_string(),
            })
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// POST a JSON body
    ///
    /// Non-streaming requests are bounded end to end. Streaming requests are
    /// bounded only until the response headers arrive; the body is guarded
    /// per read in [`sse_fragments`].
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        streaming: bool,
    ) -> Result<Response, ProviderError> {
        let mut builder = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(self.api_key()?)
            .json(body);
        if !streaming {
            builder = builder.timeout(self.timeout());
        }

        let response = tokio::time::timeout(self.timeout(), builder.send())
            .await
            .map_err(|_| ProviderError::Timeout {
                timeout_ms: self.timeout_ms,
            })?
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_ms))?;

        check_status(response).await
    }

    async fn chat_completion(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<Response, ProviderError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            stream,
        };
        self.post("/chat/completions", &body, stream).await
    }
}

/// Map non-success statuses to provider errors
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

fn parse_sse_line(line: &str) -> SseEvent {
    let line = line.trim();
    let payload = match line.strip_prefix("data:") {
        Some(payload) => payload.trim_start(),
        None => return SseEvent::Skip,
    };

    if payload == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
            Some(content) if !content.is_empty() => SseEvent::Fragment(content),
            _ => SseEvent::Skip,
        },
        Err(e) => SseEvent::Invalid(format!("malformed stream chunk: {}", e)),
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

struct SseState {
    bytes: ByteStream,
    buffer: Vec<u8>,
    done: bool,
    timeout_ms: u64,
}

/// Turn a raw SSE byte stream into text fragments
///
/// `timeout_ms` bounds the wait for each read, not the whole stream.
fn sse_fragments(bytes: ByteStream, timeout_ms: u64) -> TextStream {
    let state = SseState {
        bytes,
        buffer: Vec::new(),
        done: false,
        timeout_ms,
    };

    let fragments = stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buffer.drain(..=pos).collect();
                match parse_sse_line(&String::from_utf8_lossy(&line)) {
                    SseEvent::Fragment(text) => return Some((Ok(text), state)),
                    SseEvent::Done => {
                        state.done = true;
                        return None;
                    }
                    SseEvent::Skip => continue,
                    SseEvent::Invalid(message) => {
                        state.done = true;
                        return Some((Err(ProviderError::InvalidResponse(message)), state));
                    }
                }
            }

            let read = Duration::from_millis(state.timeout_ms);
            let next = match tokio::time::timeout(read, state.bytes.next()).await {
                Ok(next) => next,
                Err(_) => {
                    state.done = true;
                    let err = ProviderError::Timeout {
                        timeout_ms: state.timeout_ms,
                    };
                    return Some((Err(err), state));
                }
            };

            match next {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    state.done = true;
                    let err = ProviderError::from_reqwest(e, state.timeout_ms);
                    return Some((Err(err), state));
                }
                None => {
                    state.done = true;
                    let rest = std::mem::take(&mut state.buffer);
                    if let SseEvent::Fragment(text) = parse_sse_line(&String::from_utf8_lossy(&rest))
                    {
                        return Some((Ok(text), state));
                    }
                    return None;
                }
            }
        }
    });

    Box::pin(fragments)
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: &self.embedding_model,
            input: texts,
        };
        let response = self.post("/embeddings", &body, false).await?;

        let mut data: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        // Providers may return entries out of order; `index` is authoritative
        if data.data.iter().all(|d| d.index.is_some()) {
            data.data.sort_by_key(|d| d.index);
        }

        debug!("Embedded {} texts with {}", data.data.len(), self.embedding_model);
        Ok(data.data.into_iter().map(|d| d.embedding).collect())
    }

    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let response = self.chat_completion(request, false).await?;

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in completion".to_string()))
    }

    async fn stream(&self, request: &CompletionRequest) -> Result<TextStream, ProviderError> {
        let response = self.chat_completion(request, true).await?;
        Ok(sse_fragments(
            Box::pin(response.bytes_stream()),
            self.timeout_ms,
        ))
    }

    fn default_model(&self) -> &str {
        &self.chat_model
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
