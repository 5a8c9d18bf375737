//! Relays one streamed completion per analysis request.
//!
//! The relay primes the upstream stream before anything is sent to the
//! client: fragments are pulled until the first non-empty one arrives, the
//! stream ends, or it fails. A failure at this point can still become a
//! plain error response. After priming, the response is committed, and a
//! later upstream failure can only end the stream early without the
//! terminal sentinel.

mod prompt;

pub use prompt::{SECTIONS, build_prompt};

use crate::{
    Result,
    config::LlmConfig,
    llm::{ChatCompletionRequest, ChatMessage, LlmClient, TextStream},
};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Payload of the terminal frame.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One frame sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Data(String),
    Done,
}

impl ClientEvent {
    pub fn payload(&self) -> &str {
        match self {
            Self::Data(text) => text,
            Self::Done => DONE_SENTINEL,
        }
    }
}

pub struct StreamRelay {
    llm: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
}

impl StreamRelay {
    pub fn new(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            llm,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn completion_request(&self, asset_name: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(asset_name))],
            temperature: Some(self.temperature),
        }
    }

    /// Opens the upstream stream for `asset_name` and primes it.
    pub async fn open(&self, asset_name: &str) -> Result<PrimedStream> {
        let request = self.completion_request(asset_name);
        let mut upstream = self.llm.stream_chat_completion(request).await?;

        let mut skipped = 0usize;
        let first = loop {
            match upstream.next().await {
                Some(Ok(fragment)) => {
                    let text = fragment.trim();
                    if !text.is_empty() {
                        break Some(text.to_string());
                    }
                    skipped += 1;
                }
                Some(Err(e)) => return Err(e),
                None => break None,
            }
        };

        debug!(
            "Primed upstream stream for {} after skipping {} empty fragments",
            asset_name, skipped
        );

        Ok(PrimedStream {
            asset_name: asset_name.to_string(),
            first,
            rest: upstream,
        })
    }
}

/// An upstream stream whose first non-empty fragment (if any) is already held.
pub struct PrimedStream {
    asset_name: String,
    first: Option<String>,
    rest: TextStream,
}

impl std::fmt::Debug for PrimedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimedStream")
            .field("asset_name", &self.asset_name)
            .field("first", &self.first)
            .finish_non_exhaustive()
    }
}

struct DisconnectGuard {
    asset_name: String,
    finished: bool,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.finished {
            info!(
                "Client disconnected before the analysis of {} finished; abandoning upstream",
                self.asset_name
            );
        }
    }
}

impl PrimedStream {
    pub fn first_fragment(&self) -> Option<&str> {
        self.first.as_deref()
    }

    /// Client frames in upstream order, ending in [`ClientEvent::Done`] only
    /// when the upstream finishes cleanly. Dropping the stream drops the
    /// upstream subscription.
    pub fn into_events(self) -> impl Stream<Item = ClientEvent> + Send {
        let Self {
            asset_name,
            first,
            mut rest,
        } = self;

        async_stream::stream! {
            let mut guard = DisconnectGuard { asset_name, finished: false };
            let mut frames = 0usize;

            if let Some(text) = first {
                frames += 1;
                yield ClientEvent::Data(text);
            }

            while let Some(item) = rest.next().await {
                match item {
                    Ok(fragment) => {
                        let text = fragment.trim();
                        if !text.is_empty() {
                            frames += 1;
                            yield ClientEvent::Data(text.to_string());
                        }
                    }
                    Err(e) => {
                        guard.finished = true;
                        error!(
                            "Upstream failed after {} frames for {}; truncating stream: {}",
                            frames, guard.asset_name, e
                        );
                        return;
                    }
                }
            }

            guard.finished = true;
            info!("Analysis of {} completed with {} frames", guard.asset_name, frames);
            yield ClientEvent::Done;
        }
    }
}
