use async_trait::async_trait;
use finance_ai::{
    Error, Result,
    llm::{ChatCompletionRequest, LlmClient, TextStream},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// One scripted step of a mock upstream stream.
#[derive(Debug, Clone)]
pub enum MockItem {
    Fragment(String),
    Fail(String),
    /// Never yields again; the stream stays open until dropped.
    Hang,
}

/// Mock LLM client that replays the same scripted stream on every call
#[derive(Debug, Default)]
pub struct MockLlmClient {
    pub script: Vec<MockItem>,
    pub open_error: Option<String>,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    pub dropped_streams: Arc<AtomicUsize>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragments<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .extend(fragments.into_iter().map(|f| MockItem::Fragment(f.into())));
        self
    }

    pub fn then_fail(mut self, message: &str) -> Self {
        self.script.push(MockItem::Fail(message.to_string()));
        self
    }

    pub fn then_hang(mut self) -> Self {
        self.script.push(MockItem::Hang);
        self
    }

    pub fn with_open_error(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn dropped_streams(&self) -> usize {
        self.dropped_streams.load(Ordering::SeqCst)
    }
}

struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn stream_chat_completion(&self, request: ChatCompletionRequest) -> Result<TextStream> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.open_error {
            return Err(Error::llm(error.clone()));
        }

        let script = self.script.clone();
        let counter = DropCounter(self.dropped_streams.clone());

        let stream = async_stream::stream! {
            let _counter = counter;
            for item in script {
                match item {
                    MockItem::Fragment(text) => yield Ok(text),
                    MockItem::Fail(message) => yield Err(Error::llm(message)),
                    MockItem::Hang => futures::future::pending::<()>().await,
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
