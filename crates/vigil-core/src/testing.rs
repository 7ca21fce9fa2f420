//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vigil_clients::{ChatModel, ChatRequest, ClientError, NewsSource};

/// Serves a fixed payload per endpoint and counts fetches. Unknown
/// endpoints answer 503.
#[derive(Default)]
pub struct FakeNews {
    payloads: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FakeNews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, endpoint: &str, payload: &str) -> Self {
        self.payloads.insert(endpoint.to_string(), payload.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for FakeNews {
    async fn fetch(&self, endpoint: &str, _query: &str) -> vigil_clients::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .get(endpoint)
            .map(|p| p.as_bytes().to_vec())
            .ok_or_else(|| ClientError::Status {
                service: "news",
                status: 503,
                body: "unavailable".into(),
            })
    }
}

/// Replies from a script in order and records every request.
/// An exhausted script answers 500.
#[derive(Default)]
pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, request: &ChatRequest) -> vigil_clients::Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::Status {
                service: "openai",
                status: 500,
                body: "script exhausted".into(),
            })
    }
}
