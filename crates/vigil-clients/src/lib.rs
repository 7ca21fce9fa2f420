//! `vigil-clients` — the two network collaborators the vigil pipeline talks to.
//!
//! # Architecture
//!
//! ```text
//! ChatRequest ──► ChatModel (trait) ──► OpenAiChat   POST {base}/chat/completions
//!                                          │
//! (endpoint, query) ──► NewsSource (trait) ──► NewsApiClient   GET {base}/{endpoint}?{query}
//!                                          │
//!                                          ▼
//!                                     RetryPolicy   bounded attempts, full-jitter backoff
//! ```
//!
//! Both clients take their credential in the constructor; nothing in this
//! crate reads the process environment. The traits are the seams the core
//! pipeline depends on, so tests can substitute scripted fakes.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use vigil_clients::{ChatModel, ChatParams, ChatRequest, OpenAiChat};
//!
//! let chat = OpenAiChat::new(api_key);
//! let params = ChatParams::new("gpt-4o", 256, 0.2);
//! let request = ChatRequest::new(&params, "You are terse.", "Say hello.");
//! let text = chat.complete(&request).await?;
//! ```

pub mod chat;
pub mod error;
pub mod news;
pub mod retry;
pub mod types;


pub use chat::{ChatModel, OpenAiChat, OPENAI_API_URL};
pub use error::ClientError;
pub use news::{NewsApiClient, NewsSource, NEWS_API_URL};
pub use retry::RetryPolicy;
pub use types::{ChatMessage, ChatParams, ChatRequest, ChatResponse, Role};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClientError>;
