//! Council — concurrent fan-out of one conversation to many models.
//!
//! This crate sends the same conversation to a set of models at once,
//! normalizes each provider response to plain text, and always hands back a
//! complete per-model result, with failed models marked rather than dropped.
//!
//! # Overview
//!
//! - **Message**: a role-tagged conversation turn.
//! - **ModelBackend**: a trait abstracting one provider endpoint.
//! - **OpenAiBackend**: the Responses API implementation, with a bounded
//!   deadline per call.
//! - **Council**: the dispatcher that queries every model concurrently and
//!   joins the outcomes into a [`BatchResult`].
//!
//! # Example
//!
//! ```ignore
//! use council::{Council, Message, OpenAiBackend};
//!
//! # async fn example() {
//! let backend = OpenAiBackend::builder(Some("sk-...".into())).build();
//! let council = Council::new(backend);
//! let batch = council
//!     .query_all(&["gpt-4o", "gpt-4o-mini"], &[Message::user("Hello!")])
//!     .await;
//! for (model, answer) in &batch {
//!     match answer {
//!         Some(answer) => println!("{model}: {}", answer.content),
//!         None => println!("{model}: failed"),
//!     }
//! }
//! # }
//! ```

mod dispatch;
pub mod model;
pub mod providers;

pub use dispatch::Council;

pub use model::{BatchResult, DetailedBatchResult, Message, QueryError, QueryResult};

pub use providers::{
    DEFAULT_API_URL, DEFAULT_TIMEOUT, ModelBackend, OpenAiBackend, OpenAiBackendBuilder,
};
