//! Model provider backends.
//!
//! Each provider implements [`ModelBackend`] for its specific API.

mod openai;
pub mod responses;

pub use openai::{DEFAULT_API_URL, DEFAULT_TIMEOUT, OpenAiBackend, OpenAiBackendBuilder};

use crate::model::{Message, QueryError, QueryResult};
use std::future::Future;

/// Trait for model backends the council can fan out to.
///
/// One call asks one model about the whole conversation. Implementations
/// bound their own latency and must not panic on provider misbehaviour;
/// every failure is reported as a [`QueryError`].
pub trait ModelBackend: Send + Sync {
    fn call(
        &self,
        model: &str,
        messages: &[Message],
    ) -> impl Future<Output = Result<QueryResult, QueryError>> + Send;
}
