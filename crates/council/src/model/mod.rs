//! Conversation and outcome types shared by the backends and the dispatcher.

pub mod errors;
pub mod types;

pub use errors::QueryError;
pub use types::{BatchResult, DetailedBatchResult, Message, QueryResult};
