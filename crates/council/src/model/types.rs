use super::errors::QueryError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const DEFAULT_ROLE: &str = "user";

/// A message in the conversation sent to every council member.
///
/// Roles are passed through verbatim. When deserialized, a missing or null
/// `role` becomes `"user"` and a missing or null `content` becomes `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "default_role", deserialize_with = "role_or_default")]
    pub role: String,
    #[serde(default, deserialize_with = "content_or_empty")]
    pub content: String,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

fn role_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_role))
}

fn content_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A normalized answer from one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Flattened answer text.
    pub content: String,
    /// Provider reasoning trace. Never populated by the Responses backend.
    pub reasoning_details: Option<Value>,
}

impl QueryResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reasoning_details: None,
        }
    }
}

/// Model identifier to answer; `None` marks a model whose query failed.
pub type BatchResult = HashMap<String, Option<QueryResult>>;

/// Model identifier to answer or the typed reason it failed.
pub type DetailedBatchResult = HashMap<String, Result<QueryResult, QueryError>>;
