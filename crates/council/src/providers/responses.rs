//! Wire shapes for the Responses API.
//!
//! Requests are strongly typed. Responses are not: providers behind a
//! Responses-compatible endpoint disagree on which fields they fill in, so the
//! payload stays a [`Value`] and [`extract_output_text`] probes it field by
//! field.

use crate::model::Message;
use serde::Serialize;
use serde_json::Value;

/// Block types whose `text` counts as answer text.
const TEXT_BLOCK_TYPES: [&str; 2] = ["output_text", "text"];

/// Request body for one model.
#[derive(Debug, Serialize)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub input: Vec<InputItem<'a>>,
}

impl<'a> ResponsesRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Message]) -> Self {
        Self {
            model,
            input: to_input(messages),
        }
    }
}

/// One conversation turn in provider form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputItem<'a> {
    pub role: &'a str,
    pub content: Vec<InputBlock<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputBlock<'a> {
    InputText { text: &'a str },
}

/// Convert messages to Responses input items, one item per message.
pub fn to_input(messages: &[Message]) -> Vec<InputItem<'_>> {
    messages
        .iter()
        .map(|m| InputItem {
            role: &m.role,
            content: vec![InputBlock::InputText { text: &m.content }],
        })
        .collect()
}

/// Pull the answer text out of a Responses payload.
///
/// A non-empty top-level `output_text` wins outright. Otherwise the text of
/// every `output[].content[]` block tagged `output_text` or `text` is joined
/// in order. Fields that are missing or of the wrong JSON type count as
/// absent, so any payload shape yields either text or `None`.
pub fn extract_output_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload
        .get("output_text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    {
        return Some(text.to_string());
    }

    let joined: String = list(payload, "output")
        .flat_map(|item| list(item, "content"))
        .filter(|block| is_text_block(block))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();

    (!joined.is_empty()).then_some(joined)
}

fn list<'a>(value: &'a Value, key: &'static str) -> impl Iterator<Item = &'a Value> {
    value.get(key).and_then(Value::as_array).into_iter().flatten()
}

fn is_text_block(block: &Value) -> bool {
    block
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| TEXT_BLOCK_TYPES.contains(&kind))
}
