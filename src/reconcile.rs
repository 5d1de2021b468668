//! Response reconciliation.
//!
//! For non-streaming calls, inspects the upstream reply's first choice,
//! recovers a candidate JSON object from its text when structured output was
//! requested, and attaches the result under
//! `choices[0].message.additional_kwargs` without altering any existing
//! field.

use crate::error::{RelayError, RelayResult};
use crate::logging::log_debug;
use crate::response_parser::extract_first_json;
use crate::transform::ResponseFormat;
use serde_json::{json, Map, Value};

/// Refusal marker attached when structured output was requested but could not
/// be recovered from the reply.
fn refusal_marker() -> Value {
    json!({ "status": "error", "message": "LLM did not return standalone JSON" })
}

/// Whatever the assistant returned in a choice's message.
///
/// Closed set with explicit precedence: `content` is checked first, then
/// `tool_calls`, then `function_call`; absence of all three is `Empty`.
/// A `content` key short-circuits the probe even when its value is null or
/// non-string, since only string content is ever text-scanned.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantPayload {
    /// Plain text content - the only shape eligible for JSON extraction.
    Text(String),
    /// A `tool_calls` value, passed through untouched.
    ToolCalls(Value),
    /// A legacy `function_call` value, passed through untouched.
    FunctionCall(Value),
    /// No recognized content; a normal outcome, not an error.
    Empty,
}

impl AssistantPayload {
    /// Unpack a choice's message by the precedence rule above.
    pub fn from_message(message: &Map<String, Value>) -> Self {
        if let Some(content) = message.get("content") {
            return match content.as_str() {
                Some(text) => Self::Text(text.to_string()),
                None => Self::Empty,
            };
        }
        if let Some(tool_calls) = message.get("tool_calls") {
            return Self::ToolCalls(tool_calls.clone());
        }
        if let Some(function_call) = message.get("function_call") {
            return Self::FunctionCall(function_call.clone());
        }
        Self::Empty
    }
}

/// Attach `parsed`/`refusal` to the first choice of `reply` in place.
///
/// - Only string content is scanned for JSON; tool and function payloads
///   yield `parsed: null` unconditionally.
/// - `refusal` is non-null exactly when `requested_format` is `Some` and no
///   JSON could be recovered.
/// - Every other field of the reply, including sibling keys already present
///   under `message` and any further choices, passes through unchanged.
///
/// # Errors
///
/// Returns [`RelayError::ResponseParsingError`] when the reply carries no
/// non-empty `choices` array or the first choice is not an object.
pub fn attach_structured_result(
    requested_format: Option<&ResponseFormat>,
    reply: &mut Value,
) -> RelayResult<()> {
    let choice = reply
        .get_mut("choices")
        .and_then(Value::as_array_mut)
        .and_then(|choices| choices.first_mut())
        .ok_or_else(|| {
            RelayError::response_parsing_error("upstream reply has no choices")
        })?;
    let choice = choice.as_object_mut().ok_or_else(|| {
        RelayError::response_parsing_error("upstream reply choice is not an object")
    })?;

    let message = choice
        .entry("message")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(message) = message.as_object_mut() else {
        return Err(RelayError::response_parsing_error(
            "upstream reply message is not an object",
        ));
    };

    let parsed = match AssistantPayload::from_message(message) {
        AssistantPayload::Text(text) => extract_first_json(&text),
        AssistantPayload::ToolCalls(_)
        | AssistantPayload::FunctionCall(_)
        | AssistantPayload::Empty => None,
    };

    let refusal = if requested_format.is_some() && parsed.is_none() {
        refusal_marker()
    } else {
        Value::Null
    };

    log_debug!(
        structured_requested = requested_format.is_some(),
        parsed_recovered = parsed.is_some(),
        "Reconciled upstream reply"
    );

    let kwargs = message
        .entry("additional_kwargs")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(kwargs) = kwargs.as_object_mut() else {
        return Err(RelayError::response_parsing_error(
            "additional_kwargs in upstream reply is not an object",
        ));
    };
    kwargs.insert("parsed".to_string(), parsed.unwrap_or(Value::Null));
    kwargs.insert("refusal".to_string(), refusal);

    Ok(())
}
