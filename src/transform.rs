//! Request transformation.
//!
//! Translates an OpenAI-style `response_format` field, which the upstream API
//! does not understand, into a system message the upstream model can follow.
//! The field is removed from the outgoing request and the instruction is
//! prepended to `messages` so it is the first thing the model sees.

use crate::error::{RelayError, RelayResult};
use crate::logging::log_debug;
use serde_json::{json, Value};

/// Fixed preamble instructing pure-JSON-only replies, with a literal fallback
/// phrase the model should emit verbatim if it cannot comply.
pub const STRUCTURED_OUTPUT_PROMPT: &str = "You MUST reply with pure JSON **only** (no markdown). \
     If you cannot, reply with {\"status\":\"error\",\"message\":\"Unable to comply\"}.";

/// A caller's structured-output requirement, parsed from `response_format`.
///
/// Closed set: the two recognized OpenAI shapes plus a catch-all for any
/// other present-but-unrecognized tag, which still gets the plain preamble.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// `{"type": "json_object"}` - any valid JSON, no schema.
    JsonObject,
    /// `{"type": "json_schema", "json_schema": {...}}` - the schema value is
    /// opaque to the relay and only serialized verbatim into the instruction.
    JsonSchema {
        /// The caller-supplied schema object, kept as-is.
        schema: Value,
    },
    /// Any other recognized-as-present value; treated like `json_object`.
    Other,
}

impl ResponseFormat {
    /// Parse a non-falsy `response_format` value.
    ///
    /// The canonical schema tag is `"json_schema"`; a `json_schema`-typed
    /// format without a schema value under that exact key is a caller error
    /// and fails fast rather than silently proceeding with no schema text.
    fn from_value(value: &Value) -> RelayResult<Self> {
        match value.get("type").and_then(Value::as_str) {
            Some("json_schema") => {
                let schema = value.get("json_schema").ok_or_else(|| {
                    RelayError::invalid_request(
                        "malformed response_format: type \"json_schema\" requires a \"json_schema\" value",
                    )
                })?;
                Ok(Self::JsonSchema {
                    schema: schema.clone(),
                })
            }
            Some("json_object") => Ok(Self::JsonObject),
            _ => Ok(Self::Other),
        }
    }

    /// Build the system instruction for this format.
    fn instruction(&self) -> RelayResult<String> {
        match self {
            Self::JsonSchema { schema } => {
                // Compact serialization, no extraneous whitespace.
                let schema = serde_json::to_string(schema).map_err(|e| {
                    RelayError::invalid_request(format!(
                        "response_format schema is not serializable: {e}"
                    ))
                })?;
                Ok(format!(
                    "{STRUCTURED_OUTPUT_PROMPT} The response MUST validate against this schema:\n{schema}"
                ))
            }
            Self::JsonObject | Self::Other => Ok(STRUCTURED_OUTPUT_PROMPT.to_string()),
        }
    }
}

/// `response_format` values that mean "no structured-output requirement".
///
/// Mirrors loose-truthiness callers in the wild rely on: null, `false`, and
/// empty strings/objects/arrays all count as absent.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Number(_) => false,
    }
}

/// Rewrite `request` in place so a `response_format` requirement becomes a
/// system instruction, and return the parsed requirement for the response
/// reconciler.
///
/// - Absent or falsy `response_format`: the key is removed if present, no
///   message is injected, and `Ok(None)` is returned.
/// - Otherwise the instruction message is prepended to `messages` and the
///   field is stripped, since the upstream must not receive it.
///
/// No other field, `stream` included, is touched.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] when the body is not a JSON object,
/// when a `json_schema` format carries no schema value, or when a
/// structured-output request has no `messages` array to prepend to.
pub fn inject_structured_output_prompt(request: &mut Value) -> RelayResult<Option<ResponseFormat>> {
    let Some(body) = request.as_object_mut() else {
        return Err(RelayError::invalid_request(
            "request body must be a JSON object",
        ));
    };

    // shift_remove keeps the remaining fields in caller order.
    let Some(raw_format) = body.shift_remove("response_format") else {
        return Ok(None);
    };
    if is_falsy(&raw_format) {
        return Ok(None);
    }

    let format = ResponseFormat::from_value(&raw_format)?;
    let instruction = format.instruction()?;

    let messages = body
        .get_mut("messages")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            RelayError::invalid_request(
                "request with response_format must carry a messages array",
            )
        })?;
    messages.insert(0, json!({ "role": "system", "content": instruction }));

    log_debug!(
        format = ?format,
        message_count = messages.len(),
        "Injected structured output instruction"
    );

    Ok(Some(format))
}
