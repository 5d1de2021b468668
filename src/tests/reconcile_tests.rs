//! Tests for the response reconciler.
//!
//! Covers the assistant-payload precedence rule, parsed/refusal computation,
//! and the no-clobber guarantee for pre-existing reply fields.

use crate::error::RelayError;
use crate::reconcile::{attach_structured_result, AssistantPayload};
use crate::transform::ResponseFormat;
use serde_json::{json, Value};

fn upstream_reply(message: Value) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "llama-3.1-70b",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

#[test]
fn test_json_content_with_requested_format_parses_without_refusal() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "content": r#"{"ok":true}"#
    }));

    attach_structured_result(Some(&ResponseFormat::JsonObject), &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["parsed"], json!({"ok": true}));
    assert_eq!(kwargs["refusal"], Value::Null);
}

#[test]
fn test_non_json_content_with_requested_format_sets_refusal() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "content": "I cannot help with that"
    }));

    attach_structured_result(Some(&ResponseFormat::JsonObject), &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["parsed"], Value::Null);
    assert_eq!(
        kwargs["refusal"],
        json!({"status": "error", "message": "LLM did not return standalone JSON"})
    );
}

#[test]
fn test_no_requested_format_never_sets_refusal() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "content": "plain prose answer"
    }));

    attach_structured_result(None, &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["parsed"], Value::Null);
    assert_eq!(kwargs["refusal"], Value::Null);
}

#[test]
fn test_tool_calls_message_is_not_text_scanned() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "tool_calls": [{"id": "call_1", "type": "function",
                        "function": {"name": "lookup", "arguments": "{}"}}]
    }));

    attach_structured_result(Some(&ResponseFormat::JsonObject), &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["parsed"], Value::Null);
    // Structured output was requested and nothing was recovered.
    assert_eq!(kwargs["refusal"]["status"], "error");
    // The tool_calls payload itself is untouched.
    assert_eq!(
        reply["choices"][0]["message"]["tool_calls"][0]["id"],
        "call_1"
    );
}

#[test]
fn test_function_call_message_is_not_text_scanned() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "function_call": {"name": "lookup", "arguments": "{}"}
    }));

    attach_structured_result(None, &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["parsed"], Value::Null);
    assert_eq!(kwargs["refusal"], Value::Null);
}

#[test]
fn test_existing_message_fields_and_siblings_preserved() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "content": r#"{"ok":true}"#,
        "annotations": []
    }));

    attach_structured_result(Some(&ResponseFormat::JsonObject), &mut reply).unwrap();

    assert_eq!(reply["id"], "chatcmpl-123");
    assert_eq!(reply["usage"]["total_tokens"], 15);
    assert_eq!(reply["choices"][0]["finish_reason"], "stop");
    let message = &reply["choices"][0]["message"];
    assert_eq!(message["role"], "assistant");
    assert_eq!(message["content"], r#"{"ok":true}"#);
    assert_eq!(message["annotations"], json!([]));
}

#[test]
fn test_existing_additional_kwargs_keys_are_kept() {
    let mut reply = upstream_reply(json!({
        "role": "assistant",
        "content": "no json",
        "additional_kwargs": {"provider_extra": 42}
    }));

    attach_structured_result(None, &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["provider_extra"], 42);
    assert_eq!(kwargs["parsed"], Value::Null);
}

#[test]
fn test_choice_without_message_gets_one_created() {
    let mut reply = json!({
        "choices": [{"index": 0}]
    });

    attach_structured_result(None, &mut reply).unwrap();

    let kwargs = &reply["choices"][0]["message"]["additional_kwargs"];
    assert_eq!(kwargs["parsed"], Value::Null);
    assert_eq!(kwargs["refusal"], Value::Null);
}

#[test]
fn test_missing_choices_is_an_error() {
    let mut reply = json!({"object": "chat.completion"});

    let result = attach_structured_result(None, &mut reply);

    assert!(matches!(
        result,
        Err(RelayError::ResponseParsingError { .. })
    ));
}

#[test]
fn test_empty_choices_is_an_error() {
    let mut reply = json!({"choices": []});

    let result = attach_structured_result(None, &mut reply);

    assert!(matches!(
        result,
        Err(RelayError::ResponseParsingError { .. })
    ));
}

#[test]
fn test_null_content_takes_precedence_over_tool_calls() {
    // A content key, even null, short-circuits the probe.
    let message = json!({
        "content": null,
        "tool_calls": [{"id": "call_1"}]
    });

    let payload = AssistantPayload::from_message(message.as_object().unwrap());

    assert_eq!(payload, AssistantPayload::Empty);
}

#[test]
fn test_payload_precedence_content_first() {
    let message = json!({
        "content": "text wins",
        "tool_calls": [{"id": "call_1"}],
        "function_call": {"name": "f"}
    });

    let payload = AssistantPayload::from_message(message.as_object().unwrap());

    assert_eq!(payload, AssistantPayload::Text("text wins".to_string()));
}

#[test]
fn test_payload_empty_message() {
    let message = json!({"role": "assistant"});

    let payload = AssistantPayload::from_message(message.as_object().unwrap());

    assert_eq!(payload, AssistantPayload::Empty);
}
