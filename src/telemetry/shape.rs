// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pure helpers that derive span attributes from chat inputs.
//!
//! Nothing here touches tracing internals: these functions map message
//! lists and operation results to the strings that become attribute
//! values. They never panic on empty input and never mutate their
//! arguments.

use opentelemetry::KeyValue;
use serde::Serialize;

use crate::semconv;
use crate::types::{ChatMessage, MessageContent, Role};

/// Serialize message content to an attribute value.
///
/// Plain text is used verbatim; structured parts become canonical JSON.
pub fn content_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => serde_json::to_string(parts).unwrap_or_default(),
    }
}

/// Content of the last `user` message, if any.
pub fn last_user_message(messages: &[ChatMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|msg| msg.role == Role::User)
        .map(|msg| content_text(&msg.content))
}

/// Content of the first `system` message, if any.
pub fn system_message(messages: &[ChatMessage]) -> Option<String> {
    messages
        .iter()
        .find(|msg| msg.role == Role::System)
        .map(|msg| content_text(&msg.content))
}

/// Canonical serialization of an operation result.
///
/// Strings pass through verbatim, `null` is omitted, everything else is
/// rendered as compact JSON.
pub fn output_value<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Null) => None,
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(other) => Some(other.to_string()),
        Err(_) => None,
    }
}

/// The shared attribute set for chat spans.
///
/// Always includes the model, message count, and operation tag; the last
/// user message and the system message are attached when present.
pub fn chat_attributes(
    model: &str,
    messages: &[ChatMessage],
    operation: &'static str,
) -> Vec<KeyValue> {
    let mut attributes = vec![
        KeyValue::new(semconv::OPENINFERENCE_SPAN_KIND, semconv::SPAN_KIND_LLM),
        KeyValue::new(semconv::MODEL, model.to_string()),
        KeyValue::new(semconv::MESSAGE_COUNT, messages.len() as i64),
        KeyValue::new(semconv::OPERATION, operation),
    ];

    if let Some(input) = last_user_message(messages) {
        attributes.push(KeyValue::new(semconv::INPUT_VALUE, input));
    }
    if let Some(system) = system_message(messages) {
        attributes.push(KeyValue::new(semconv::SYSTEM_MESSAGE, system));
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentPart;

    fn sample_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are helpful"),
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("Hi"),
        ]
    }

    #[test]
    fn test_last_user_message_picks_latest() {
        assert_eq!(last_user_message(&sample_messages()), Some("Hi".to_string()));
    }

    #[test]
    fn test_system_message_picks_first() {
        let mut messages = sample_messages();
        messages.push(ChatMessage::system("second system"));
        assert_eq!(
            system_message(&messages),
            Some("You are helpful".to_string())
        );
    }

    #[test]
    fn test_empty_message_list_yields_nothing() {
        assert_eq!(last_user_message(&[]), None);
        assert_eq!(system_message(&[]), None);
    }

    #[test]
    fn test_structured_content_serializes_to_json() {
        let msg = ChatMessage::with_parts(
            Role::User,
            vec![ContentPart::Text {
                text: "hello".to_string(),
            }],
        );
        let text = content_text(&msg.content);
        assert!(text.starts_with('['));
        assert!(text.contains("\"type\":\"text\""));
    }

    #[test]
    fn test_output_value_strings_pass_through() {
        assert_eq!(output_value(&"Hello!"), Some("Hello!".to_string()));
    }

    #[test]
    fn test_output_value_structured_becomes_json() {
        let value = serde_json::json!({"tokens": 2});
        assert_eq!(output_value(&value), Some("{\"tokens\":2}".to_string()));
    }

    #[test]
    fn test_output_value_null_is_omitted() {
        let value: Option<String> = None;
        assert_eq!(output_value(&value), None);
    }

    #[test]
    fn test_shaping_is_idempotent() {
        let messages = sample_messages();
        let first: Vec<String> = chat_attributes("m", &messages, "chat")
            .iter()
            .map(|kv| format!("{}={:?}", kv.key, kv.value))
            .collect();
        let second: Vec<String> = chat_attributes("m", &messages, "chat")
            .iter()
            .map(|kv| format!("{}={:?}", kv.key, kv.value))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chat_attributes_without_user_message() {
        let messages = vec![ChatMessage::assistant("only assistant")];
        let attrs = chat_attributes("m", &messages, "chat");
        assert!(!attrs.iter().any(|kv| kv.key.as_str() == semconv::INPUT_VALUE));
        assert!(attrs
            .iter()
            .any(|kv| kv.key.as_str() == semconv::MESSAGE_COUNT));
    }
}
