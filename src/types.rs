// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types for LLM trace instrumentation.
//!
//! This module defines the data that flows through the instrumented
//! operations: chat messages with string or structured content, the
//! terminal summary of a streamed generation, and the event type emitted
//! by instrumented streams.

use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Wire name of the role, matching its serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// One structured part of a message body.
///
/// Tagged rather than duck-typed: each variant has exactly one
/// serialization rule, so attribute shaping never inspects runtime types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text part.
    Text { text: String },

    /// Image reference part.
    ImageUrl { url: String },

    /// A tool invocation requested by the model.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// The result of a previously requested tool invocation.
    ToolResult { tool_use_id: String, content: String },
}

/// Message content - either a plain string or structured parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// A message in a conversation.
///
/// Immutable once constructed; attribute shaping reads it by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a user message with text content.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message with text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a system message with text content.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a tool message with text content.
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a message with structured content parts.
    pub fn with_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
        }
    }

    /// Get text content if this message has simple text content.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(s) => Some(s),
            MessageContent::Parts(_) => None,
        }
    }
}

// ============================================================================
// Stream Summary Types
// ============================================================================

/// Token usage reported at the end of a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the input/prompt
    pub input_tokens: u32,
    /// Number of tokens in the output/completion
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Get total tokens (input + output).
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Terminal summary of a streamed generation.
///
/// Produced once by the wrapped stream after its final delta, and
/// surfaced unchanged to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptLog {
    /// Model that produced the completion
    pub model: String,
    /// Prompt text the completion was generated from
    pub prompt: String,
    /// Full accumulated completion text
    pub completion: String,
    /// Token usage, if the provider reported it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

// ============================================================================
// Streaming Types
// ============================================================================

/// Events produced by an instrumented message stream.
///
/// A well-formed stream yields zero or more [`StreamEvent::Message`]
/// deltas followed by exactly one [`StreamEvent::Done`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental chat message delta.
    Message(ChatMessage),

    /// Stream completed with a terminal summary.
    Done(PromptLog),
}

impl StreamEvent {
    /// Check if this is a message delta event.
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message(_))
    }

    /// Check if this is the terminal event.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Get the message if this is a delta event.
    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Message(msg) => Some(msg),
            Self::Done(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("Hello, world!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.as_text(), Some("Hello, world!"));
    }

    #[test]
    fn test_message_with_parts() {
        let parts = vec![
            ContentPart::Text {
                text: "Hello".to_string(),
            },
            ContentPart::ToolUse {
                id: "123".to_string(),
                name: "read_file".to_string(),
                input: serde_json::json!({"path": "test.txt"}),
            },
        ];
        let msg = ChatMessage::with_parts(Role::Assistant, parts);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.as_text().is_none());
    }

    #[test]
    fn test_message_serialization() {
        let msg = ChatMessage::user("test");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"test\""));
    }

    #[test]
    fn test_content_part_serialization() {
        let part = ContentPart::ToolUse {
            id: "id1".to_string(),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "ls"}),
        };
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"tool_use\""));
        assert!(json.contains("\"name\":\"bash\""));
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_stream_event_accessors() {
        let delta = StreamEvent::Message(ChatMessage::assistant("He"));
        assert!(delta.is_message());
        assert!(!delta.is_done());
        assert_eq!(delta.as_message().unwrap().as_text(), Some("He"));

        let done = StreamEvent::Done(PromptLog {
            model: "test-model".to_string(),
            prompt: "Hi".to_string(),
            completion: "Hello".to_string(),
            usage: None,
        });
        assert!(done.is_done());
        assert!(done.as_message().is_none());
    }
}
