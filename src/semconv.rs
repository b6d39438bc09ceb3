// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Semantic attribute keys used on exported spans.
//!
//! The OpenInference keys are fixed by the tracing backend's UI and must
//! not change; the `llmtrace.*` keys are vendor-scoped to this crate.
//! Keys are grouped by the concern they describe.

// ============================================================================
// OpenInference span classification
// ============================================================================

/// Span-kind classification key understood by OpenInference backends.
pub const OPENINFERENCE_SPAN_KIND: &str = "openinference.span.kind";

/// Span kind value for LLM inference spans.
pub const SPAN_KIND_LLM: &str = "LLM";

/// Span kind value for intermediate processing spans.
pub const SPAN_KIND_CHAIN: &str = "CHAIN";

/// Span kind value for tool invocation spans.
pub const SPAN_KIND_TOOL: &str = "TOOL";

/// Resource-level project name, used for grouping in the backend UI.
pub const PROJECT_NAME: &str = "openinference.project.name";

// ============================================================================
// Input / output values
// ============================================================================

/// The primary input of the traced operation.
pub const INPUT_VALUE: &str = "input.value";

/// The primary output of the traced operation.
pub const OUTPUT_VALUE: &str = "output.value";

// ============================================================================
// Tool calls
// ============================================================================

/// Name of the invoked tool function.
pub const TOOL_CALL_FUNCTION_NAME: &str = "tool_call.function.name";

/// JSON-serialized arguments of the invoked tool function.
pub const TOOL_CALL_FUNCTION_ARGUMENTS_JSON: &str = "tool_call.function.arguments";

/// Whether the tool is built in or registered through an MCP server.
pub const TOOL_TYPE: &str = "tool.type";

/// Tool type value for built-in tools.
pub const TOOL_TYPE_BUILTIN: &str = "builtin";

/// Tool type value for MCP-registered tools.
pub const TOOL_TYPE_MCP: &str = "mcp";

/// Identifier of the MCP server providing the tool.
pub const TOOL_MCP_ID: &str = "tool.mcp_id";

/// JSON-serialized result of the tool invocation.
pub const TOOL_RESULT: &str = "tool.result";

// ============================================================================
// Chat operations
// ============================================================================

/// Model name the chat request was sent to.
pub const MODEL: &str = "llmtrace.model";

/// Number of messages in the conversation at request time.
pub const MESSAGE_COUNT: &str = "llmtrace.message_count";

/// Operation tag (`chat`, `stream_chat`, ...).
pub const OPERATION: &str = "llmtrace.operation";

/// Content of the system message, when present.
pub const SYSTEM_MESSAGE: &str = "llmtrace.system_message";

/// Role of the message being processed.
pub const MESSAGE_ROLE: &str = "llmtrace.message_role";

/// Operation tag value for single-result chat requests.
pub const OPERATION_CHAT: &str = "chat";

/// Operation tag value for streamed chat requests.
pub const OPERATION_STREAM_CHAT: &str = "stream_chat";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openinference_keys_are_stable() {
        // These exact strings are what the backend UI matches on.
        assert_eq!(OPENINFERENCE_SPAN_KIND, "openinference.span.kind");
        assert_eq!(INPUT_VALUE, "input.value");
        assert_eq!(OUTPUT_VALUE, "output.value");
        assert_eq!(TOOL_CALL_FUNCTION_NAME, "tool_call.function.name");
        assert_eq!(TOOL_CALL_FUNCTION_ARGUMENTS_JSON, "tool_call.function.arguments");
    }

    #[test]
    fn test_vendor_keys_are_prefixed() {
        for key in [MODEL, MESSAGE_COUNT, OPERATION, SYSTEM_MESSAGE, MESSAGE_ROLE] {
            assert!(key.starts_with("llmtrace."));
        }
    }
}
