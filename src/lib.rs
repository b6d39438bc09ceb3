// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! llmtrace - span-scoped OpenTelemetry instrumentation for LLM operations.
//!
//! This library wraps chat requests, tool invocations, and streamed
//! message generation in observability spans exported over OTLP. It is
//! consumed by call sites, not run as a process: initialize once, then
//! wrap each operation.
//!
//! # Architecture
//!
//! - [`types`] - Chat message, prompt log, and stream event types
//! - [`semconv`] - Fixed semantic attribute keys for exported spans
//! - [`error`] - Telemetry setup errors
//! - [`telemetry`] - Span wrappers, lifecycle guard, and bootstrap
//!
//! # Guarantees
//!
//! - Every span is completed exactly once, on every exit path, including
//!   early abandonment of a streamed response.
//! - Wrapped operations' failures propagate unchanged; instrumentation
//!   never introduces a new error type into the caller's failure surface.
//! - A missing or misconfigured tracing backend degrades to untraced
//!   execution, never to a failed request.
//!
//! # Example
//!
//! ```rust,ignore
//! use llmtrace::{init_telemetry, tracer, trace_chat, ChatMessage, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::default())?;
//!
//! let messages = vec![ChatMessage::user("Hi")];
//! let tracer = tracer();
//! let reply = trace_chat(&tracer, "claude-sonnet-4-20250514", &messages, || async {
//!     provider.chat(&messages).await
//! })
//! .await?;
//! ```

pub mod error;
pub mod semconv;
pub mod telemetry;
pub mod types;

// Re-export commonly used items at crate root
pub use error::TelemetryError;
pub use telemetry::{
    init_telemetry, instrument, instrument_mcp_tool_call, instrument_stream,
    instrument_tool_call, start_span, trace_chat, trace_chat_stream, trace_message_processing,
    tracer, InstrumentedStream, SpanGuard, TelemetryConfig, TelemetryGuard,
};
pub use types::{
    ChatMessage, ContentPart, MessageContent, PromptLog, Role, StreamEvent, TokenUsage,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_exports() {
        // Verify key types are accessible
        let _msg = ChatMessage::user("test");
        let _config = TelemetryConfig::default();
    }
}
