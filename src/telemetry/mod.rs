// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span-scoped instrumentation for LLM operations.
//!
//! This module wraps application operations in OpenTelemetry spans:
//!
//! - **Single-result wrappers**: chat requests, individual message
//!   processing, and tool invocations ([`instrument`], [`trace_chat`],
//!   [`instrument_tool_call`], [`instrument_mcp_tool_call`])
//! - **Streaming wrapper**: streamed message generation under one span
//!   covering the whole sequence ([`trace_chat_stream`])
//! - **Span lifecycle**: RAII completion guarantees ([`SpanGuard`])
//! - **Bootstrap**: OTLP export pipeline and global registration
//!   ([`init_telemetry`])
//!
//! # Usage
//!
//! Initialize telemetry once at startup, then pass the process-wide
//! tracer handle to the wrappers:
//!
//! ```rust,ignore
//! use llmtrace::telemetry::{init_telemetry, tracer, trace_chat, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::production("http://localhost:4317"))?;
//!
//! let tracer = tracer();
//! let response = trace_chat(&tracer, "gpt-4o", &messages, || async {
//!     provider.chat(&messages).await
//! })
//! .await?;
//! ```
//!
//! Failures of the wrapped operation are recorded on the span and
//! re-raised unchanged; the wrappers never swallow, retry, or rewrap
//! errors. If telemetry was never initialized, the handle is a no-op
//! tracer and operations run untraced.

mod init;
mod instrument;
pub mod shape;
mod spans;
mod stream;

pub use init::{init_telemetry, tracer, TelemetryConfig, TelemetryGuard, TRACER_NAME};
pub use instrument::{
    instrument, instrument_mcp_tool_call, instrument_tool_call, trace_chat,
    trace_message_processing,
};
pub use spans::{start_span, SpanGuard};
pub use stream::{instrument_stream, trace_chat_stream, InstrumentedStream};
