// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span wrappers for single-result operations.
//!
//! Each wrapper starts a span, awaits the wrapped operation, attaches
//! input/output attributes, records failures, and re-raises the
//! operation's error unchanged. Span completion is bound to the guard's
//! lifetime, so every exit path ends the span exactly once.

use std::borrow::Cow;
use std::future::Future;

use opentelemetry::trace::{SpanKind, Tracer};
use opentelemetry::KeyValue;
use serde::Serialize;

use super::shape;
use super::spans::start_span;
use crate::semconv;
use crate::types::{ChatMessage, Role};

/// Core wrapper: run `op` inside a span.
///
/// `success_attributes` derives extra attributes from the result before
/// the span is marked ok; failure records the error on the span and
/// propagates it untouched.
async fn run_in_span<T, F, Fut, R, E, A>(
    tracer: &T,
    name: impl Into<Cow<'static, str>>,
    kind: SpanKind,
    attributes: Vec<KeyValue>,
    op: F,
    success_attributes: A,
) -> Result<R, E>
where
    T: Tracer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: std::error::Error,
    A: FnOnce(&R) -> Vec<KeyValue>,
{
    let mut guard = start_span(tracer, name, kind, attributes);

    match op().await {
        Ok(result) => {
            guard.set_attributes(success_attributes(&result));
            guard.succeed();
            Ok(result)
        }
        Err(error) => {
            guard.record_failure(&error);
            Err(error)
        }
    }
    // guard drops here, ending the span on both branches
}

/// Run an async operation inside a span with the given name and
/// attributes.
///
/// On success the canonical serialization of the result is attached as
/// `output.value` (strings verbatim, structured values as JSON).
pub async fn instrument<T, F, Fut, R, E>(
    tracer: &T,
    name: impl Into<Cow<'static, str>>,
    kind: SpanKind,
    attributes: Vec<KeyValue>,
    op: F,
) -> Result<R, E>
where
    T: Tracer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: std::error::Error,
{
    run_in_span(tracer, name, kind, attributes, op, output_attributes).await
}

/// Trace a single-result chat request.
///
/// The span carries the model name, message count, operation tag, the
/// last user message as `input.value`, and the system message when one
/// is present.
pub async fn trace_chat<T, F, Fut, R, E>(
    tracer: &T,
    model: &str,
    messages: &[ChatMessage],
    op: F,
) -> Result<R, E>
where
    T: Tracer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: std::error::Error,
{
    let attributes = shape::chat_attributes(model, messages, semconv::OPERATION_CHAT);
    run_in_span(
        tracer,
        "llm_chat",
        SpanKind::Internal,
        attributes,
        op,
        output_attributes,
    )
    .await
}

/// Trace the processing of an individual message.
///
/// User message content becomes `input.value`; for assistant messages
/// the result is attached as `output.value`.
pub async fn trace_message_processing<T, F, Fut, R, E>(
    tracer: &T,
    message: &ChatMessage,
    op: F,
) -> Result<R, E>
where
    T: Tracer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: std::error::Error,
{
    let mut attributes = vec![
        KeyValue::new(semconv::OPENINFERENCE_SPAN_KIND, semconv::SPAN_KIND_CHAIN),
        KeyValue::new(semconv::MESSAGE_ROLE, message.role.as_str()),
    ];
    if message.role == Role::User {
        attributes.push(KeyValue::new(
            semconv::INPUT_VALUE,
            shape::content_text(&message.content),
        ));
    }

    let is_assistant = message.role == Role::Assistant;
    run_in_span(
        tracer,
        "process_message",
        SpanKind::Internal,
        attributes,
        op,
        move |result: &R| {
            if is_assistant {
                output_attributes(result)
            } else {
                Vec::new()
            }
        },
    )
    .await
}

/// Trace a built-in tool invocation.
///
/// The span is named `tool.{name}` and carries the function name, the
/// JSON-serialized arguments, and `tool.type = "builtin"`.
pub async fn instrument_tool_call<T, F, Fut, R, E>(
    tracer: &T,
    tool_name: &str,
    args: &serde_json::Value,
    op: F,
) -> Result<R, E>
where
    T: Tracer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: std::error::Error,
{
    let attributes = tool_attributes(tool_name, args, semconv::TOOL_TYPE_BUILTIN, None);
    run_in_span(
        tracer,
        format!("tool.{tool_name}"),
        SpanKind::Internal,
        attributes,
        op,
        tool_result_attributes,
    )
    .await
}

/// Trace a tool invocation served by an MCP server.
///
/// The span is named `mcp.{server}.{name}` and carries
/// `tool.type = "mcp"` plus the server identifier as `tool.mcp_id`.
pub async fn instrument_mcp_tool_call<T, F, Fut, R, E>(
    tracer: &T,
    mcp_id: &str,
    tool_name: &str,
    args: &serde_json::Value,
    op: F,
) -> Result<R, E>
where
    T: Tracer,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    R: Serialize,
    E: std::error::Error,
{
    let attributes = tool_attributes(tool_name, args, semconv::TOOL_TYPE_MCP, Some(mcp_id));
    run_in_span(
        tracer,
        format!("mcp.{mcp_id}.{tool_name}"),
        SpanKind::Internal,
        attributes,
        op,
        tool_result_attributes,
    )
    .await
}

fn output_attributes<R: Serialize>(result: &R) -> Vec<KeyValue> {
    match shape::output_value(result) {
        Some(output) => vec![KeyValue::new(semconv::OUTPUT_VALUE, output)],
        None => Vec::new(),
    }
}

fn tool_result_attributes<R: Serialize>(result: &R) -> Vec<KeyValue> {
    let mut attributes = output_attributes(result);
    if let Ok(json) = serde_json::to_string(result) {
        attributes.push(KeyValue::new(semconv::TOOL_RESULT, json));
    }
    attributes
}

fn tool_attributes(
    tool_name: &str,
    args: &serde_json::Value,
    tool_type: &'static str,
    mcp_id: Option<&str>,
) -> Vec<KeyValue> {
    let mut attributes = vec![
        KeyValue::new(semconv::OPENINFERENCE_SPAN_KIND, semconv::SPAN_KIND_TOOL),
        KeyValue::new(semconv::TOOL_CALL_FUNCTION_NAME, tool_name.to_string()),
        KeyValue::new(
            semconv::TOOL_CALL_FUNCTION_ARGUMENTS_JSON,
            args.to_string(),
        ),
        KeyValue::new(semconv::TOOL_TYPE, tool_type),
    ];
    if let Some(id) = mcp_id {
        attributes.push(KeyValue::new(semconv::TOOL_MCP_ID, id.to_string()));
    }
    attributes
}
