// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span wrapper for streamed message generation.
//!
//! A streamed chat response is a lazy, resumable sequence: each poll may
//! suspend while the next network chunk arrives. The span must stay open
//! for the whole sequence but still close deterministically, so its
//! completion is bound to the wrapper's lifetime via [`SpanGuard`], not
//! to reaching the done branch of the drive loop. Dropping the wrapper
//! mid-stream (an abandoned response) closes the span too.

use std::borrow::Cow;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use opentelemetry::trace::{Span, SpanKind, Tracer};
use opentelemetry::KeyValue;

use super::shape;
use super::spans::{start_span, SpanGuard};
use crate::semconv;
use crate::types::{ChatMessage, MessageContent, StreamEvent};

/// Wrap a stream of [`StreamEvent`]s in a span with the given name and
/// attributes.
///
/// The span starts eagerly, before the first element is requested.
pub fn instrument_stream<T, S>(
    tracer: &T,
    name: impl Into<Cow<'static, str>>,
    kind: SpanKind,
    attributes: Vec<KeyValue>,
    inner: S,
) -> InstrumentedStream<S, T::Span>
where
    T: Tracer,
{
    InstrumentedStream {
        inner,
        guard: start_span(tracer, name, kind, attributes),
        last_content: None,
    }
}

/// Trace a streamed chat request.
///
/// The span carries the same input attributes as
/// [`trace_chat`](crate::telemetry::trace_chat), with the operation tag
/// `stream_chat`.
pub fn trace_chat_stream<T, S>(
    tracer: &T,
    model: &str,
    messages: &[ChatMessage],
    inner: S,
) -> InstrumentedStream<S, T::Span>
where
    T: Tracer,
{
    let attributes = shape::chat_attributes(model, messages, semconv::OPERATION_STREAM_CHAT);
    instrument_stream(tracer, "llm_stream_chat", SpanKind::Internal, attributes, inner)
}

/// A stream that forwards its inner elements unchanged while keeping a
/// span open for the sequence's lifetime.
///
/// Elements are forwarded in production order with no buffering beyond
/// remembering the most recent delta's content, which becomes the span's
/// `output.value` once the stream completes.
pub struct InstrumentedStream<S, Sp: Span> {
    inner: S,
    guard: SpanGuard<Sp>,
    last_content: Option<MessageContent>,
}

impl<S, Sp: Span> InstrumentedStream<S, Sp> {
    /// Whether the span has not been closed yet.
    pub fn span_open(&self) -> bool {
        self.guard.is_open()
    }

    fn complete(&mut self) {
        if let Some(content) = self.last_content.take() {
            self.guard
                .set_attribute(KeyValue::new(semconv::OUTPUT_VALUE, shape::content_text(&content)));
        }
        self.guard.succeed();
        self.guard.end();
    }

    fn fail(&mut self, error: &dyn std::error::Error) {
        self.guard.record_failure(error);
        self.guard.end();
    }
}

impl<S, Sp, E> Stream for InstrumentedStream<S, Sp>
where
    S: Stream<Item = Result<StreamEvent, E>> + Unpin,
    Sp: Span + Unpin,
    E: std::error::Error,
{
    type Item = Result<StreamEvent, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(event))) => {
                match &event {
                    StreamEvent::Message(message) => {
                        this.last_content = Some(message.content.clone());
                    }
                    StreamEvent::Done(_) => this.complete(),
                }
                Poll::Ready(Some(Ok(event)))
            }
            Poll::Ready(Some(Err(error))) => {
                this.fail(&error);
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                // Inner stream ended without a terminal event; close the
                // span with whatever was last forwarded.
                if this.guard.is_open() {
                    this.complete();
                }
                Poll::Ready(None)
            }
        }
    }
}
