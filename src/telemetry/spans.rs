// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span lifecycle primitive.
//!
//! [`SpanGuard`] owns an OpenTelemetry span and guarantees it is ended
//! exactly once, on every exit path. The underlying span record treats a
//! double `end()` as undefined behavior, so the guard routes all
//! completion through a single `Option::take` and hooks it into `Drop`.
//! The single-result and streaming wrappers never end spans any other
//! way.

use std::borrow::Cow;

use opentelemetry::trace::{Span, SpanKind, Status, Tracer};
use opentelemetry::KeyValue;

/// Start a new span under the ambient active span, if any.
///
/// The span inherits its parent from `Context::current()`, so nested
/// instrumented operations (a tool call inside a chat turn) form a trace
/// tree without explicit plumbing.
pub fn start_span<T>(
    tracer: &T,
    name: impl Into<Cow<'static, str>>,
    kind: SpanKind,
    attributes: Vec<KeyValue>,
) -> SpanGuard<T::Span>
where
    T: Tracer,
{
    let span = tracer
        .span_builder(name)
        .with_kind(kind)
        .with_attributes(attributes)
        .start(tracer);
    SpanGuard::new(span)
}

/// RAII guard that ends its span exactly once.
///
/// Attributes and status may only be set while the guard is open; calls
/// after completion are silent no-ops (a caller bug, not a failure to
/// surface).
pub struct SpanGuard<S: Span> {
    span: Option<S>,
}

impl<S: Span> SpanGuard<S> {
    /// Wrap an already-started span.
    pub fn new(span: S) -> Self {
        Self { span: Some(span) }
    }

    /// Whether the span has not been ended yet.
    pub fn is_open(&self) -> bool {
        self.span.is_some()
    }

    /// Set a single attribute. Last write for a key wins.
    pub fn set_attribute(&mut self, attribute: KeyValue) {
        if let Some(span) = &mut self.span {
            span.set_attribute(attribute);
        }
    }

    /// Merge a batch of attributes into the span.
    pub fn set_attributes(&mut self, attributes: impl IntoIterator<Item = KeyValue>) {
        if let Some(span) = &mut self.span {
            for attribute in attributes {
                span.set_attribute(attribute);
            }
        }
    }

    /// Record a failure: an exception event plus an error status.
    ///
    /// Repeat calls append further exception events; the status message
    /// is overwritten by the latest call.
    pub fn record_failure(&mut self, error: &dyn std::error::Error) {
        if let Some(span) = &mut self.span {
            span.record_error(error);
            span.set_status(Status::error(error.to_string()));
        }
    }

    /// Mark the span as completed successfully.
    pub fn succeed(&mut self) {
        if let Some(span) = &mut self.span {
            span.set_status(Status::Ok);
        }
    }

    /// End the span. Further calls are no-ops.
    pub fn end(&mut self) {
        if let Some(mut span) = self.span.take() {
            span.end();
        }
    }
}

impl<S: Span> Drop for SpanGuard<S> {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
    use opentelemetry_sdk::trace::TracerProvider;

    fn test_tracer() -> (InMemorySpanExporter, opentelemetry_sdk::trace::Tracer) {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let tracer = provider.tracer("spans-test");
        (exporter, tracer)
    }

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_end_is_called_exactly_once() {
        let (exporter, tracer) = test_tracer();
        let mut guard = start_span(&tracer, "once", SpanKind::Internal, vec![]);
        guard.end();
        guard.end();
        drop(guard);

        assert_eq!(exporter.get_finished_spans().unwrap().len(), 1);
    }

    #[test]
    fn test_drop_ends_open_span() {
        let (exporter, tracer) = test_tracer();
        {
            let _guard = start_span(&tracer, "dropped", SpanKind::Internal, vec![]);
        }
        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "dropped");
    }

    #[test]
    fn test_attributes_after_end_are_ignored() {
        let (exporter, tracer) = test_tracer();
        let mut guard = start_span(&tracer, "late", SpanKind::Internal, vec![]);
        guard.end();
        guard.set_attribute(KeyValue::new("too", "late"));
        guard.succeed();

        let spans = exporter.get_finished_spans().unwrap();
        assert!(!spans[0].attributes.iter().any(|kv| kv.key.as_str() == "too"));
        assert_eq!(spans[0].status, Status::Unset);
    }

    #[test]
    fn test_record_failure_sets_status_and_event() {
        let (exporter, tracer) = test_tracer();
        let mut guard = start_span(&tracer, "failing", SpanKind::Internal, vec![]);
        guard.record_failure(&Boom);
        guard.end();

        let spans = exporter.get_finished_spans().unwrap();
        assert!(matches!(&spans[0].status, Status::Error { description } if description == "boom"));
        assert!(spans[0].events.events.iter().any(|e| e.name == "exception"));
    }

    #[test]
    fn test_repeat_failures_append_events_latest_status_wins() {
        let (exporter, tracer) = test_tracer();
        let mut guard = start_span(&tracer, "failing-twice", SpanKind::Internal, vec![]);

        #[derive(Debug, thiserror::Error)]
        #[error("second")]
        struct Second;

        guard.record_failure(&Boom);
        guard.record_failure(&Second);
        guard.end();

        let spans = exporter.get_finished_spans().unwrap();
        let exceptions = spans[0]
            .events
            .events
            .iter()
            .filter(|e| e.name == "exception")
            .count();
        assert_eq!(exceptions, 2);
        assert!(
            matches!(&spans[0].status, Status::Error { description } if description == "second")
        );
    }
}
