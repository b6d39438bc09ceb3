// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for telemetry setup.
//!
//! Only instrumentation bootstrap can fail with these errors. The
//! wrappers themselves never introduce a new error type into the caller's
//! failure surface: a wrapped operation's error is recorded on the span
//! and re-raised unchanged.

use thiserror::Error;

/// Errors that can occur while initializing the telemetry pipeline.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid telemetry configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build OTLP exporter: {0}")]
    Exporter(String),
}
