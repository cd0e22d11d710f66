//! Logging and observability infrastructure for netbound
//!
//! Structured `tracing` setup plus the span and event helpers every request
//! goes through, so that one request can be followed across the orchestrator,
//! repository, transport and stores by its `request_id`.

use std::io::IsTerminal;

use tracing::{Level, error, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::FailureKind;

/// Check if colored output should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("netbound=debug,info")
            } else {
                EnvFilter::try_new("netbound=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber for human-readable output.
///
/// Verbose mode adds targets and span-close timings. `RUST_LOG` overrides the
/// default filter in both modes. Fails if a global subscriber is already set.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_color())
        .with_target(verbose)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_span_events(if verbose {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .compact();

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(layer)
        .try_init()?;

    Ok(())
}

/// Initialize the tracing subscriber with newline-delimited JSON events.
pub fn init_tracing_json() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(default_filter(false))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .try_init()?;

    Ok(())
}

/// Span covering the whole lifetime of one request.
pub fn request_span(operation: &str, request_id: u64) -> tracing::Span {
    span!(
        Level::INFO,
        "resource_request",
        operation = %operation,
        request_id = request_id,
    )
}

pub fn log_request_start(operation: &str, request_id: u64, needs_network: bool) {
    info!(
        operation = %operation,
        request_id = request_id,
        needs_network = needs_network,
        "Starting resource request"
    );
}

/// Log the terminal outcome of a request.
///
/// Timeouts and connectivity failures are expected in the field and log at
/// `warn`; everything else that fails logs at `error`.
pub fn log_request_outcome(
    operation: &str,
    request_id: u64,
    failure: Option<FailureKind>,
    elapsed_ms: u128,
) {
    match failure {
        None => info!(
            operation = %operation,
            request_id = request_id,
            elapsed_ms = %elapsed_ms,
            "Resource request succeeded"
        ),
        Some(kind @ (FailureKind::Timeout | FailureKind::NoNetwork)) => warn!(
            operation = %operation,
            request_id = request_id,
            elapsed_ms = %elapsed_ms,
            failure_kind = %kind,
            "Resource request failed"
        ),
        Some(kind) => error!(
            operation = %operation,
            request_id = request_id,
            elapsed_ms = %elapsed_ms,
            failure_kind = %kind,
            "Resource request failed"
        ),
    }
}
