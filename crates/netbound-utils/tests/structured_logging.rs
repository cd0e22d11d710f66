//! Integration tests for the structured logging helpers
//!
//! Only one global subscriber can be installed per process, so the init tests
//! accept either outcome; the helpers must never panic with or without one.

use netbound_utils::FailureKind;
use netbound_utils::logging::{
    init_tracing, init_tracing_json, log_request_outcome, log_request_start, request_span,
};

#[test]
fn test_tracing_initialization() {
    let result = init_tracing(false);
    assert!(result.is_ok() || result.is_err());
}

#[test]
fn test_second_initialization_fails_cleanly() {
    let _ = init_tracing(true);
    // A subscriber is installed now (by this test or a sibling); a second one is refused.
    assert!(init_tracing_json().is_err());
}

#[test]
fn test_request_span_usage() {
    let span = request_span("login", 7);
    let _guard = span.enter();

    log_request_start("login", 7, true);
    log_request_outcome("login", 7, None, 12);
    log_request_outcome("login", 7, Some(FailureKind::Timeout), 3000);
    log_request_outcome("login", 7, Some(FailureKind::PersistenceFailure), 40);
}
