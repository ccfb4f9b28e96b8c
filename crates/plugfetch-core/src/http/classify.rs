//! Classify HTTP status and curl errors into mirror skip reasons.

use super::error::FetchError;

/// Why a mirror attempt was abandoned. All kinds lead to the next mirror;
/// the distinction only feeds logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 404 from the source.
    NotFound,
    /// Any other non-200 status.
    Status(u16),
    /// Connect/read timeout.
    Timeout,
    /// Network-level failure (connection refused, DNS, reset).
    Connection,
    /// Response could not be parsed or ended early.
    Malformed,
    /// Local staging file failure.
    Storage,
    /// Anything else curl reports.
    Other,
}

/// Classify the final HTTP status of a mirror response.
pub fn classify_http_status(code: u32) -> SkipReason {
    match code {
        404 => SkipReason::NotFound,
        _ => SkipReason::Status(u16::try_from(code).unwrap_or(u16::MAX)),
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> SkipReason {
    if e.is_operation_timedout() {
        return SkipReason::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
    {
        return SkipReason::Connection;
    }
    if e.is_got_nothing() || e.is_partial_file() || e.is_unsupported_protocol() {
        return SkipReason::Malformed;
    }
    // Aborted by our own write callback means the staging file failed.
    if e.is_write_error() {
        return SkipReason::Storage;
    }
    SkipReason::Other
}

/// Classify a mirror fetch error.
pub fn classify(e: &FetchError) -> SkipReason {
    match e {
        FetchError::Transport(ce) => classify_curl_error(ce),
        FetchError::Status(code) => classify_http_status(*code),
        FetchError::ShortBody { .. } => SkipReason::Malformed,
        FetchError::Staging(_) => SkipReason::Storage,
    }
}
