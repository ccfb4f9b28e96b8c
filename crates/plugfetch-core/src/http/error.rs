//! What went wrong on one mirror attempt.

use std::io;

/// Outcome of a failed attempt against a single mirror URL. The fallback loop
/// logs it and moves to the next mirror; it never reaches the job record.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The transfer itself failed: refused connection, DNS, low-speed abort,
    /// or a response curl could not parse.
    #[error("transfer failed: {0}")]
    Transport(#[from] curl::Error),

    /// The last response after redirects was not a 200.
    #[error("server answered HTTP {0}")]
    Status(u32),

    /// Connection closed before the declared `Content-Length` arrived.
    #[error("body ended after {received} of {expected} declared bytes")]
    ShortBody { expected: u64, received: u64 },

    /// The staging file could not be created, grown or written.
    #[error("staging write failed: {0}")]
    Staging(#[from] io::Error),
}

impl FetchError {
    pub(crate) fn staging(msg: &str) -> Self {
        FetchError::Staging(io::Error::other(msg.to_string()))
    }
}
