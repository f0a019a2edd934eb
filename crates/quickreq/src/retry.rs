//! Fixed-count retry policy for transport failures

use reqwest::Method;

/// How an exchange failed, as far as retrying is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// The request could not be built; retrying cannot help
    Build,
    /// Connect or read timeout
    Timeout,
    /// DNS, connect or TLS handshake failure
    Connect,
    /// Failure after the request may have been sent
    Other,
}

impl FailureKind {
    pub(crate) fn of(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            FailureKind::Build
        } else if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::Connect
        } else {
            FailureKind::Other
        }
    }
}

/// Retry up to `max_retries` times without delay
///
/// Only idempotent methods retry, and only after the connection was
/// established. Timeouts and DNS, connect or TLS failures are final.
/// Non-idempotent requests are never resent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    /// Policy allowing `max_retries` attempts after the first
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Additional attempts allowed after the first
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub(crate) fn should_retry(&self, method: &Method, kind: FailureKind, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        match kind {
            FailureKind::Build | FailureKind::Timeout | FailureKind::Connect => false,
            FailureKind::Other => is_idempotent(method),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

fn is_idempotent(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
        Method::TRACE,
    ]
    .contains(method)
}
