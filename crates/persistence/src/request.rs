//! Per-call request context.
//!
//! Every asynchronous storage operation takes a [`RequestContext`] as its first
//! argument. The context carries the caller's cancellation signal, an optional
//! per-request timeout and an optional correlation id used in log events.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use storefront_persistence::request::RequestContext;
//!
//! let ctx = RequestContext::new()
//!     .with_timeout(Duration::from_secs(2))
//!     .with_correlation_id("checkout-42");
//!
//! assert_eq!(ctx.timeout(), Some(Duration::from_secs(2)));
//! assert_eq!(ctx.correlation_id(), Some("checkout-42"));
//! assert!(!ctx.is_cancelled());
//! ```

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{BackendError, StorageResult};

/// Cancellation, deadline and tracing information for one storage call.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    timeout: Option<Duration>,
    correlation_id: Option<String>,
}

impl RequestContext {
    /// Creates a context with a fresh cancellation token and no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the context to a caller-owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Sets a timeout that overrides the data context's default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a correlation id that is attached to log events.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Returns the cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns the per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the correlation id, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns `true` once the caller has cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Runs a backend call under this context.
    ///
    /// The call is raced against cancellation and against the request
    /// timeout, falling back to `default_timeout` when the request sets none.
    /// A call is never started once the context is already cancelled.
    pub async fn run<T, F>(
        &self,
        operation: &'static str,
        default_timeout: Option<Duration>,
        fut: F,
    ) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        if self.is_cancelled() {
            return Err(cancelled(operation));
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => Err(cancelled(operation)),
                result = fut => result,
            }
        };

        match self.timeout.or(default_timeout) {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation,
                        correlation_id = self.correlation_id(),
                        timeout_ms = limit.as_millis() as u64,
                        "storage operation timed out"
                    );
                    Err(BackendError::Timeout {
                        operation: operation.to_string(),
                        timeout_ms: limit.as_millis() as u64,
                    }
                    .into())
                }
            },
            None => guarded.await,
        }
    }
}

fn cancelled(operation: &str) -> crate::error::StorageError {
    BackendError::Cancelled {
        operation: operation.to_string(),
    }
    .into()
}
