//! Cancellation utilities
//!
//! Provides cancellation handles for long-running remote calls.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. Futures wrapped with [`run_cancellable`] observing
    /// this handle resolve immediately and drop the in-flight request, which
    /// closes the underlying HTTP connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Drive `future` until it completes or `handle` is cancelled.
///
/// Cancellation wins if both are ready on the same poll.
pub async fn run_cancellable<F, T>(handle: CancelHandle, future: F) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>>,
{
    tokio::select! {
        biased;
        _ = handle.cancelled() => Err(LlmError::Cancelled("operation cancelled".to_string())),
        res = future => res,
    }
}

/// Create a standalone cancel handle that can be shared across tasks.
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_wakes_pending_future_immediately() {
        let cancel = new_cancel_handle();
        let waiter = tokio::spawn(run_cancellable(
            cancel.clone(),
            std::future::pending::<Result<(), LlmError>>(),
        ));

        // Give the task a chance to poll and block.
        tokio::task::yield_now().await;

        cancel.cancel();

        let out = tokio::time::timeout(std::time::Duration::from_millis(200), waiter)
            .await
            .expect("cancel should wake the waiting task")
            .expect("task ok");

        assert!(matches!(out, Err(LlmError::Cancelled(_))));
    }

    #[tokio::test]
    async fn completed_future_passes_through() {
        let cancel = new_cancel_handle();
        let out = run_cancellable(cancel.clone(), async { Ok::<_, LlmError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
        assert!(!cancel.is_cancelled());
    }
}
