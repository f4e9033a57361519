//! Lookahead Slot
//!
//! Single-slot pipeline stage holding at most one in-flight task. The rank
//! session uses it to prefetch the snapshot for the next token while the
//! current token's analysis is being submitted.
//!
//! The task runs on the tokio runtime as soon as it is issued. A panicked or
//! aborted task surfaces as `None` from `take`. Dropping the slot aborts
//! whatever is still in flight.

use std::future::Future;

use tokio::task::JoinHandle;

pub struct Lookahead<T> {
    in_flight: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> Lookahead<T> {
    pub fn new() -> Self {
        Self { in_flight: None }
    }

    /// Start `task` in the slot. Anything already in flight is aborted.
    pub fn issue<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.cancel();
        self.in_flight = Some(tokio::spawn(task));
    }

    /// Wait for the in-flight task and empty the slot.
    ///
    /// Returns `None` when the slot is empty or the task did not complete
    /// (panic or abort).
    pub async fn take(&mut self) -> Option<T> {
        let handle = self.in_flight.take()?;
        match handle.await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Lookahead task did not complete: {}", e);
                None
            }
        }
    }

    /// Abort the in-flight task, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl<T: Send + 'static> Default for Lookahead<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Lookahead<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_take_empty_slot() {
        let mut slot: Lookahead<u32> = Lookahead::new();
        assert_eq!(slot.take().await, None);
    }

    #[tokio::test]
    async fn test_issue_then_take() {
        let mut slot = Lookahead::new();
        slot.issue(async { 7u32 });
        assert_eq!(slot.take().await, Some(7));
        assert_eq!(slot.take().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_before_take() {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);

        let mut slot = Lookahead::new();
        slot.issue(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            flag.store(true, Ordering::SeqCst);
        });

        // The task makes progress while the caller does other work
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(slot.take().await, Some(()));
    }

    #[tokio::test]
    async fn test_panicked_task_yields_none() {
        let mut slot: Lookahead<u32> = Lookahead::new();
        let fail = true;
        slot.issue(async move {
            if fail {
                panic!("boom");
            }
            1u32
        });
        assert_eq!(slot.take().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_in_flight_task() {
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);

        {
            let mut slot = Lookahead::new();
            slot.issue(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                flag.store(true, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_then_take() {
        let mut slot = Lookahead::new();
        slot.issue(std::future::pending::<u32>());
        slot.cancel();
        assert_eq!(slot.take().await, None);
    }
}
