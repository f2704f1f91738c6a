//! Runtime glue for fire-and-forget async work
//!
//! Work is spawned on whatever tokio runtime the caller is running in. The
//! session never blocks on it; results come back through a channel.

use crate::{MapError, Result};
use std::future::Future;

/// Handle to a spawned async task
#[derive(Debug)]
pub struct TaskHandle(tokio::task::JoinHandle<()>);

impl TaskHandle {
    /// Check if the task is finished
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    /// Cancel the task
    pub fn cancel(&self) {
        self.0.abort();
    }
}

/// True when called from inside a tokio runtime
pub fn has_runtime() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

/// Spawn a detached future on the current tokio runtime
pub fn spawn<F>(future: F) -> Result<TaskHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::runtime::Handle::try_current()
        .map_err(|e| MapError::Runtime(format!("no async runtime available: {}", e)))?;
    Ok(TaskHandle(handle.spawn(future)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_without_runtime_fails() {
        assert!(!has_runtime());
        assert!(spawn(async {}).is_err());
    }

    #[tokio::test]
    async fn test_spawn_runs_future() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        spawn(async move {
            let _ = tx.send(42);
        })
        .unwrap();

        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_cancelled_task_never_reports() {
        let (tx, rx) = tokio::sync::oneshot::channel::<u8>();
        let handle = spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            let _ = tx.send(1);
        })
        .unwrap();

        handle.cancel();

        assert!(rx.await.is_err());
    }
}
