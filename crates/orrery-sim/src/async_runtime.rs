//! Binds the engine's task spawning to the Tokio runtime.
//!
//! reqwest needs a Tokio reactor, so model downloads run on the runtime the
//! binary starts in `main`.

use std::future::Future;

use orrery_place::TaskSpawner;
use tokio::runtime::Handle;

/// Spawns background tasks onto a Tokio runtime.
///
/// Tasks return nothing; results come back through `async_channel` and are
/// polled once per frame.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Spawner for the runtime the caller is running in.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawned_task_reports_through_channel() {
        let spawner = TokioSpawner::current();
        let (tx, rx) = async_channel::bounded(1);
        spawner.spawn(async move {
            let _ = tx.send(42).await;
        });
        assert_eq!(rx.recv().await.unwrap(), 42);
    }
}
