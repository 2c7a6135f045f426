//! Trailing debounce for input-driven actions.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delays a task until the input has been quiet for a fixed period.
///
/// Each [`call`](Debouncer::call) supersedes the pending one, so only the
/// last call within the quiet period runs. A task whose timer already fired
/// runs to completion.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Schedule `task` after the quiet period. Must be called inside a tokio runtime.
    pub fn call<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let quiet = self.quiet;

        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if generation.load(Ordering::SeqCst) == ticket {
                task.await;
            }
        })
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
