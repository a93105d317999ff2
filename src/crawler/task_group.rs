//! A batch of spawned tasks that is always joined as a whole
//!
//! Tasks start running as soon as they are spawned. `join_all` waits for every
//! one of them and returns results in spawn order, regardless of which
//! finished first. Nothing is cancelled: a slow task still runs to completion
//! (or its own timeout) even if its result will be thrown away.

use futures::future::join_all;
use std::future::Future;
use tokio::task::JoinHandle;

pub struct TaskGroup<T> {
    handles: Vec<JoinHandle<T>>,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Starts a task immediately on the runtime
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.handles.push(tokio::spawn(task));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every task; one slot per task, in spawn order
    ///
    /// A task that panicked yields `None` in its slot.
    pub async fn join_all(self) -> Vec<Option<T>> {
        join_all(self.handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(slot, joined)| match joined {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Task {} did not complete: {}", slot, e);
                    None
                }
            })
            .collect()
    }
}

impl<T: Send + 'static> Default for TaskGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}
