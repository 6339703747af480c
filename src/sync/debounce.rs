use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Cancellation handle for a task started by [`schedule`].
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Stop the task if it has not finished. Returns `true` if it was still
    /// pending.
    pub fn cancel(self) -> bool {
        let pending = !self.handle.is_finished();
        self.handle.abort();
        pending
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Run `task` once after `delay`.
///
/// The delay is the only cancellable part: keep `task` itself short and
/// non-blocking (e.g. a channel send) so cancelling never splits it.
pub fn schedule<F>(delay: Duration, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    TaskHandle {
        handle: tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }),
    }
}

/// Trailing debounce: at most one outstanding task, replaced on every call.
#[derive(Debug)]
pub struct DebounceTimer {
    delay: Duration,
    pending: Option<TaskHandle>,
}

impl DebounceTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any outstanding task and start the quiescence window over with `task`.
    pub fn reschedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            tracing::trace!(delay_ms = self.delay.as_millis(), "Debounce window restarted");
        }
        self.pending = Some(schedule(self.delay, task));
    }

    /// Drop the outstanding task. Returns `true` if one had not fired yet.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some_and(TaskHandle::cancel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
