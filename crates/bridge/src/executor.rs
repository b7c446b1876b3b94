use std::{
    sync::Arc,
    thread::{self, ThreadId},
};

use futures::channel::oneshot;
use tokio::sync::mpsc;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("The UI executor has shut down")]
pub struct ExecutorClosed;

/// Single-threaded FIFO executor standing in for the UI thread.
///
/// Every closure submitted through [`UiExecutor::execute`] runs on the same dedicated thread,
/// in submission order. The thread exits once every handle has been dropped.
#[derive(Clone)]
pub struct UiExecutor {
    inner: Arc<UiExecutorInner>,
}

struct UiExecutorInner {
    sender: mpsc::UnboundedSender<Job>,
    thread_id: ThreadId,
}

impl UiExecutor {
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let handle = thread::Builder::new().name(name.to_owned()).spawn(move || {
            while let Some(job) = receiver.blocking_recv() {
                job();
            }
            log::debug!("UI executor thread finished");
        })?;

        Ok(Self {
            inner: Arc::new(UiExecutorInner {
                sender,
                thread_id: handle.thread().id(),
            }),
        })
    }

    pub fn execute(&self, job: impl FnOnce() + Send + 'static) {
        if self.inner.sender.send(Box::new(job)).is_err() {
            log::warn!("Dropping UI job, the executor has shut down");
        }
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }

    /// Runs `job` on the UI thread and resolves with its result.
    pub async fn run<R: Send + 'static>(
        &self,
        job: impl FnOnce() -> R + Send + 'static,
    ) -> Result<R, ExecutorClosed> {
        let (sender, receiver) = oneshot::channel();
        self.execute(move || {
            let _ = sender.send(job());
        });
        receiver.await.map_err(|_| ExecutorClosed)
    }

    /// Blocking variant of [`UiExecutor::run`] for background threads.
    ///
    /// Called from the UI thread itself the job runs inline, since queueing it would deadlock.
    pub fn run_blocking<R: Send + 'static>(
        &self,
        job: impl FnOnce() -> R + Send + 'static,
    ) -> Result<R, ExecutorClosed> {
        if self.is_ui_thread() {
            return Ok(job());
        }
        let (sender, receiver) = oneshot::channel();
        self.execute(move || {
            let _ = sender.send(job());
        });
        futures::executor::block_on(receiver).map_err(|_| ExecutorClosed)
    }

    /// Resolves once every job queued before this call has run.
    pub async fn flush(&self) {
        let _ = self.run(|| ()).await;
    }
}

impl std::fmt::Debug for UiExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiExecutor").field("thread_id", &self.inner.thread_id).finish()
    }
}
