use std::future::IntoFuture;

use futures::{FutureExt, future::BoxFuture};

use crate::{error::AccountError, executor::UiExecutor};

/// A deferred chain of work. Nothing runs until the task is awaited or spawned.
///
/// Bodies added with [`AsyncTask::run_async`] and [`AsyncTask::then_run_async`] run on the tokio
/// blocking pool since account operations block on network I/O. An error short-circuits every
/// later `then_*` stage and is handed to the completion hook, if any.
#[must_use = "tasks do nothing unless awaited or spawned"]
pub struct AsyncTask<T = ()> {
    future: BoxFuture<'static, Result<T, AccountError>>,
}

impl<T: Send + 'static> AsyncTask<T> {
    pub fn run_async<F>(body: F) -> Self
    where
        F: FnOnce() -> Result<T, AccountError> + Send + 'static,
    {
        Self {
            future: run_blocking(body).boxed(),
        }
    }

    pub fn ready(result: Result<T, AccountError>) -> Self {
        Self {
            future: futures::future::ready(result).boxed(),
        }
    }

    /// Runs `body` with the upstream value, only if the upstream stages succeeded.
    pub fn then_run_async<U, F>(self, body: F) -> AsyncTask<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U, AccountError> + Send + 'static,
    {
        AsyncTask {
            future: async move {
                let value = self.future.await?;
                run_blocking(move || body(value)).await
            }
            .boxed(),
        }
    }

    /// Continues with a task chosen from the upstream value, only if the upstream stages succeeded.
    pub fn then_compose_async<U, F>(self, factory: F) -> AsyncTask<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> AsyncTask<U> + Send + 'static,
    {
        AsyncTask {
            future: async move {
                let value = self.future.await?;
                factory(value).future.await
            }
            .boxed(),
        }
    }

    /// Runs `handler` exactly once on `executor` after the chain terminates.
    ///
    /// The handler receives the error that ended the chain. A cancellation is reported as no
    /// error, while the returned task still resolves to [`AccountError::Cancelled`].
    pub fn when_complete<F>(self, executor: &UiExecutor, handler: F) -> AsyncTask<T>
    where
        F: FnOnce(Option<&AccountError>) + Send + 'static,
    {
        let executor = executor.clone();
        AsyncTask {
            future: async move {
                let (value, error) = match self.future.await {
                    Ok(value) => (Some(value), None),
                    Err(error) => (None, Some(error)),
                };

                let error = executor
                    .run(move || {
                        handler(error.as_ref().filter(|error| !error.is_cancellation()));
                        error
                    })
                    .await?;

                match (value, error) {
                    (Some(value), _) => Ok(value),
                    (None, Some(error)) => Err(error),
                    (None, None) => Err(AccountError::Interrupted),
                }
            }
            .boxed(),
        }
    }

    /// Spawns the chain on the current tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<T, AccountError>> {
        tokio::spawn(self.future)
    }
}

impl<T: Send + 'static> IntoFuture for AsyncTask<T> {
    type Output = Result<T, AccountError>;
    type IntoFuture = BoxFuture<'static, Result<T, AccountError>>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}

async fn run_blocking<T, F>(body: F) -> Result<T, AccountError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AccountError> + Send + 'static,
{
    match tokio::task::spawn_blocking(body).await {
        Ok(result) => result,
        Err(error) => {
            log::error!("Background task failed: {error}");
            Err(AccountError::Interrupted)
        },
    }
}
