//! Runs a push-style producer against a fresh dispatcher and hands back the
//! pull side as a [`LazySeq`].
//!
//! The producer is spawned as its own task but does not start until the
//! returned sequence is first pulled. Its outcome decides the dispatcher's
//! terminal state: `Ok(())` closes it, `Err(e)` fails it with `e`, and a task
//! that is aborted or panics fails it with [`SeqError::Aborted`].

use crate::dispatcher::{Dispatcher, Emitter};
use crate::error::{Result, SeqError};
use crate::seq::LazySeq;
use crate::source::Source;
use aseq_async_task::{AsyncTask, TaskError};
use futures::ready;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Spawn `producer` and return the sequence it feeds plus a handle onto it.
///
/// `producer` receives the [`Emitter`] it pushes values through. It is called
/// immediately to build its future; the future itself runs once the sequence
/// is pulled from.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn spawn<T, F, Fut>(producer: F) -> (LazySeq<T>, ProducerHandle)
where
    T: Send + 'static,
    F: FnOnce(Emitter<T>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let dispatcher = Dispatcher::new();
    let emitter = dispatcher.emitter();
    let body = producer(emitter.clone());
    // Built outside the task so that aborting it before its first poll still
    // settles the dispatcher.
    let guard = Settle::new(emitter);

    let task = AsyncTask::from_future(async move {
        guard.demanded().await;
        if guard.is_detached() {
            log::debug!("producer dropped before first pull");
            return guard.settle(Err(SeqError::Detached));
        }
        let outcome = body.await;
        guard.settle(outcome)
    });

    (LazySeq::from_source(Source::from(dispatcher)), ProducerHandle { task })
}

/// Settles the dispatcher once, on completion or when dropped unsettled.
struct Settle<T> {
    emitter: Option<Emitter<T>>,
}

impl<T> Settle<T> {
    fn new(emitter: Emitter<T>) -> Self {
        Self {
            emitter: Some(emitter),
        }
    }

    async fn demanded(&self) {
        if let Some(emitter) = &self.emitter {
            emitter.demanded().await;
        }
    }

    fn is_detached(&self) -> bool {
        self.emitter.as_ref().map_or(true, Emitter::is_detached)
    }

    fn settle(mut self, outcome: Result<()>) -> Result<()> {
        if let Some(emitter) = self.emitter.take() {
            match &outcome {
                Ok(()) => emitter.close(),
                Err(_) if emitter.is_detached() => {
                    log::debug!("producer stopped: consumer detached");
                }
                Err(error) => emitter.fail(error.clone()),
            }
        }
        outcome
    }
}

impl<T> Drop for Settle<T> {
    fn drop(&mut self) {
        if let Some(emitter) = self.emitter.take() {
            log::debug!("producer task ended without settling its sequence");
            emitter.fail(SeqError::Aborted);
        }
    }
}

/// Awaitable, abortable handle onto a spawned producer.
///
/// Resolves to the producer's own outcome. Dropping the handle detaches the
/// producer; it keeps running as long as its sequence is consumed.
pub struct ProducerHandle {
    task: AsyncTask<Result<()>>,
}

impl ProducerHandle {
    /// Stop the producer at its next suspension point. The sequence then fails
    /// with [`SeqError::Aborted`].
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Whether the producer task has stopped running.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl fmt::Debug for ProducerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl Future for ProducerHandle {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let joined = ready!(Pin::new(&mut self.task).poll(cx));
        Poll::Ready(match joined {
            Ok(outcome) => outcome,
            Err(TaskError::Panicked(message)) => {
                Err(SeqError::msg(format!("producer panicked: {message}")))
            }
            Err(TaskError::Aborted | TaskError::Dropped) => Err(SeqError::Aborted),
        })
    }
}
