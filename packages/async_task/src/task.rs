//! Awaitable handles onto spawned futures.
//!
//! This module provides the task primitive the generator bridge runs producers
//! on. It returns a concrete type instead of a boxed future, keeps the result
//! channel separate from the runtime's join handle, and exposes the join handle
//! only for cancellation and for explaining why no value arrived.

use crate::error::TaskError;
use futures::ready;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle onto a future running as its own cooperative task.
///
/// Awaiting the handle yields `Ok(output)` once the task finishes, or a
/// [`TaskError`] if it was aborted or panicked first. Dropping the handle
/// detaches the task; it keeps running to completion.
pub struct AsyncTask<T> {
    receiver: oneshot::Receiver<T>,
    handle: Option<JoinHandle<()>>,
    sender_gone: bool,
}

impl<T> AsyncTask<T>
where
    T: Send + 'static,
{
    /// Spawn `future` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like [`tokio::spawn`].
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let result = future.await;
            // The handle may have been dropped already; the task still ran.
            let _ = tx.send(result);
        });
        Self {
            receiver: rx,
            handle: Some(handle),
            sender_gone: false,
        }
    }

    /// An already completed task.
    pub fn from_value(value: T) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(value);
        Self {
            receiver: rx,
            handle: None,
            sender_gone: false,
        }
    }
}

impl<T> AsyncTask<T> {
    /// Cancel the task at its next suspension point.
    ///
    /// Awaiting the handle afterwards yields [`TaskError::Aborted`] unless the
    /// task had already finished.
    pub fn abort(&self) {
        if let Some(handle) = &self.handle {
            log::debug!("aborting spawned task");
            handle.abort();
        }
    }

    /// Whether the underlying task has stopped running.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl<T> Future for AsyncTask<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if !this.sender_gone {
            match Pin::new(&mut this.receiver).poll(cx) {
                Poll::Ready(Ok(value)) => return Poll::Ready(Ok(value)),
                Poll::Ready(Err(_)) => this.sender_gone = true,
                Poll::Pending => return Poll::Pending,
            }
        }

        // The sender was dropped without a value: ask the runtime why.
        let Some(handle) = this.handle.as_mut() else {
            return Poll::Ready(Err(TaskError::Dropped));
        };
        let joined = ready!(Pin::new(handle).poll(cx));
        this.handle = None;
        Poll::Ready(Err(match joined {
            Ok(()) => TaskError::Dropped,
            Err(e) if e.is_panic() => TaskError::Panicked(panic_message(e.into_panic())),
            Err(_) => TaskError::Aborted,
        }))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
    }
}
