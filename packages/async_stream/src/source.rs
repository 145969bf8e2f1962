//! One pull interface over every kind of value source.
//!
//! A [`Source`] is validated once, when it is built, into one of four shapes:
//! an asynchronous stream, a synchronous iterator, a [`Dispatcher`], or an
//! ordered chain of nested sources. Every combinator consumes its input through
//! [`Source::pull`], which reports `Ok(Some(value))`, `Ok(None)` when the source
//! is exhausted, or the error that ended it.

use crate::dispatcher::{Dispatcher, Pull};
use crate::error::{Result, SeqError};
use crate::seq::LazySeq;
use futures::future::poll_fn;
use futures::stream::{BoxStream, Stream, StreamExt};
use futures::ready;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A single-consumption source of values.
pub struct Source<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Stream(BoxStream<'static, Result<T>>),
    Iter(Box<dyn Iterator<Item = T> + Send>),
    Dispatcher {
        dispatcher: Dispatcher<T>,
        pending: Option<Pull<T>>,
    },
    Chain(VecDeque<Source<T>>),
    Failed(SeqError),
}

impl<T> Unpin for Source<T> {}

impl<T> fmt::Debug for Source<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Stream(_) => f.write_str("Source::Stream"),
            Inner::Iter(_) => f.write_str("Source::Iter"),
            Inner::Dispatcher { dispatcher, .. } => {
                f.debug_tuple("Source::Dispatcher").field(dispatcher).finish()
            }
            Inner::Chain(parts) => f.debug_tuple("Source::Chain").field(parts).finish(),
            Inner::Failed(error) => f.debug_tuple("Source::Failed").field(error).finish(),
        }
    }
}

impl<T> Source<T>
where
    T: Send + 'static,
{
    /// Adapt a synchronous iterator; every pull advances it once.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Inner::Iter(Box::new(iter.into_iter().fuse())),
        }
    }

    /// Adapt an infallible asynchronous stream. Once it ends, every later pull
    /// reports completion without polling it again.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self {
            inner: Inner::Stream(stream.map(Ok).fuse().boxed()),
        }
    }

    /// Adapt a fallible asynchronous stream. The first `Err` ends the source.
    pub fn from_try_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<T, E>> + Send + 'static,
        E: Into<SeqError>,
    {
        Self {
            inner: Inner::Stream(stream.map(|item| item.map_err(Into::into)).fuse().boxed()),
        }
    }

    /// Drain `parts` one after the other.
    pub fn chain<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Source<T>>,
    {
        Self {
            inner: Inner::Chain(parts.into_iter().collect()),
        }
    }

    /// A source holding exactly `value`.
    pub fn once(value: T) -> Self {
        Self::from_iter(std::iter::once(value))
    }

    /// An exhausted source.
    pub fn empty() -> Self {
        Self::from_iter(std::iter::empty())
    }
}

impl<T> Source<T> {
    /// Consume a dispatcher through its pull contract.
    pub fn from_dispatcher(dispatcher: Dispatcher<T>) -> Self {
        Self {
            inner: Inner::Dispatcher {
                dispatcher,
                pending: None,
            },
        }
    }

    /// Poll for the next value.
    pub fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<T>>> {
        match &mut self.inner {
            Inner::Stream(stream) => {
                let delivery = ready!(stream.poll_next_unpin(cx)).transpose();
                if let Err(error) = &delivery {
                    self.inner = Inner::Failed(error.clone());
                }
                Poll::Ready(delivery)
            }
            Inner::Iter(iter) => Poll::Ready(Ok(iter.next())),
            Inner::Dispatcher {
                dispatcher,
                pending,
            } => {
                let pull = pending.get_or_insert_with(|| dispatcher.pull());
                let delivery = ready!(Pin::new(pull).poll(cx));
                *pending = None;
                Poll::Ready(delivery)
            }
            Inner::Chain(parts) => loop {
                let Some(front) = parts.front_mut() else {
                    return Poll::Ready(Ok(None));
                };
                match ready!(front.poll_pull(cx)) {
                    Ok(None) => {
                        parts.pop_front();
                    }
                    delivery => return Poll::Ready(delivery),
                }
            },
            Inner::Failed(error) => Poll::Ready(Err(error.clone())),
        }
    }

    /// Pull the next value.
    pub async fn pull(&mut self) -> Result<Option<T>> {
        poll_fn(|cx| self.poll_pull(cx)).await
    }
}

impl<T> From<Dispatcher<T>> for Source<T> {
    fn from(dispatcher: Dispatcher<T>) -> Self {
        Self::from_dispatcher(dispatcher)
    }
}

impl<T> From<Vec<T>> for Source<T>
where
    T: Send + 'static,
{
    fn from(values: Vec<T>) -> Self {
        Self::from_iter(values)
    }
}

impl<T> From<VecDeque<T>> for Source<T>
where
    T: Send + 'static,
{
    fn from(values: VecDeque<T>) -> Self {
        Self::from_iter(values)
    }
}

impl<T, const N: usize> From<[T; N]> for Source<T>
where
    T: Send + 'static,
{
    fn from(values: [T; N]) -> Self {
        Self::from_iter(values)
    }
}

impl<T> From<Option<T>> for Source<T>
where
    T: Send + 'static,
{
    fn from(value: Option<T>) -> Self {
        Self::from_iter(value)
    }
}

impl<T> From<LazySeq<T>> for Source<T> {
    fn from(seq: LazySeq<T>) -> Self {
        seq.into_source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;

    async fn drain<T>(mut source: Source<T>) -> Result<Vec<T>> {
        let mut out = Vec::new();
        while let Some(v) = source.pull().await? {
            out.push(v);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_iter_source_completes_repeatedly() {
        let mut source = Source::from(vec![1, 2]);
        assert_eq!(source.pull().await, Ok(Some(1)));
        assert_eq!(source.pull().await, Ok(Some(2)));
        assert_eq!(source.pull().await, Ok(None));
        assert_eq!(source.pull().await, Ok(None));
    }

    #[tokio::test]
    async fn test_stream_sources() {
        let plain = Source::from_stream(stream::iter(vec!["a", "b"]));
        assert_eq!(drain(plain).await, Ok(vec!["a", "b"]));

        let mut failing = Source::from_try_stream(stream::iter(vec![Ok(1), Err("bad"), Ok(3)]));
        assert_eq!(failing.pull().await, Ok(Some(1)));
        assert_eq!(failing.pull().await, Err(SeqError::msg("bad")));
        assert_eq!(failing.pull().await, Err(SeqError::msg("bad")));
    }

    #[tokio::test]
    async fn test_finished_stream_is_not_polled_again() {
        let once = stream::unfold(false, |done| async move {
            if done {
                None
            } else {
                Some((0, true))
            }
        });
        let mut source = Source::from_stream(once);
        assert_eq!(source.pull().await, Ok(Some(0)));
        for _ in 0..3 {
            assert_eq!(source.pull().await, Ok(None));
        }

        let fallible = stream::unfold(0, |n| async move {
            (n < 1).then_some((Ok::<_, SeqError>(n), n + 1))
        });
        let mut source = Source::from_try_stream(fallible);
        assert_eq!(source.pull().await, Ok(Some(0)));
        assert_eq!(source.pull().await, Ok(None));
        assert_eq!(source.pull().await, Ok(None));
    }

    #[tokio::test]
    async fn test_dispatcher_source() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch(10);
        dispatcher.dispatch(11);
        dispatcher.close();
        assert_eq!(drain(Source::from(dispatcher)).await, Ok(vec![10, 11]));
    }

    #[tokio::test]
    async fn test_chain_drains_parts_in_order() {
        let chained = Source::chain(vec![
            Source::from(vec![1, 2]),
            Source::empty(),
            Source::once(3),
            Source::from([4, 5]),
        ]);
        assert_eq!(drain(chained).await, Ok(vec![1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn test_chain_stops_at_failed_part() {
        let dispatcher = Dispatcher::new();
        dispatcher.fail(SeqError::Aborted);
        let mut chained = Source::chain(vec![Source::once(1), Source::from(dispatcher), Source::once(2)]);
        assert_eq!(chained.pull().await, Ok(Some(1)));
        assert_eq!(chained.pull().await, Err(SeqError::Aborted));
        assert_eq!(chained.pull().await, Err(SeqError::Aborted));
    }
}
