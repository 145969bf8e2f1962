//! The chainable lazy sequence type.
//!
//! Every combinator that yields a new sequence runs as a producer through the
//! [generator bridge](crate::bridge) over the current one, so nothing is pulled
//! from upstream until the result is pulled. Combinators that need the whole
//! sequence at once (negative indices, `join`, `reduce_right`, ...) materialize
//! it first; those never finish on an unbounded source.

mod array;
mod fold;
mod search;
mod transform;

use crate::bridge;
use crate::dispatcher::{Dispatcher, Emitter};
use crate::error::{Result, SeqError};
use crate::source::Source;
use futures::stream::Stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A single-consumption, lazily produced asynchronous sequence.
///
/// Pulling advances the sequence permanently; a sequence cannot be shared
/// between two consumers. Dropping a sequence detaches whatever produces it.
pub struct LazySeq<T> {
    source: Source<T>,
}

impl<T> fmt::Debug for LazySeq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySeq").field("source", &self.source).finish()
    }
}

impl<T> LazySeq<T> {
    /// Wrap an existing source.
    pub fn from_source(source: Source<T>) -> Self {
        Self { source }
    }

    /// Unwrap into the underlying source.
    pub fn into_source(self) -> Source<T> {
        self.source
    }

    /// Pull the next value: `Ok(Some(v))`, `Ok(None)` when done, or the error
    /// that ended the sequence.
    pub async fn pull(&mut self) -> Result<Option<T>> {
        self.source.pull().await
    }

    /// Drain the sequence into a `Vec`, in order.
    pub async fn to_vec(mut self) -> Result<Vec<T>> {
        let mut values = Vec::new();
        while let Some(value) = self.source.pull().await? {
            values.push(value);
        }
        Ok(values)
    }
}

impl<T> LazySeq<T>
where
    T: Send + 'static,
{
    /// Adapt a synchronous iterator.
    pub fn from_iterator<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::from_source(Source::from_iter(iter))
    }

    /// Adapt an infallible stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self::from_source(Source::from_stream(stream))
    }

    /// Adapt a fallible stream; its first error ends the sequence.
    pub fn from_try_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<T, E>> + Send + 'static,
        E: Into<SeqError>,
    {
        Self::from_source(Source::from_try_stream(stream))
    }

    /// A sequence fed by `producer` through an [`Emitter`].
    ///
    /// The producer starts on the first pull. Returning `Ok(())` completes the
    /// sequence, returning an error fails it.
    ///
    /// ```no_run
    /// # async fn demo() -> aseq_async_stream::Result<()> {
    /// use aseq_async_stream::LazySeq;
    ///
    /// let seq = LazySeq::generate(|emitter| async move {
    ///     for word in ["lazy", "async"] {
    ///         emitter.emit(word).await?;
    ///     }
    ///     Ok(())
    /// });
    /// assert_eq!(seq.to_vec().await?, vec!["lazy", "async"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn generate<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(Emitter<T>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        bridge::spawn(producer).0
    }
}

impl LazySeq<usize> {
    /// `0, 1, ..., n - 1`.
    ///
    /// A negative `n` is a construction error.
    pub fn count(n: isize) -> Result<Self> {
        let n = usize::try_from(n)
            .map_err(|_| SeqError::Construction(format!("count must not be negative, got {n}")))?;
        Ok(Self::from_iterator(0..n))
    }
}

impl<T> Stream for LazySeq<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().source.poll_pull(cx).map(Result::transpose)
    }
}

impl<T> From<Source<T>> for LazySeq<T> {
    fn from(source: Source<T>) -> Self {
        Self::from_source(source)
    }
}

impl<T> From<Dispatcher<T>> for LazySeq<T> {
    fn from(dispatcher: Dispatcher<T>) -> Self {
        Self::from_source(Source::from(dispatcher))
    }
}

impl<T> From<Vec<T>> for LazySeq<T>
where
    T: Send + 'static,
{
    fn from(values: Vec<T>) -> Self {
        Self::from_iterator(values)
    }
}

/// Adapt a synchronous iterator into a [`LazySeq`].
pub fn from_iterator<I>(iter: I) -> LazySeq<I::Item>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    I::IntoIter: Send + 'static,
{
    LazySeq::from_iterator(iter)
}

/// Drain `seq` into a `Vec`.
pub async fn to_array<T>(seq: LazySeq<T>) -> Result<Vec<T>> {
    seq.to_vec().await
}
