//! Combinators that build a new sequence from the current one.

use super::{array, LazySeq};
use crate::cursor::Cursor;
use crate::error::{Result, SeqError};
use crate::dispatcher::Emitter;
use crate::nested::Nested;
use crate::source::Source;
use futures::future::{BoxFuture, FutureExt};
use std::convert::Infallible;
use std::future::Future;

impl<T> LazySeq<T>
where
    T: Send + 'static,
{
    /// `f(value, i)` for every element, in order.
    pub fn map<U, F>(self, mut f: F) -> LazySeq<U>
    where
        U: Send + 'static,
        F: FnMut(T, usize) -> U + Send + 'static,
    {
        self.try_map(move |value, i| Ok::<_, Infallible>(f(value, i)))
    }

    /// Like [`map`](Self::map); the first `Err` from `f` fails the sequence.
    pub fn try_map<U, E, F>(self, mut f: F) -> LazySeq<U>
    where
        U: Send + 'static,
        E: Into<SeqError>,
        F: FnMut(T, usize) -> std::result::Result<U, E> + Send + 'static,
    {
        let mut cursor = Cursor::new(self.source);
        LazySeq::generate(move |emitter| async move {
            while let Some((i, value)) = cursor.next().await? {
                emitter.emit(f(value, i).map_err(Into::into)?).await?;
            }
            Ok(())
        })
    }

    /// Like [`try_map`](Self::try_map) with an asynchronous callback.
    pub fn then<U, E, F, Fut>(self, mut f: F) -> LazySeq<U>
    where
        U: Send + 'static,
        E: Into<SeqError>,
        F: FnMut(T, usize) -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<U, E>> + Send + 'static,
    {
        let mut cursor = Cursor::new(self.source);
        LazySeq::generate(move |emitter| async move {
            while let Some((i, value)) = cursor.next().await? {
                let mapped = f(value, i).await.map_err(Into::into)?;
                emitter.emit(mapped).await?;
            }
            Ok(())
        })
    }

    /// Keep the elements for which `f(&value, i)` holds.
    pub fn filter<F>(self, mut f: F) -> LazySeq<T>
    where
        F: FnMut(&T, usize) -> bool + Send + 'static,
    {
        self.flat_map(move |value, i| f(&value, i).then_some(value))
    }

    /// Like [`filter`](Self::filter) with an asynchronous predicate.
    ///
    /// The returned future cannot borrow the element; copy out what it needs.
    pub fn filter_then<F, Fut>(self, mut f: F) -> LazySeq<T>
    where
        F: FnMut(&T, usize) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let mut cursor = Cursor::new(self.source);
        LazySeq::generate(move |emitter| async move {
            while let Some((i, value)) = cursor.next().await? {
                if f(&value, i).await {
                    emitter.emit(value).await?;
                }
            }
            Ok(())
        })
    }

    /// Like [`filter`](Self::filter); the first `Err` from `f` fails the
    /// sequence.
    pub fn try_filter<E, F>(self, mut f: F) -> LazySeq<T>
    where
        E: Into<SeqError>,
        F: FnMut(&T, usize) -> std::result::Result<bool, E> + Send + 'static,
    {
        self.try_map(move |value, i| Ok::<_, E>(f(&value, i)?.then_some(value)))
            .flatten()
    }

    /// Map every element to a source and yield the sources' elements in turn.
    pub fn flat_map<U, S, F>(self, f: F) -> LazySeq<U>
    where
        U: Send + 'static,
        S: Into<Source<U>> + Send + 'static,
        F: FnMut(T, usize) -> S + Send + 'static,
    {
        self.map(f).flatten()
    }

    /// Flatten one level of typed nesting.
    pub fn flatten<U>(self) -> LazySeq<U>
    where
        U: Send + 'static,
        T: Into<Source<U>>,
    {
        let mut outer = self.source;
        LazySeq::generate(move |emitter| async move {
            while let Some(inner) = outer.pull().await? {
                let mut inner: Source<U> = inner.into();
                while let Some(value) = inner.pull().await? {
                    emitter.emit(value).await?;
                }
            }
            Ok(())
        })
    }

    /// `(i, value)` pairs.
    pub fn entries(self) -> LazySeq<(usize, T)> {
        self.map(|value, i| (i, value))
    }

    /// The index of every element.
    pub fn keys(self) -> LazySeq<usize> {
        self.map(|_, i| i)
    }

    /// The sequence itself.
    pub fn values(self) -> LazySeq<T> {
        self
    }

    /// This sequence's elements, then every element of each item in order.
    ///
    /// Single values go in as `Some(value)` or [`Source::once`].
    pub fn concat<I, S>(self, items: I) -> LazySeq<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source<T>>,
    {
        let parts = std::iter::once(self.source).chain(items.into_iter().map(Into::into));
        LazySeq::from_source(Source::chain(parts))
    }

    /// Hand the sequence to `f` and treat its result as a sequence.
    pub fn pipe<U, R, F>(self, f: F) -> LazySeq<U>
    where
        F: FnOnce(Self) -> R,
        R: Into<LazySeq<U>>,
    {
        f(self).into()
    }

    /// Elements with index in `start..end`; `isize::MAX` means "to the end".
    ///
    /// Non-negative bounds stream and stop pulling at `end`. A negative bound
    /// counts from the end and materializes the whole sequence first.
    pub fn slice(self, start: isize, end: isize) -> LazySeq<T> {
        if start < 0 || end < 0 {
            let seq = self;
            return LazySeq::generate(move |emitter| async move {
                let values = array::slice(seq.to_vec().await?, start, end);
                emit_all(&emitter, values).await
            });
        }

        let (start, end) = (start.unsigned_abs(), end.unsigned_abs());
        let mut cursor = Cursor::new(self.source);
        LazySeq::generate(move |emitter| async move {
            while cursor.position() < end {
                let Some((i, value)) = cursor.next().await? else {
                    break;
                };
                if i >= start {
                    emitter.emit(value).await?;
                }
            }
            Ok(())
        })
    }

    /// Replace the elements with index in `start..end` by `value`.
    ///
    /// Negative bounds materialize, as with [`slice`](Self::slice).
    pub fn fill(self, value: T, start: isize, end: isize) -> LazySeq<T>
    where
        T: Clone,
    {
        if start < 0 || end < 0 {
            let seq = self;
            return LazySeq::generate(move |emitter| async move {
                let mut values = seq.to_vec().await?;
                array::fill(&mut values, &value, start, end);
                emit_all(&emitter, values).await
            });
        }

        let (start, end) = (start.unsigned_abs(), end.unsigned_abs());
        self.map(move |current, i| {
            if i >= start && i < end {
                value.clone()
            } else {
                current
            }
        })
    }
}

impl<T> LazySeq<T>
where
    T: Nested,
{
    /// Descend into nested elements up to `depth` levels, depth first.
    ///
    /// Elements that do not nest are yielded unchanged at any depth; a depth
    /// of zero yields the sequence as it is.
    pub fn flat(self, depth: usize) -> LazySeq<T> {
        if depth == 0 {
            return self;
        }
        let source = self.source;
        LazySeq::generate(move |emitter| descend(source, depth, emitter))
    }
}

fn descend<T: Nested>(
    mut source: Source<T>,
    depth: usize,
    emitter: Emitter<T>,
) -> BoxFuture<'static, Result<()>> {
    async move {
        while let Some(value) = source.pull().await? {
            if depth == 0 {
                emitter.emit(value).await?;
                continue;
            }
            match value.into_nested() {
                Ok(inner) => descend(inner, depth - 1, emitter.clone()).await?,
                Err(value) => emitter.emit(value).await?,
            }
        }
        Ok(())
    }
    .boxed()
}

async fn emit_all<T>(emitter: &Emitter<T>, values: Vec<T>) -> Result<()> {
    for value in values {
        emitter.emit(value).await?;
    }
    Ok(())
}
