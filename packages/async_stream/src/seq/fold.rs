//! Folding a sequence down to a single value.

use super::LazySeq;
use crate::cursor::Cursor;
use crate::error::Result;
use std::future::Future;

impl<T> LazySeq<T> {
    /// Fold without a seed: the first element seeds the accumulator and `f`
    /// sees every later element along with its index. `None` for an empty
    /// sequence.
    pub async fn reduce<F>(self, mut f: F) -> Result<Option<T>>
    where
        F: FnMut(T, T, usize) -> T,
    {
        let mut cursor = Cursor::new(self.source);
        let Some((_, mut acc)) = cursor.next().await? else {
            return Ok(None);
        };
        while let Some((i, value)) = cursor.next().await? {
            acc = f(acc, value, i);
        }
        Ok(Some(acc))
    }

    /// Fold from `init`, front to back.
    pub async fn reduce_with<A, F>(self, init: A, mut f: F) -> Result<A>
    where
        F: FnMut(A, T, usize) -> A,
    {
        let mut cursor = Cursor::new(self.source);
        let mut acc = init;
        while let Some((i, value)) = cursor.next().await? {
            acc = f(acc, value, i);
        }
        Ok(acc)
    }

    /// Like [`reduce_with`](Self::reduce_with) with an asynchronous step.
    pub async fn reduce_with_then<A, F, Fut>(self, init: A, mut f: F) -> Result<A>
    where
        F: FnMut(A, T, usize) -> Fut,
        Fut: Future<Output = A>,
    {
        let mut cursor = Cursor::new(self.source);
        let mut acc = init;
        while let Some((i, value)) = cursor.next().await? {
            acc = f(acc, value, i).await;
        }
        Ok(acc)
    }

    /// [`reduce`](Self::reduce) from the back. `f` sees each element's
    /// position in reversed order. Materializes the sequence.
    pub async fn reduce_right<F>(self, mut f: F) -> Result<Option<T>>
    where
        F: FnMut(T, T, usize) -> T,
    {
        let mut values = self.to_vec().await?;
        values.reverse();
        let mut rest = values.into_iter().enumerate();
        let Some((_, mut acc)) = rest.next() else {
            return Ok(None);
        };
        for (i, value) in rest {
            acc = f(acc, value, i);
        }
        Ok(Some(acc))
    }

    /// [`reduce_with`](Self::reduce_with) from the back. Materializes the
    /// sequence.
    pub async fn reduce_right_with<A, F>(self, init: A, mut f: F) -> Result<A>
    where
        F: FnMut(A, T, usize) -> A,
    {
        let mut values = self.to_vec().await?;
        values.reverse();
        Ok(values
            .into_iter()
            .enumerate()
            .fold(init, |acc, (i, value)| f(acc, value, i)))
    }
}
