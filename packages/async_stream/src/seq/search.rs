//! Terminal combinators that scan a sequence for an answer.

use super::{array, LazySeq};
use crate::cursor::Cursor;
use crate::error::Result;
use std::fmt::Display;
use std::future::Future;

impl<T> LazySeq<T> {
    /// First element matching `f`, or `None` once exhausted.
    pub async fn find<F>(self, mut f: F) -> Result<Option<T>>
    where
        F: FnMut(&T, usize) -> bool,
    {
        let mut cursor = Cursor::new(self.source);
        while let Some((i, value)) = cursor.next().await? {
            if f(&value, i) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Index of the first element matching `f`.
    pub async fn find_index<F>(self, mut f: F) -> Result<Option<usize>>
    where
        F: FnMut(&T, usize) -> bool,
    {
        let mut cursor = Cursor::new(self.source);
        while let Some((i, value)) = cursor.next().await? {
            if f(&value, i) {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Like [`find`](Self::find) with an asynchronous predicate.
    pub async fn find_then<F, Fut>(self, mut f: F) -> Result<Option<T>>
    where
        F: FnMut(&T, usize) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut cursor = Cursor::new(self.source);
        while let Some((i, value)) = cursor.next().await? {
            if f(&value, i).await {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Like [`find_index`](Self::find_index) with an asynchronous predicate.
    pub async fn find_index_then<F, Fut>(self, mut f: F) -> Result<Option<usize>>
    where
        F: FnMut(&T, usize) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut cursor = Cursor::new(self.source);
        while let Some((i, value)) = cursor.next().await? {
            if f(&value, i).await {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    /// Whether every element satisfies `f`. Stops pulling at the first that
    /// does not.
    pub async fn every<F>(self, mut f: F) -> Result<bool>
    where
        F: FnMut(&T, usize) -> bool,
    {
        Ok(self.find_index(|value, i| !f(value, i)).await?.is_none())
    }

    /// Whether any element satisfies `f`. Stops pulling at the first that
    /// does.
    pub async fn some<F>(self, f: F) -> Result<bool>
    where
        F: FnMut(&T, usize) -> bool,
    {
        Ok(self.find_index(f).await?.is_some())
    }

    /// Run `f` on every element in order, for its side effects.
    pub async fn for_each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(T, usize),
    {
        let mut cursor = Cursor::new(self.source);
        while let Some((i, value)) = cursor.next().await? {
            f(value, i);
        }
        Ok(())
    }

    /// Position of the first element equal to `target` at or after `from`.
    ///
    /// A negative `from` counts back from the end, which needs the whole
    /// sequence: the source must be finite.
    pub async fn index_of(self, target: &T, from: isize) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        if from < 0 {
            let values = self.to_vec().await?;
            return Ok(array::index_of(&values, target, from));
        }
        let from = from.unsigned_abs();
        self.find_index(|value, i| i >= from && value == target).await
    }

    /// Whether `target` occurs at or after `from`; see
    /// [`index_of`](Self::index_of).
    pub async fn includes(self, target: &T, from: isize) -> Result<bool>
    where
        T: PartialEq,
    {
        Ok(self.index_of(target, from).await?.is_some())
    }

    /// Position of the last element equal to `target`, searching backwards
    /// from `from` (the last element when `None`). Always materializes.
    pub async fn last_index_of(self, target: &T, from: Option<isize>) -> Result<Option<usize>>
    where
        T: PartialEq,
    {
        let values = self.to_vec().await?;
        Ok(array::last_index_of(&values, target, from))
    }

    /// Every element's `Display` form, joined by `separator`. Always
    /// materializes.
    pub async fn join(self, separator: &str) -> Result<String>
    where
        T: Display,
    {
        let values = self.to_vec().await?;
        Ok(values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator))
    }
}

#[cfg(test)]
mod tests {
    use crate::{LazySeq, SeqError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn digits() -> LazySeq<u8> {
        LazySeq::from(vec![3, 1, 4, 1, 5, 9, 2, 6])
    }

    #[tokio::test]
    async fn test_find_and_find_index() {
        assert_eq!(digits().find(|v, _| *v > 4).await, Ok(Some(5)));
        assert_eq!(digits().find(|v, _| *v > 9).await, Ok(None));
        assert_eq!(digits().find_index(|v, _| *v == 1).await, Ok(Some(1)));
        assert_eq!(digits().find_index(|_, i| i == 8).await, Ok(None));
    }

    #[tokio::test]
    async fn test_async_predicates() {
        let over = |limit: u8| {
            move |v: &u8, _: usize| {
                let v = *v;
                async move { v > limit }
            }
        };
        assert_eq!(digits().find_then(over(4)).await, Ok(Some(5)));
        assert_eq!(digits().find_then(over(9)).await, Ok(None));
        assert_eq!(digits().find_index_then(over(5)).await, Ok(Some(5)));
        assert_eq!(digits().find_index_then(|_, i| async move { i == 8 }).await, Ok(None));
    }

    #[tokio::test]
    async fn test_every_and_some() {
        assert_eq!(digits().every(|v, _| *v < 10).await, Ok(true));
        assert_eq!(digits().every(|v, _| *v > 1).await, Ok(false));
        assert_eq!(digits().some(|v, _| *v == 9).await, Ok(true));
        assert_eq!(digits().some(|v, _| *v == 7).await, Ok(false));
        assert_eq!(LazySeq::<u8>::from(vec![]).every(|_, _| false).await, Ok(true));
    }

    #[tokio::test]
    async fn test_some_stops_pulling_at_match() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulled);
        let seq = LazySeq::from_iterator((0..).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(seq.some(|v, _| *v == 3).await, Ok(true));
        assert_eq!(pulled.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_for_each_visits_everything_in_order() {
        let mut seen = Vec::new();
        let done = digits().for_each(|v, i| seen.push((i, v))).await;
        assert_eq!(done, Ok(()));
        assert_eq!(seen.len(), 8);
        assert_eq!(seen[2], (2, 4));
    }

    #[tokio::test]
    async fn test_index_of_and_includes() {
        assert_eq!(digits().index_of(&1, 0).await, Ok(Some(1)));
        assert_eq!(digits().index_of(&1, 2).await, Ok(Some(3)));
        assert_eq!(digits().index_of(&1, -4).await, Ok(None));
        assert_eq!(digits().index_of(&6, -1).await, Ok(Some(7)));
        assert_eq!(digits().includes(&9, 0).await, Ok(true));
        assert_eq!(digits().includes(&9, 6).await, Ok(false));
        assert_eq!(digits().includes(&3, -100).await, Ok(true));
    }

    #[tokio::test]
    async fn test_last_index_of() {
        assert_eq!(digits().last_index_of(&1, None).await, Ok(Some(3)));
        assert_eq!(digits().last_index_of(&1, Some(2)).await, Ok(Some(1)));
        assert_eq!(digits().last_index_of(&1, Some(-6)).await, Ok(Some(1)));
        assert_eq!(digits().last_index_of(&7, None).await, Ok(None));
    }

    #[tokio::test]
    async fn test_join() {
        assert_eq!(digits().slice(0, 3).join(",").await, Ok("3,1,4".to_string()));
        assert_eq!(LazySeq::<u8>::from(vec![]).join("-").await, Ok(String::new()));
    }

    #[tokio::test]
    async fn test_search_surfaces_upstream_failure() {
        let seq = digits().try_map(|v, i| if i == 2 { Err("bad digit") } else { Ok(v) });
        assert_eq!(seq.find(|v, _| *v == 9).await, Err(SeqError::msg("bad digit")));
    }
}
