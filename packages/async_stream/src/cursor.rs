//! Positional consumption of a [`Source`].

use crate::error::Result;
use crate::source::Source;

/// Pairs a source with the index of the next element it will yield.
///
/// Combinators that hand `(value, i)` to a callback read through a cursor, so
/// indices always restart at zero for every traversal.
#[derive(Debug)]
pub struct Cursor<T> {
    source: Source<T>,
    index: usize,
}

impl<T> Cursor<T> {
    /// Start at index zero.
    pub fn new(source: Source<T>) -> Self {
        Self { source, index: 0 }
    }

    /// Next element with its index, or `None` once the source is exhausted.
    pub async fn next(&mut self) -> Result<Option<(usize, T)>> {
        match self.source.pull().await? {
            Some(value) => {
                let index = self.index;
                self.index += 1;
                Ok(Some((index, value)))
            }
            None => Ok(None),
        }
    }

    /// Number of elements yielded so far.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Give the source back.
    pub fn into_source(self) -> Source<T> {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cursor_counts_from_zero() {
        let mut cursor = Cursor::new(Source::from(vec!['a', 'b']));
        assert_eq!(cursor.next().await, Ok(Some((0, 'a'))));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.next().await, Ok(Some((1, 'b'))));
        assert_eq!(cursor.next().await, Ok(None));
        assert_eq!(cursor.position(), 2);
    }
}
