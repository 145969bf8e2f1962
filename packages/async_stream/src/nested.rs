//! Element types that [`LazySeq::flat`] can descend into.

use crate::seq::LazySeq;
use crate::source::Source;

/// A value that may itself be a source of values of the same type.
///
/// `flat` asks every element whether it nests: `Ok(source)` is descended into,
/// `Err(self)` hands the element back to be yielded unchanged.
pub trait Nested: Sized + Send + 'static {
    /// Split into the nested source, or give `self` back if it is a leaf.
    fn into_nested(self) -> std::result::Result<Source<Self>, Self>;
}

/// An arbitrarily deep mix of plain values, in-memory lists, and lazy
/// sequences.
///
/// Build literal trees with [`tree!`](crate::tree).
#[derive(Debug)]
pub enum Tree<T> {
    /// A plain value.
    Leaf(T),
    /// An in-memory list of subtrees.
    Branch(Vec<Tree<T>>),
    /// A lazily produced list of subtrees.
    Seq(Box<LazySeq<Tree<T>>>),
}

impl<T> Tree<T> {
    /// Wrap a plain value.
    pub fn leaf(value: T) -> Self {
        Self::Leaf(value)
    }

    /// Wrap a lazy sequence of subtrees.
    pub fn seq(seq: LazySeq<Tree<T>>) -> Self {
        Self::Seq(Box::new(seq))
    }

    /// The plain value, if this is a leaf.
    pub fn into_leaf(self) -> Option<T> {
        match self {
            Self::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Leaves and branches compare by content. A lazy sequence cannot be inspected
/// without consuming it, so it never equals anything.
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a == b,
            (Self::Branch(a), Self::Branch(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> From<LazySeq<Tree<T>>> for Tree<T> {
    fn from(seq: LazySeq<Tree<T>>) -> Self {
        Self::seq(seq)
    }
}

impl<T> From<Vec<Tree<T>>> for Tree<T> {
    fn from(children: Vec<Tree<T>>) -> Self {
        Self::Branch(children)
    }
}

impl<T> Nested for Tree<T>
where
    T: Send + 'static,
{
    fn into_nested(self) -> std::result::Result<Source<Self>, Self> {
        match self {
            Self::Branch(children) => Ok(Source::from(children)),
            Self::Seq(seq) => Ok((*seq).into_source()),
            leaf @ Self::Leaf(_) => Err(leaf),
        }
    }
}

/// Build a [`Tree`] from a bracketed literal.
///
/// Every bracketed group becomes a [`Tree::Branch`] and every other item, any
/// expression, a [`Tree::Leaf`]; the outermost list is itself a branch.
///
/// ```
/// use aseq_async_stream::{tree, Tree};
///
/// let t = tree![-1, [2, 3]];
/// assert_eq!(
///     t,
///     Tree::Branch(vec![
///         Tree::Leaf(-1),
///         Tree::Branch(vec![Tree::Leaf(2), Tree::Leaf(3)]),
///     ])
/// );
/// ```
#[macro_export]
macro_rules! tree {
    (@list ($($done:expr,)*)) => {
        $crate::Tree::Branch(vec![$($done),*])
    };
    (@list ($($done:expr,)*) [$($inner:tt)*] $(, $($rest:tt)*)?) => {
        $crate::tree!(@list ($($done,)* $crate::tree![$($inner)*],) $($($rest)*)?)
    };
    (@list ($($done:expr,)*) $leaf:expr $(, $($rest:tt)*)?) => {
        $crate::tree!(@list ($($done,)* $crate::Tree::Leaf($leaf),) $($($rest)*)?)
    };
    ($($item:tt)*) => {
        $crate::tree!(@list () $($item)*)
    };
}
