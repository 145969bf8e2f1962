//! # aseq
//!
//! Lazy asynchronous sequences with the combinators of a plain array.
//!
//! A producer pushes values into a [`Dispatcher`], consumers pull them back
//! out in the order they were pushed, and [`LazySeq`] chains combinators over
//! the pull side without materializing anything until it has to.
//!
//! ## Features
//!
//! - `tokio-backend` (default) - producers run as tokio tasks
//!
//! ## Example
//!
//! ```rust
//! use aseq::LazySeq;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> aseq::Result<()> {
//! let evens = LazySeq::count(10)?
//!     .filter(|v, _| v % 2 == 0)
//!     .map(|v, _| v * v);
//! assert_eq!(evens.to_vec().await?, vec![0, 4, 16, 36, 64]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use aseq_async_stream as stream;
pub use aseq_async_task as task;

pub use aseq_async_stream::{Result, SeqError};
pub use aseq_async_task::TaskError;

#[cfg(feature = "tokio-backend")]
pub use aseq_async_stream::{
    bridge, from_iterator, to_array, tree, Cursor, Dispatcher, Emitter, LazySeq, Nested,
    ProducerHandle, Pull, Source, Terminal, Tree,
};
#[cfg(feature = "tokio-backend")]
pub use aseq_async_task::AsyncTask;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
