//! Lazy, single-consumption asynchronous sequences.
//!
//! The crate is built in three layers:
//! - [`Dispatcher`]: a push/pull rendezvous. Producers `dispatch`, consumers
//!   `pull`, and whichever side arrives first waits for the other.
//! - [`Source`]: one pull interface over streams, iterators, dispatchers and
//!   chains of those.
//! - [`LazySeq`]: chainable combinators over a source. Each combinator that
//!   yields a new sequence runs as a producer through [`bridge::spawn`].
//!
//! Runtime support is selected with the `tokio-backend` feature (on by
//! default). Without it only the error types are available.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod error;

#[cfg(feature = "tokio-backend")]
pub mod bridge;
#[cfg(feature = "tokio-backend")]
pub mod cursor;
#[cfg(feature = "tokio-backend")]
pub mod dispatcher;
#[cfg(feature = "tokio-backend")]
pub mod nested;
#[cfg(feature = "tokio-backend")]
pub mod seq;
#[cfg(feature = "tokio-backend")]
pub mod source;

pub use error::{Result, SeqError};

#[cfg(feature = "tokio-backend")]
pub use bridge::ProducerHandle;
#[cfg(feature = "tokio-backend")]
pub use cursor::Cursor;
#[cfg(feature = "tokio-backend")]
pub use dispatcher::{Dispatcher, Emitter, Pull, Terminal};
#[cfg(feature = "tokio-backend")]
pub use nested::{Nested, Tree};
#[cfg(feature = "tokio-backend")]
pub use seq::{from_iterator, to_array, LazySeq};
#[cfg(feature = "tokio-backend")]
pub use source::Source;
