//! Spawned task handles for the aseq generator bridge.
//!
//! An [`AsyncTask`] is a concrete, awaitable handle onto a future running on the
//! runtime. It resolves to the future's output, or to a [`TaskError`] when the
//! task never got to deliver one.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod error;
#[cfg(feature = "tokio")]
pub mod task;

pub use error::TaskError;
#[cfg(feature = "tokio")]
pub use task::AsyncTask;
