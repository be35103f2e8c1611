//! Re-raising errors after an asynchronous hop.
//!
//! An encode or decode call is synchronous, but the caller may await it
//! from a task that is resumed on another worker. The helpers here rebuild
//! the error on the awaiting side with [`SerialError::recover`]: the result
//! has the same kind and message, and keeps the original as its cause.
//!
//! # Examples
//!
//! ```
//! use futures_lite::future::block_on;
//! use sf_serial::{SerialError, SerialErrorKind, recovery};
//!
//! let result: Result<(), _> = block_on(recovery::offload(|| {
//!     Err(SerialError::missing_fields("Project", vec!["name".into()]))
//! }));
//!
//! let error = result.unwrap_err();
//! assert_eq!(error.kind(), SerialErrorKind::MissingField);
//! assert_eq!(error.cause().unwrap().message(), error.message());
//! ```

use alloc::format;
use core::future::Future;
use std::thread;

use crate::{SerialError, SerialResult};

/// Recovers the error of `result`, if any.
pub fn recover<T>(result: SerialResult<T>) -> SerialResult<T> {
    result.map_err(|error| {
        log::debug!("recovering {:?} error: {}", error.kind(), error.message());
        error.recover()
    })
}

/// Awaits `future` and recovers its error at the await point.
pub async fn recovering<T, F>(future: F) -> SerialResult<T>
where
    F: Future<Output = SerialResult<T>>,
{
    recover(future.await)
}

/// Runs `job` on a dedicated thread and awaits its result.
///
/// The result comes back over a channel and its error, if any, is recovered
/// on the awaiting side. A job that panics, or a thread that cannot be
/// spawned, yields a [`Serialization`](SerialError::Serialization) error.
pub async fn offload<T, F>(job: F) -> SerialResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SerialResult<T> + Send + 'static,
{
    let (sender, receiver) = async_channel::bounded(1);

    let spawned = thread::Builder::new()
        .name("sf-offload".into())
        .spawn(move || {
            // The receiver may be gone if the awaiting future was dropped.
            let _ = sender.send_blocking(job());
        });
    if let Err(error) = spawned {
        return Err(SerialError::serialization(format!(
            "Failed to spawn the offload thread: {error}"
        )));
    }

    match receiver.recv().await {
        Ok(result) => recover(result),
        Err(_) => Err(SerialError::serialization(
            "The offload thread stopped before producing a result",
        )),
    }
}
