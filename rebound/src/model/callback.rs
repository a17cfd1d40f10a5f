//! Callback form of model operations.
//!
//! Every operation returns a future; its `*_with` twin instead drives that
//! future on the ambient Tokio runtime and hands the result to a callback.

use std::future::Future;

use tokio::runtime::Handle;
use tracing::warn;

use crate::errors::ModelError;

/// Spawn `operation` and deliver its result to `callback`.
///
/// Without a runtime the callback is invoked immediately with
/// [`ModelError::Runtime`].
pub(crate) fn dispatch<T, F, C>(name: &'static str, operation: F, callback: C)
where
    T: Send + 'static,
    F: Future<Output = Result<T, ModelError>> + Send + 'static,
    C: FnOnce(Result<T, ModelError>) + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                callback(operation.await);
            });
        }
        Err(_) => {
            warn!(operation = name, "No async runtime available for callback");
            callback(Err(ModelError::runtime(format!(
                "no async runtime available to run {}",
                name
            ))));
        }
    }
}
