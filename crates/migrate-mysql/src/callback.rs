//! Completion-callback adapter
//!
//! Hosts that drive migrations through completion callbacks can wrap any
//! driver call instead of awaiting its result directly.

use std::future::Future;

use crate::error::DriverResult;

/// Await `operation` and hand its result to `callback`
pub async fn complete_with<T, R, Fut, F>(operation: Fut, callback: F) -> R
where
    Fut: Future<Output = DriverResult<T>>,
    F: FnOnce(DriverResult<T>) -> R,
{
    callback(operation.await)
}
