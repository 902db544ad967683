//! Timeout utilities for resource fetches
//!
//! Wraps operations in the configured [`WaitPolicy`]. A disabled policy never
//! times out.

use std::future::Future;
use tokio::time::{error::Elapsed, timeout};

use crate::config::WaitPolicy;

/// Execute operation under a wait policy
pub async fn with_wait_policy<F, T>(policy: WaitPolicy, operation: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    match policy.limit() {
        Some(limit) => timeout(limit, operation).await,
        None => Ok(operation.await),
    }
}
