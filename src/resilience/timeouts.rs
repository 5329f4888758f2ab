//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap client reads, upstream connects and writes with a deadline
//! - Map elapsed deadlines to errors distinct from other I/O failures
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` means no deadline; config maps `0` seconds to `None`

use std::future::Future;
use std::io;
use std::time::Duration;

use crate::proxy::ProxyError;

/// Run a pipeline stage under an optional deadline.
pub async fn with_deadline<F, T>(
    stage: &'static str,
    limit: Option<Duration>,
    fut: F,
) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, ProxyError>>,
{
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| ProxyError::Timeout { stage, after })?,
        None => fut.await,
    }
}

/// Run a single I/O operation under an optional deadline.
///
/// An elapsed deadline surfaces as `io::ErrorKind::TimedOut`, so callers can
/// treat it like any other failure of that operation.
pub async fn with_io_deadline<F, T>(limit: Option<Duration>, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match limit {
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(res) => res,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no progress within {}ms", after.as_millis()),
            )),
        },
        None => fut.await,
    }
}
