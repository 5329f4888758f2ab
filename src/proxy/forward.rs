//! Request forwarding.
//!
//! The request goes upstream exactly as received: the original request
//! line (origin-form or absolute-form) and the original Host header. Parsing
//! only decides where to connect.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::proxy::ProxyError;
use crate::resilience::with_deadline;

/// Write all of `request` to `upstream`, then flush.
pub async fn forward_request<W>(
    upstream: &mut W,
    request: &[u8],
    deadline: Option<Duration>,
) -> Result<(), ProxyError>
where
    W: AsyncWrite + Unpin,
{
    with_deadline("forward_request", deadline, async {
        upstream.write_all(request).await.map_err(ProxyError::Forward)?;
        upstream.flush().await.map_err(ProxyError::Forward)
    })
    .await?;

    tracing::trace!(bytes = request.len(), "Request forwarded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::AsyncReadExt;

    /// Accepts at most `max` bytes per write, then fails after `fail_after` bytes.
    struct Trickle {
        written: Vec<u8>,
        max: usize,
        fail_after: usize,
    }

    impl AsyncWrite for Trickle {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.written.len() >= self.fail_after {
                return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
            }
            let n = buf.len().min(self.max);
            self.written.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn loops_over_partial_writes() {
        let request = b"GET http://a.test/x HTTP/1.1\r\nHost: a.test\r\n\r\n";
        let mut upstream = Trickle {
            written: Vec::new(),
            max: 3,
            fail_after: usize::MAX,
        };
        forward_request(&mut upstream, request, None).await.unwrap();
        assert_eq!(upstream.written, request);
    }

    #[tokio::test]
    async fn write_failure_is_forward_error() {
        let mut upstream = Trickle {
            written: Vec::new(),
            max: 4,
            fail_after: 8,
        };
        let err = forward_request(&mut upstream, &[b'x'; 32], None).await.unwrap_err();
        assert!(matches!(err, ProxyError::Forward(_)));
    }

    /// Never accepts a byte.
    struct Stalled;

    impl AsyncWrite for Stalled {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Pending
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Pending
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_upstream_hits_write_deadline() {
        let deadline = Duration::from_secs(30);
        let request = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";
        let err = forward_request(&mut Stalled, request, Some(deadline))
            .await
            .unwrap_err();
        match err {
            ProxyError::Timeout { stage, after } => {
                assert_eq!(stage, "forward_request");
                assert_eq!(after, deadline);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bytes_arrive_verbatim() {
        let (mut near, mut far) = tokio::io::duplex(64);
        let request = b"GET / HTTP/1.1\r\nHost: a\r\nX: \xff\r\n\r\n";

        forward_request(&mut near, request, Some(Duration::from_secs(5)))
            .await
            .unwrap();
        drop(near);

        let mut received = Vec::new();
        far.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, request);
    }
}
