//! Upload progress reporting

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Progress callback, called with `(total, sent)` bytes
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Wrap a closure as a [`ProgressCallback`]
pub fn progress_callback<F>(f: F) -> ProgressCallback
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Upload progress information
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadProgress {
    /// Total bytes in the request body
    pub total: u64,
    /// Bytes handed to the transport so far
    pub sent: u64,
}

impl UploadProgress {
    /// Create a progress snapshot
    pub fn new(total: u64, sent: u64) -> Self {
        Self { total, sent }
    }

    /// Get percentage complete
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.sent as f64 / self.total as f64) * 100.0
    }

    /// Check if the whole body has been read
    pub fn is_complete(&self) -> bool {
        self.sent >= self.total
    }
}

/// Reader that reports every read to a progress callback.
///
/// The counter is updated before the callback runs, so the last call for a
/// fully consumed body sees `sent == total`. Read sizes are whatever the
/// transport asks for.
pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    sent: u64,
    on_progress: Option<ProgressCallback>,
}

impl<R> ProgressReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a new progress reader over `total` bytes
    pub fn new(inner: R, total: u64, on_progress: Option<ProgressCallback>) -> Self {
        Self {
            inner,
            total,
            sent: 0,
            on_progress,
        }
    }

    /// Bytes read so far
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Total bytes expected
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Get the current progress
    pub fn progress(&self) -> UploadProgress {
        UploadProgress::new(self.total, self.sent)
    }

    /// Unwrap the inner reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> AsyncRead for ProgressReader<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let initial_len = buf.filled().len();
        let this = &mut *self;

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let bytes_read = buf.filled().len() - initial_len;

                if bytes_read > 0 {
                    this.sent += bytes_read as u64;
                    if let Some(ref callback) = this.on_progress {
                        callback(this.total, this.sent);
                    }
                }

                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
