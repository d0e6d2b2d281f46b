//! Upload staging buffers
//!
//! A multipart body is assembled into a staging buffer before it is sent,
//! so its exact length is known up front. Two backing stores are
//! available:
//!
//! - **Memory**: a growable byte vector
//! - **Temp file**: a uniquely named file in a chosen directory, removed
//!   when the buffer is disposed
//!
//! The lifecycle is encoded in the types:
//!
//! ```text
//! StagingBuffer::init ──> StagingBuffer (writable) ──seal──> SealedStaging ──close/drop──> disposed
//! ```
//!
//! Dropping either handle on any path (including errors) deletes the temp
//! file, so no artifact outlives the upload call.

use crate::{ClientError, Result};
use std::io::{self, Cursor, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tracing::{debug, warn};

/// File name prefix of temp-file staging buffers
pub const TEMP_FILE_PREFIX: &str = "gofile-staging-";

/// Where an upload body is staged
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StagingStrategy {
    /// Keep the whole body in memory
    #[default]
    Memory,
    /// Write the body to a temp file, in `dir` or the system temp directory
    TempFile { dir: Option<PathBuf> },
}

impl StagingStrategy {
    /// Temp file in the system temp directory
    pub fn temp_file() -> Self {
        Self::TempFile { dir: None }
    }

    /// Temp file in the given directory
    pub fn temp_file_in(dir: impl Into<PathBuf>) -> Self {
        Self::TempFile {
            dir: Some(dir.into()),
        }
    }

    /// Check if this strategy stages to disk
    pub fn is_temp_file(&self) -> bool {
        matches!(self, Self::TempFile { .. })
    }
}

enum Backing {
    Memory(Vec<u8>),
    TempFile { file: File, path: TempPath },
}

/// A writable, append-only staging buffer
pub struct StagingBuffer {
    backing: Backing,
    written: u64,
}

impl StagingBuffer {
    /// Allocate the backing store for `strategy`
    pub fn init(strategy: &StagingStrategy) -> Result<Self> {
        let backing = match strategy {
            StagingStrategy::Memory => Backing::Memory(Vec::new()),
            StagingStrategy::TempFile { dir } => {
                let mut builder = tempfile::Builder::new();
                builder.prefix(TEMP_FILE_PREFIX);
                let named = match dir {
                    Some(dir) => builder.tempfile_in(dir),
                    None => builder.tempfile(),
                }
                .map_err(ClientError::StagingInit)?;

                let (file, path) = named.into_parts();
                debug!(path = %path.display(), "Created staging file");
                Backing::TempFile {
                    file: File::from_std(file),
                    path,
                }
            }
        };

        Ok(Self { backing, written: 0 })
    }

    /// Bytes written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the staging file, if staged to disk
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Memory(_) => None,
            Backing::TempFile { path, .. } => Some(path),
        }
    }

    /// Finish writing and prepare the buffer for reading from offset 0
    pub async fn seal(self) -> Result<SealedStaging> {
        match self.backing {
            Backing::Memory(data) => {
                let total = data.len() as u64;
                Ok(SealedStaging {
                    reader: Some(StagingReader::Memory(Cursor::new(data))),
                    total,
                    path: None,
                })
            }
            Backing::TempFile { mut file, path } => {
                file.flush().await.map_err(ClientError::StagingSeal)?;
                file.sync_all().await.map_err(ClientError::StagingSeal)?;
                file.seek(SeekFrom::Start(0))
                    .await
                    .map_err(ClientError::StagingSeal)?;
                let total = file
                    .metadata()
                    .await
                    .map_err(ClientError::StagingSeal)?
                    .len();

                debug!(path = %path.display(), total, "Sealed staging file");
                Ok(SealedStaging {
                    reader: Some(StagingReader::File(file)),
                    total,
                    path: Some(path),
                })
            }
        }
    }
}

impl AsyncWrite for StagingBuffer {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = &mut *self;
        let poll = match &mut this.backing {
            Backing::Memory(data) => Pin::new(data).poll_write(cx, buf),
            Backing::TempFile { file, .. } => Pin::new(file).poll_write(cx, buf),
        };

        if let Poll::Ready(Ok(n)) = &poll {
            this.written += *n as u64;
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.backing {
            Backing::Memory(_) => Poll::Ready(Ok(())),
            Backing::TempFile { file, .. } => Pin::new(file).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.backing {
            Backing::Memory(_) => Poll::Ready(Ok(())),
            Backing::TempFile { file, .. } => Pin::new(file).poll_shutdown(cx),
        }
    }
}

/// Sequential reader over a sealed staging buffer
pub enum StagingReader {
    Memory(Cursor<Vec<u8>>),
    File(File),
}

impl AsyncRead for StagingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Memory(cursor) => Pin::new(cursor).poll_read(cx, buf),
            Self::File(file) => Pin::new(file).poll_read(cx, buf),
        }
    }
}

/// A read-only staging buffer with a known total size
pub struct SealedStaging {
    reader: Option<StagingReader>,
    total: u64,
    path: Option<TempPath>,
}

impl SealedStaging {
    /// Total bytes staged
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Path of the staging file, if staged to disk and not yet disposed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Take the reader positioned at offset 0. Only one reader exists per buffer.
    pub fn take_reader(&mut self) -> Result<StagingReader> {
        self.reader.take().ok_or_else(|| {
            ClientError::StagingIo(io::Error::new(
                io::ErrorKind::Other,
                "staging reader already taken",
            ))
        })
    }

    /// Release the buffer, deleting the staging file if there is one
    pub fn close(mut self) -> Result<()> {
        self.dispose()
    }

    fn dispose(&mut self) -> Result<()> {
        self.reader = None;
        if let Some(path) = self.path.take() {
            let shown = path.display().to_string();
            path.close()?;
            debug!(path = %shown, "Removed staging file");
        }
        Ok(())
    }
}

impl Drop for SealedStaging {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("Failed to remove staging file: {}", e);
        }
    }
}
