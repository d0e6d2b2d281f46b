//! File upload orchestration
//!
//! An upload stages the whole multipart body first (memory or temp file),
//! then streams it to the upload server through a [`ProgressReader`]. The
//! staging buffer is released when the call returns, on every path.

use crate::{
    envelope::decode_data,
    multipart::encode_form,
    progress::{ProgressCallback, ProgressReader},
    staging::{StagingBuffer, StagingStrategy},
    types::FileUpload,
    ClientError, GofileClient, Result,
};
use reqwest::{header, Body};
use std::path::Path;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, warn};

impl GofileClient {
    /// Upload one file to `server` (as returned by [`GofileClient::get_server`]).
    ///
    /// `reader` is read to the end into a staging buffer chosen by
    /// `strategy`; `on_progress` then sees `(total, sent)` as the transport
    /// reads the body.
    #[instrument(skip(self, reader, strategy, on_progress))]
    pub async fn upload_file<R>(
        &self,
        server: &str,
        folder_id: &str,
        file_name: &str,
        reader: &mut R,
        strategy: &StagingStrategy,
        on_progress: Option<ProgressCallback>,
    ) -> Result<FileUpload>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let url = self.config().upload_url(server);
        let form = encode_form(
            self.http(),
            &url,
            StagingBuffer::init(strategy)?,
            file_name,
            reader,
            &[("folderId", folder_id), ("token", self.token())],
        )
        .await?;
        let content_type = form.content_type;

        let mut staging = form.staging.seal().await?;
        let total = staging.total();
        debug!(file_size = form.file_size, total, "Staged upload body");

        let body = ProgressReader::new(staging.take_reader()?, total, on_progress);
        debug!("Sending POST request to {}", url);

        let req = self
            .http()
            .post(&url)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, total)
            .body(Body::wrap_stream(ReaderStream::new(body)));

        let result = match self.execute(req).await {
            Ok(body) => decode_data::<FileUpload>(&body),
            Err(e) => Err(e),
        };

        if let Err(e) = staging.close() {
            warn!("Failed to dispose staging buffer: {}", e);
        }

        if let Ok(upload) = &result {
            debug!(file_id = %upload.file_id, "Upload complete");
        }
        result
    }

    /// Upload a local file, named after the last path component
    #[instrument(skip(self, path, strategy, on_progress), fields(file = %path.as_ref().display()))]
    pub async fn upload_path(
        &self,
        server: &str,
        folder_id: &str,
        path: impl AsRef<Path>,
        strategy: &StagingStrategy,
        on_progress: Option<ProgressCallback>,
    ) -> Result<FileUpload> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::InvalidArgument(format!("not a file path: {}", path.display()))
            })?;

        let mut file = tokio::fs::File::open(path).await.map_err(ClientError::Io)?;
        self.upload_file(server, folder_id, file_name, &mut file, strategy, on_progress)
            .await
    }
}
