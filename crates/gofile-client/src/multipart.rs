//! Upload form encoding into a staging buffer
//!
//! The form is built with `reqwest::multipart`. Its body is drained frame
//! by frame into a [`StagingBuffer`] while the file part is fed from the
//! caller's reader, so the source is never held in memory as a whole.

use crate::{staging::StagingBuffer, ClientError, Result};
use bytes::Bytes;
use futures::stream;
use http_body_util::BodyExt;
use reqwest::multipart::{Form, Part};
use reqwest::{header, header::HeaderValue, Body, Client};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

/// Form field carrying the file content
pub const FILE_FIELD: &str = "file";

const CHUNK_SIZE: usize = 64 * 1024;

/// An upload form encoded into a staging buffer
pub struct EncodedForm {
    /// `Content-Type` of the encoded body, boundary included
    pub content_type: HeaderValue,
    /// Bytes read from the file source
    pub file_size: u64,
    /// The still writable buffer holding the whole body
    pub staging: StagingBuffer,
}

/// Encode a `multipart/form-data` upload form into `staging`.
///
/// The file part comes first and is read from `reader` to the end; each of
/// `fields` follows as a text part. `url` is only used to build the request
/// the body is taken from.
///
/// A failing `reader` yields [`ClientError::Io`]; a failing buffer yields
/// [`ClientError::StagingIo`].
pub async fn encode_form<R>(
    http: &Client,
    url: &str,
    staging: StagingBuffer,
    file_name: &str,
    reader: &mut R,
    fields: &[(&'static str, &str)],
) -> Result<EncodedForm>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let (tx, rx) = mpsc::channel::<Bytes>(4);
    let content = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|chunk| (Ok::<_, io::Error>(chunk), rx))
    });

    let file = Part::stream(Body::wrap_stream(content))
        .file_name(file_name.to_string())
        .mime_str("application/octet-stream")?;
    let form = fields
        .iter()
        .fold(Form::new().part(FILE_FIELD, file), |form, (name, value)| {
            form.text(*name, value.to_string())
        });

    let mut request = http.post(url).multipart(form).build()?;
    let content_type = request.headers().get(header::CONTENT_TYPE).cloned();
    let (content_type, body) = match (content_type, request.body_mut().take()) {
        (Some(content_type), Some(body)) => (content_type, body),
        _ => {
            return Err(ClientError::Config(
                "multipart request was built without a body".to_string(),
            ))
        }
    };

    let source = async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut copied = 0u64;
        loop {
            let n = reader.read(&mut buf).await.map_err(ClientError::Io)?;
            if n == 0 {
                break;
            }
            copied += n as u64;
            // Receiver gone: the sink failed and reports it
            if tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
                break;
            }
        }
        Ok::<_, ClientError>(copied)
    };

    let sink = async move {
        let mut staging = staging;
        let mut body = std::pin::pin!(body);
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame?.into_data() {
                staging.write_all(&data).await?;
            }
        }
        staging.flush().await?;
        Ok::<_, ClientError>(staging)
    };

    let (source, sink) = tokio::join!(source, sink);
    let file_size = source?;
    let staging = sink?;

    Ok(EncodedForm {
        content_type,
        file_size,
        staging,
    })
}
