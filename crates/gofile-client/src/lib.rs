//! # Gofile Client SDK
//!
//! A client for the Gofile file-hosting HTTP API.
//!
//! ## Features
//!
//! - **Typed endpoints**: every operation maps to one method returning a typed payload
//! - **Envelope handling**: the `{status, data}` wrapper is unwrapped in one place
//! - **Staged uploads**: bodies are assembled in memory or in a temp file
//! - **Progress**: upload callbacks see `(total, sent)` as bytes go out
//!
//! ## Example
//!
//! ```rust,ignore
//! use gofile_client::{progress_callback, Config, GofileClient, StagingStrategy};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GofileClient::new(Config::default().with_token("your-token"))?;
//!
//!     let account = client.get_account_details().await?;
//!     let server = client.get_server().await?;
//!
//!     let upload = client
//!         .upload_path(
//!             &server,
//!             &account.root_folder,
//!             "photo.png",
//!             &StagingStrategy::temp_file(),
//!             Some(progress_callback(|total, sent| println!("{}/{}", sent, total))),
//!         )
//!         .await?;
//!     println!("Download page: {}", upload.download_page);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod envelope;
mod error;
mod multipart;
mod progress;
mod staging;
mod types;
mod upload;

pub use client::GofileClient;
pub use config::{Config, DEFAULT_API_ENDPOINT, DEFAULT_HOST};
pub use envelope::{decode_data, decode_envelope};
pub use error::{ClientError, Result};
pub use multipart::{encode_form, EncodedForm, FILE_FIELD};
pub use progress::{progress_callback, ProgressCallback, ProgressReader, UploadProgress};
pub use staging::{SealedStaging, StagingBuffer, StagingReader, StagingStrategy, TEMP_FILE_PREFIX};
pub use types::*;
