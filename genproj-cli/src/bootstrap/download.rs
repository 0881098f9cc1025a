//! Streaming archive download with progress reporting

use crate::error::{RequestSnafu, ResponseBodySnafu, Result, WriteArchiveSnafu};
use snafu::ResultExt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// Bytes written to disk per buffered flush
pub const CHUNK_SIZE: usize = 8192;

/// Progress of a single download
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    pub bytes_downloaded: u64,
    /// From the Content-Length header, when the server sent one
    pub total_bytes: Option<u64>,
    /// `None` unless the total is known and non-zero
    pub percent: Option<f64>,
}

impl DownloadProgress {
    pub fn new(bytes_downloaded: u64, total_bytes: Option<u64>) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let percent = total_bytes
            .filter(|total| *total > 0)
            .map(|total| (bytes_downloaded as f64 / total as f64) * 100.0);

        Self {
            bytes_downloaded,
            total_bytes,
            percent,
        }
    }
}

/// Download `url` to `dest`, invoking `on_progress` after every chunk
///
/// There is no timeout and no retry. A partially written file is removed when
/// the transfer fails. Returns the number of bytes written.
pub async fn download_file<F>(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    mut on_progress: F,
) -> Result<u64>
where
    F: FnMut(&DownloadProgress),
{
    debug!("Downloading {} to {}", url, dest.display());

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .context(RequestSnafu { url })?;

    let total_bytes = response.content_length();
    debug!("Content-Length: {:?}", total_bytes);

    let result = stream_to_file(response, url, dest, total_bytes, &mut on_progress).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(dest).await;
    }
    result
}

async fn stream_to_file<F>(
    mut response: reqwest::Response,
    url: &str,
    dest: &Path,
    total_bytes: Option<u64>,
    on_progress: &mut F,
) -> Result<u64>
where
    F: FnMut(&DownloadProgress),
{
    let file = File::create(dest)
        .await
        .context(WriteArchiveSnafu { path: dest })?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut bytes_downloaded: u64 = 0;

    while let Some(chunk) = response.chunk().await.context(ResponseBodySnafu { url })? {
        writer
            .write_all(&chunk)
            .await
            .context(WriteArchiveSnafu { path: dest })?;
        bytes_downloaded += chunk.len() as u64;
        on_progress(&DownloadProgress::new(bytes_downloaded, total_bytes));
    }

    writer
        .flush()
        .await
        .context(WriteArchiveSnafu { path: dest })?;

    debug!(
        "Download complete: {} bytes written to {}",
        bytes_downloaded,
        dest.display()
    );
    Ok(bytes_downloaded)
}
