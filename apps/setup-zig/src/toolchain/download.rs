//! HTTP archive download.
//!
//! Archives are streamed to a temporary file next to the destination and
//! renamed into place once complete, so an interrupted run never leaves a
//! truncated archive behind under the final name. Downloads are attempted
//! once; a failed download fails the run.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::SetupError;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// User-Agent header for HTTP requests.
const USER_AGENT: &str = concat!("setup-zig/", env!("CARGO_PKG_VERSION"));

/// Minimum interval between progress log lines in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 1000;

/// Builds the HTTP client used for archive downloads.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

/// Downloads `url` to `dest` and returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if:
/// - The request fails or the server answers with a non-success status
/// - The destination file cannot be created or written
pub async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    let temp_path = dest.with_extension("part");

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    match stream_to_file(client, url, &temp_path).await {
        Ok(downloaded) => {
            tokio::fs::rename(&temp_path, dest).await.with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    temp_path.display(),
                    dest.display()
                )
            })?;
            Ok(downloaded)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(e)
        }
    }
}

/// Streams a response body into `dest`.
async fn stream_to_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    if !response.status().is_success() {
        return Err(SetupError::download_error(format!("HTTP {}: {url}", response.status())).into());
    }

    let total_size = response.content_length().unwrap_or(0);
    debug!(%url, total = %format_bytes(total_size), "downloading archive");

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let mut last_update = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Failed to read chunk from {url}"))?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write to {}", dest.display()))?;
        downloaded += chunk.len() as u64;

        if last_update.elapsed().as_millis() >= PROGRESS_INTERVAL_MS {
            debug!(
                downloaded = %format_bytes(downloaded),
                total = %format_bytes(total_size),
                "download progress"
            );
            last_update = Instant::now();
        }
    }

    file.flush()
        .await
        .with_context(|| format!("Failed to flush {}", dest.display()))?;

    debug!(%url, size = %format_bytes(downloaded), "download complete");
    Ok(downloaded)
}

/// Formats bytes into a human-readable string (KB, MB, GB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
