//! Plain HTTP/HTTPS downloads
//!
//! Used for http(s) inputs that are not S3 object URLs; those go through
//! the SDK instead.

use std::path::Path;

use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Fetch `url` and stream the response body into `dest`
///
/// A non-success HTTP status is a download failure, not a silent empty
/// file. Returns the number of bytes written.
pub(crate) async fn download_to_file(url: &str, dest: &Path) -> Result<u64> {
    let mut response = reqwest::get(url).await.map_err(|err| Error::Download {
        url: url.to_string(),
        source: err.into(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Download {
            url: url.to_string(),
            source: format!("HTTP status {status}").into(),
        });
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await.map_err(|err| Error::Download {
        url: url.to_string(),
        source: err.into(),
    })? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::debug!(url, bytes = written, "downloaded file over http");
    Ok(written)
}
