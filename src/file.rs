//! Remote files as local paths
//!
//! [`File`] classifies its input as a local path, an S3 object, or an
//! http(s) URL. Remote content is downloaded into a uniquely named
//! temporary directory before the constructor returns; local paths pass
//! through untouched. The temporary directory lives exactly as long as
//! the wrapper.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::http;
use crate::s3::client::S3Client;
use crate::s3::config::S3ClientConfig;
use crate::s3::types::S3Url;

/// Where a path string points
#[derive(Debug)]
enum Location {
    Local(PathBuf),
    S3(S3Url),
    Http(String),
}

/// Classify a path string
///
/// An `s3:`-prefixed string that does not yield a non-empty bucket and key
/// is an input error, never a local path.
fn classify(path: &str) -> Result<Location> {
    if let Some(url) = S3Url::parse(path) {
        if !url.is_complete() {
            return Err(Error::Configuration(format!(
                "S3 URI must name a bucket and a key: {path}"
            )));
        }
        return Ok(Location::S3(url));
    }
    if path.starts_with("s3:") {
        return Err(Error::Configuration(format!("malformed S3 URI: {path}")));
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(Location::Http(path.to_string()));
    }
    Ok(Location::Local(PathBuf::from(path)))
}

/// Local file name for a downloaded URL: last non-empty path segment
fn http_file_name(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "download".to_string())
}

/// A possibly-remote file exposed as a local path
///
/// Construction downloads remote content before returning, so
/// [`path()`](File::path) is always readable. Dropping the wrapper removes
/// the temporary file, if one was created; local inputs are never touched.
///
/// ```no_run
/// # async fn example() -> Result<(), s3_reader::Error> {
/// let file = s3_reader::File::open("s3://my-bucket/data/input.csv").await?;
/// let bytes = std::fs::read(file.path())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct File {
    original: String,
    path: PathBuf,
    temp_dir: Option<TempDir>,
}

impl File {
    /// Open a path with default configuration
    pub async fn open(path: &str) -> Result<Self> {
        Self::open_inner(path, None, &S3ClientConfig::default()).await
    }

    /// Open a path with the given client configuration
    pub async fn open_with(path: &str, config: &S3ClientConfig) -> Result<Self> {
        Self::open_inner(path, None, config).await
    }

    /// Open a path, choosing the local name of the downloaded file
    ///
    /// By default the name is taken from the last component of the key or
    /// URL. The name is ignored for local inputs.
    pub async fn open_named(path: &str, file_name: &str, config: &S3ClientConfig) -> Result<Self> {
        Self::open_inner(path, Some(file_name), config).await
    }

    async fn open_inner(
        path: &str,
        file_name: Option<&str>,
        config: &S3ClientConfig,
    ) -> Result<Self> {
        match classify(path)? {
            Location::Local(local) => Ok(Self {
                original: path.to_string(),
                path: local,
                temp_dir: None,
            }),
            Location::S3(url) => {
                let client = S3Client::connect(config).await?;
                let temp_dir = TempDir::new()?;
                let name = file_name.unwrap_or_else(|| url.file_name());
                let dest = temp_dir.path().join(name);
                client.download_to_file(&url.bucket, &url.key, &dest).await?;
                Ok(Self {
                    original: path.to_string(),
                    path: dest,
                    temp_dir: Some(temp_dir),
                })
            }
            Location::Http(remote) => {
                let temp_dir = TempDir::new()?;
                let name = file_name
                    .map(str::to_string)
                    .unwrap_or_else(|| http_file_name(&remote));
                let dest = temp_dir.path().join(name);
                http::download_to_file(&remote, &dest).await?;
                Ok(Self {
                    original: path.to_string(),
                    path: dest,
                    temp_dir: Some(temp_dir),
                })
            }
        }
    }

    /// Locally readable path, valid for the wrapper's lifetime
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path string the wrapper was constructed with
    pub fn original_path(&self) -> &str {
        &self.original
    }

    /// Whether a temporary file was created for this wrapper
    pub fn is_temporary(&self) -> bool {
        self.temp_dir.is_some()
    }

    /// Remove the temporary file now, surfacing deletion errors
    ///
    /// Dropping the wrapper does the same removal best-effort. A directory
    /// that is already gone is not an error.
    pub fn cleanup(mut self) -> io::Result<()> {
        match self.temp_dir.take() {
            Some(temp_dir) => match temp_dir.close() {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.path().to_path_buf();
            if let Err(err) = temp_dir.close() {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %path.display(),
                        "failed to remove temporary directory: {err}"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_local_paths() {
        assert!(matches!(
            classify("/data/file.txt").unwrap(),
            Location::Local(_)
        ));
        assert!(matches!(
            classify("relative/file.txt").unwrap(),
            Location::Local(_)
        ));
        assert!(matches!(classify("file.txt").unwrap(), Location::Local(_)));
    }

    #[test]
    fn test_classify_s3_uri() {
        match classify("s3://bucket/path/key.bin").unwrap() {
            Location::S3(url) => {
                assert_eq!(url.bucket, "bucket");
                assert_eq!(url.key, "path/key.bin");
            }
            _ => panic!("expected S3 location"),
        }
    }

    #[test]
    fn test_classify_https_s3_url() {
        match classify("https://bucket.s3.us-east-1.amazonaws.com/key.bin").unwrap() {
            Location::S3(url) => {
                assert_eq!(url.bucket, "bucket");
                assert_eq!(url.key, "key.bin");
            }
            _ => panic!("expected S3 location"),
        }
    }

    #[test]
    fn test_classify_plain_http_url() {
        assert!(matches!(
            classify("https://example.com/data.csv").unwrap(),
            Location::Http(_)
        ));
    }

    #[test]
    fn test_classify_rejects_malformed_s3_uri() {
        // Never silently treated as a local path
        for path in ["s3://", "s3:///key", "s3://bucket", "s3://bucket/", "s3:bucket/key"] {
            let err = classify(path).unwrap_err();
            assert!(
                matches!(err, Error::Configuration(_)),
                "expected configuration error for {path:?}"
            );
        }
    }

    #[test]
    fn test_http_file_name() {
        assert_eq!(http_file_name("https://example.com/a/b/data.csv"), "data.csv");
        assert_eq!(
            http_file_name("https://example.com/data.csv?token=123"),
            "data.csv"
        );
        assert_eq!(http_file_name("https://example.com/"), "download");
    }

    #[tokio::test]
    async fn test_local_path_passes_through() {
        let file = File::open("some/local/file.txt").await.unwrap();
        assert_eq!(file.path(), Path::new("some/local/file.txt"));
        assert_eq!(file.original_path(), "some/local/file.txt");
        assert!(!file.is_temporary());
    }

    #[tokio::test]
    async fn test_local_file_untouched_after_drop() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("kept.txt");
        std::fs::write(&local, b"contents").unwrap();

        let path_str = local.to_str().unwrap().to_string();
        let file = File::open(&path_str).await.unwrap();
        assert_eq!(file.path(), local.as_path());
        drop(file);

        assert!(local.exists());
        assert_eq!(std::fs::read(&local).unwrap(), b"contents");
    }

    #[tokio::test]
    async fn test_malformed_uri_rejected_by_open() {
        let err = File::open("s3://bucket-without-key").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_drop_removes_temp_dir() {
        let temp_dir = TempDir::new().unwrap();
        let downloaded = temp_dir.path().join("object.bin");
        std::fs::write(&downloaded, b"payload").unwrap();

        let file = File {
            original: "s3://bucket/object.bin".to_string(),
            path: downloaded.clone(),
            temp_dir: Some(temp_dir),
        };
        assert!(file.is_temporary());
        drop(file);

        assert!(!downloaded.exists());
    }

    #[test]
    fn test_cleanup_reports_success() {
        let temp_dir = TempDir::new().unwrap();
        let downloaded = temp_dir.path().join("object.bin");
        std::fs::write(&downloaded, b"payload").unwrap();

        let file = File {
            original: "s3://bucket/object.bin".to_string(),
            path: downloaded.clone(),
            temp_dir: Some(temp_dir),
        };
        file.cleanup().unwrap();
        assert!(!downloaded.exists());
    }

    #[test]
    fn test_cleanup_ignores_already_gone() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path().to_path_buf();

        let file = File {
            original: "s3://bucket/object.bin".to_string(),
            path: dir_path.join("object.bin"),
            temp_dir: Some(temp_dir),
        };
        std::fs::remove_dir_all(&dir_path).unwrap();
        file.cleanup().unwrap();
    }

    #[test]
    fn test_cleanup_on_local_wrapper_is_noop() {
        let file = File {
            original: "file.txt".to_string(),
            path: PathBuf::from("file.txt"),
            temp_dir: None,
        };
        file.cleanup().unwrap();
    }
}
