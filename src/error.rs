//! Error taxonomy for this crate
//!
//! Three caller-visible failure classes: configuration problems that can
//! never succeed, credential acquisition failures, and download failures.
//! Temp-file and local I/O errors surface as [`Error::Io`].

use aws_credential_types::provider::error::CredentialsError;
use thiserror::Error;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias using this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by this library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The supplied parameters can never work: malformed S3 URI, unknown
    /// retry mode, mismatched key pair, malformed role ARN.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// AWS credentials could not be resolved. `trials` is the number of
    /// acquisition attempts actually made; the source is whichever error
    /// caused the final failing attempt.
    #[error("failed to resolve AWS credentials after {trials} trial(s)")]
    Credential {
        trials: u32,
        #[source]
        source: BoxError,
    },

    /// The object does not exist, access was denied, or the transfer failed.
    #[error("failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Local filesystem failure (temporary file creation, writes, cleanup).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Returns true if `err` (or anything in its source chain) is the SDK's
/// credential-retrieval error.
///
/// This is the predicate behind the bounded acquisition retry: only errors
/// in this class are retried, everything else propagates immediately.
pub fn is_credential_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<CredentialsError>() {
            return true;
        }
        current = e.source();
    }
    false
}
