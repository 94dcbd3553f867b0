//! Read remote files as local ones
//!
//! This crate wraps an S3 object (or an http(s) URL) in a [`File`] that
//! downloads the content to a uniquely named temporary file on
//! construction and removes it again when the wrapper is dropped. A local
//! path is passed through unchanged.
//!
//! Credentials come from an [`S3ClientConfig`]: an AWS profile, explicit
//! keys, an assume-role ARN, or - when nothing is set - the SDK's default
//! resolution chain. Credential acquisition is retried a bounded number of
//! times on retrieval errors; request-level retries are delegated to the
//! SDK's own retry configuration.

pub mod error;
pub mod file;
mod http;
pub mod s3;

pub use error::Error;
pub use file::File;
pub use s3::{S3Client, S3ClientConfig, S3Url};
