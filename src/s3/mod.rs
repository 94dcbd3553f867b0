//! S3 access module
//!
//! This module provides the AWS-facing half of the crate:
//! - [`client::S3Client`] - credential resolution, assume-role, downloads
//! - [`config::S3ClientConfig`] - credential and client parameters
//! - [`types::S3Url`] - S3 URI parsing

pub mod client;
pub mod config;
pub mod types;

// Re-export commonly used types
pub use client::S3Client;
pub use config::S3ClientConfig;
pub use types::S3Url;
