//! S3 URI parsing

/// Parsed components of an S3 object address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Url {
    pub bucket: String,
    pub key: String,
}

impl S3Url {
    /// Parse an S3 object address (supports s3:// and https:// formats)
    pub fn parse(url: &str) -> Option<Self> {
        // s3://bucket/key format
        if let Some(rest) = url.strip_prefix("s3://") {
            let parts: Vec<&str> = rest.splitn(2, '/').collect();
            return Some(S3Url {
                bucket: parts[0].to_string(),
                key: parts.get(1).unwrap_or(&"").to_string(),
            });
        }

        // https://bucket.s3.region.amazonaws.com/key format
        if url.starts_with("https://") || url.starts_with("http://") {
            if let Ok(parsed) = url::Url::parse(url) {
                if let Some(host) = parsed.host_str() {
                    // Virtual-hosted style: bucket.s3.region.amazonaws.com
                    if host.contains(".s3.") && host.ends_with(".amazonaws.com") {
                        let bucket = host.split(".s3.").next()?;
                        let key = parsed.path().trim_start_matches('/');
                        return Some(S3Url {
                            bucket: bucket.to_string(),
                            key: key.to_string(),
                        });
                    }
                    // Path style: s3.region.amazonaws.com/bucket/key
                    if host.starts_with("s3.") && host.ends_with(".amazonaws.com") {
                        let path = parsed.path().trim_start_matches('/');
                        let parts: Vec<&str> = path.splitn(2, '/').collect();
                        return Some(S3Url {
                            bucket: parts[0].to_string(),
                            key: parts.get(1).unwrap_or(&"").to_string(),
                        });
                    }
                }
            }
        }

        None
    }

    /// Whether both bucket and key are present
    pub fn is_complete(&self) -> bool {
        !self.bucket.is_empty() && !self.key.is_empty()
    }

    /// Last component of the key, used to name the downloaded file
    pub fn file_name(&self) -> &str {
        self.key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.key)
    }

    /// Convert to s3:// URL format
    pub fn to_s3_url(&self) -> String {
        if self.key.is_empty() {
            format!("s3://{}", self.bucket)
        } else {
            format!("s3://{}/{}", self.bucket, self.key)
        }
    }
}

impl std::fmt::Display for S3Url {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_s3_url())
    }
}
