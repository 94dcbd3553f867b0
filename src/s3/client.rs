//! AWS S3 client wrapper
//!
//! [`S3Client::connect`] turns an [`S3ClientConfig`] into a ready client:
//! it loads the SDK configuration (default resolution chain for unset
//! fields), forces credential resolution, performs the STS assume-role
//! exchange when a role ARN is configured, and retries the whole
//! acquisition a bounded number of times on credential-retrieval errors.

use std::future::Future;
use std::path::Path;
use std::time::{Duration, SystemTime};

use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sdk_sts::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sts::operation::assume_role::AssumeRoleError;
use tokio::io::AsyncWriteExt;

use crate::error::{is_credential_error, BoxError, Error, Result};
use crate::s3::config::S3ClientConfig;

/// Pause between credential-acquisition trials
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Outcome of a single acquisition attempt
enum AttemptError {
    /// Credential-retrieval failure; retry up to `max_trials`
    Retryable(BoxError),
    /// Credential failure that retrying cannot fix (e.g. access denied)
    Denied(BoxError),
    /// Not a credential problem; propagate as-is
    Fatal(Error),
}

/// S3 client with credentials already resolved
///
/// Owned by the [`File`](crate::File) that requested it; clients are not
/// shared or cached across wrappers.
#[derive(Debug)]
pub struct S3Client {
    client: aws_sdk_s3::Client,
    region: String,
}

impl S3Client {
    /// Build a client from the given configuration
    ///
    /// Fails with [`Error::Configuration`] on mutually inconsistent
    /// parameters and [`Error::Credential`] once `max_trials` acquisition
    /// attempts have been exhausted.
    pub async fn connect(config: &S3ClientConfig) -> Result<Self> {
        config.validate()?;
        with_credential_retry(config.max_trials, || Self::try_connect(config)).await
    }

    /// One full acquisition attempt: load config, resolve credentials,
    /// assume the role if requested, build the client.
    async fn try_connect(config: &S3ClientConfig) -> std::result::Result<Self, AttemptError> {
        let base = Self::base_config(config).await.map_err(AttemptError::Fatal)?;

        // Resolve eagerly so an unusable credential chain surfaces here,
        // inside the bounded retry, instead of at the first request.
        resolve_credentials(&base).await?;

        let sdk_config = match &config.role_arn {
            Some(role_arn) => Self::assume_role(config, &base, role_arn).await?,
            None => base,
        };

        Ok(Self::from_sdk_config(config, &sdk_config))
    }

    /// Shared loader: region, retry configuration, custom endpoint
    fn loader(config: &S3ClientConfig) -> Result<ConfigLoader> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(config.retry_config()?);
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        Ok(loader)
    }

    /// Load the base SDK configuration from profile / static keys; unset
    /// fields fall back to the SDK's default resolution chain.
    async fn base_config(config: &S3ClientConfig) -> Result<SdkConfig> {
        let mut loader = Self::loader(config)?;
        if let Some(profile) = &config.profile_name {
            loader = loader.profile_name(profile);
        }
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                config.session_token.clone(),
                None,
                "s3-reader-config",
            ));
        }
        Ok(loader.load().await)
    }

    /// Exchange the base credentials for temporary role credentials and
    /// rebuild the SDK configuration from them. The base configuration is
    /// discarded; requests only ever see the assumed credentials.
    async fn assume_role(
        config: &S3ClientConfig,
        base: &SdkConfig,
        role_arn: &str,
    ) -> std::result::Result<SdkConfig, AttemptError> {
        let sts = aws_sdk_sts::Client::new(base);
        let output = sts
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(config.session_name.clone())
            .send()
            .await
            .map_err(classify_assume_role_error)?;

        let creds = output.credentials().ok_or_else(|| {
            AttemptError::Retryable("assume-role response contained no credentials".into())
        })?;
        let expiry = SystemTime::try_from(creds.expiration().to_owned()).ok();
        let assumed = Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            expiry,
            "s3-reader-assume-role",
        );
        tracing::debug!(role_arn, "assumed role for S3 access");

        let loader = Self::loader(config)
            .map_err(AttemptError::Fatal)?
            .credentials_provider(assumed);
        Ok(loader.load().await)
    }

    /// Build the S3 client itself from a fully resolved SDK configuration
    fn from_sdk_config(config: &S3ClientConfig, sdk_config: &SdkConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());

        Self { client, region }
    }

    /// Download an object, streaming its body into `dest`
    ///
    /// Returns the number of bytes written. Request-level retries are the
    /// SDK's business, governed by the configured retry mode and
    /// max-attempts.
    pub async fn download_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64> {
        let url = format!("s3://{bucket}/{key}");
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Error::Download {
                url: url.clone(),
                source: err.into(),
            })?;

        let mut body = response.body;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = body.try_next().await.map_err(|err| Error::Download {
            url: url.clone(),
            source: err.into(),
        })? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(%url, bytes = written, "downloaded object");
        Ok(written)
    }

    /// Region the client was resolved against
    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Force resolution of the configured credential chain
async fn resolve_credentials(sdk_config: &SdkConfig) -> std::result::Result<(), AttemptError> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| AttemptError::Retryable("no credentials provider configured".into()))?;
    provider
        .provide_credentials()
        .await
        .map_err(|err| AttemptError::Retryable(err.into()))?;
    Ok(())
}

/// Sort an assume-role failure into the retry taxonomy
fn classify_assume_role_error(err: SdkError<AssumeRoleError>) -> AttemptError {
    if is_credential_error(&err) {
        return AttemptError::Retryable(err.into());
    }
    match err.code() {
        Some("ValidationError") | Some("MalformedPolicyDocument") => {
            AttemptError::Fatal(Error::Configuration(format!(
                "assume-role rejected: {}",
                err.message().unwrap_or("invalid request")
            )))
        }
        _ => AttemptError::Denied(err.into()),
    }
}

/// Run `attempt` until it succeeds, a non-retryable error occurs, or
/// `max_trials` attempts have been made. Only credential-retrieval errors
/// are retried; at least one attempt is always made.
async fn with_credential_retry<T, F, Fut>(max_trials: u32, mut attempt: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let mut trials: u32 = 0;
    loop {
        trials += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(err)) => return Err(err),
            Err(AttemptError::Denied(source)) => return Err(Error::Credential { trials, source }),
            Err(AttemptError::Retryable(source)) => {
                if trials >= max_trials.max(1) {
                    return Err(Error::Credential { trials, source });
                }
                tracing::warn!(
                    trials,
                    max_trials,
                    "failed to retrieve AWS credentials, retrying"
                );
                tokio::time::sleep(RETRY_PAUSE).await;
            }
        }
    }
}
