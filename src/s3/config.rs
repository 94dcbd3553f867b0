//! S3 client configuration
//!
//! An immutable bag of optional credential and client parameters. Unset
//! fields fall back to the AWS SDK's default resolution chain (environment
//! variables, shared config files, instance metadata).

use aws_config::retry::{RetryConfig, RetryMode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Session name used for assume-role when none is given
pub const DEFAULT_SESSION_NAME: &str = "s3_reader";

/// Default retry mode for individual client requests
pub const DEFAULT_RETRY_MODE: &str = "standard";

/// Default maximum request attempts made by the client
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default maximum credential-acquisition trials
pub const DEFAULT_MAX_TRIALS: u32 = 10;

/// Configuration for building an [`S3Client`](crate::S3Client)
///
/// `retry_mode` and `max_attempts` govern the client's own retries of
/// individual network requests; `max_trials` bounds how many times the
/// whole credential acquisition is retried when the credential chain
/// reports a retrieval error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3ClientConfig {
    /// AWS profile name from the shared config files
    pub profile_name: Option<String>,
    /// Explicit access key id (must be paired with `secret_access_key`)
    pub access_key_id: Option<String>,
    /// Explicit secret access key (must be paired with `access_key_id`)
    pub secret_access_key: Option<String>,
    /// Session token accompanying explicit credentials
    pub session_token: Option<String>,
    /// AWS region
    pub region: Option<String>,
    /// Role ARN; when set, credentials are exchanged via STS assume-role
    pub role_arn: Option<String>,
    /// Session name recorded on the assume-role exchange
    pub session_name: String,
    /// Request retry mode: "standard" or "adaptive"
    pub retry_mode: String,
    /// Maximum attempts per request made by the client
    pub max_attempts: u32,
    /// Maximum credential-acquisition trials
    pub max_trials: u32,
    /// Custom endpoint (e.g. MinIO); unset for AWS
    pub endpoint_url: Option<String>,
    /// Use path-style addressing, required by most custom endpoints
    pub force_path_style: bool,
}

impl Default for S3ClientConfig {
    fn default() -> Self {
        Self {
            profile_name: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            region: None,
            role_arn: None,
            session_name: DEFAULT_SESSION_NAME.to_string(),
            retry_mode: DEFAULT_RETRY_MODE.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_trials: DEFAULT_MAX_TRIALS,
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl S3ClientConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AWS profile name
    pub fn with_profile(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    /// Set explicit static credentials
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set the session token accompanying explicit credentials
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Set the AWS region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a role ARN to assume before issuing requests
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Set the assume-role session name
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    /// Set the request retry mode ("standard" or "adaptive")
    pub fn with_retry_mode(mut self, retry_mode: impl Into<String>) -> Self {
        self.retry_mode = retry_mode.into();
        self
    }

    /// Set the maximum attempts per request
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the maximum credential-acquisition trials
    pub fn with_max_trials(mut self, max_trials: u32) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// Set a custom endpoint URL and switch to path-style addressing
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self.force_path_style = true;
        self
    }

    /// Build the SDK retry configuration from `retry_mode` + `max_attempts`
    pub(crate) fn retry_config(&self) -> Result<RetryConfig> {
        let mode: RetryMode = self
            .retry_mode
            .parse()
            .map_err(|_| Error::Configuration(format!("unknown retry mode: {}", self.retry_mode)))?;
        let config = match mode {
            RetryMode::Adaptive => RetryConfig::adaptive(),
            _ => RetryConfig::standard(),
        };
        Ok(config.with_max_attempts(self.max_attempts))
    }

    /// Check that the supplied parameters are mutually consistent
    pub(crate) fn validate(&self) -> Result<()> {
        self.retry_config()?;
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(Error::Configuration(
                "access_key_id and secret_access_key must be supplied together".to_string(),
            ));
        }
        if let Some(arn) = &self.role_arn {
            if !arn.starts_with("arn:") {
                return Err(Error::Configuration(format!("malformed role ARN: {arn}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = S3ClientConfig::default();
        assert!(config.profile_name.is_none());
        assert!(config.access_key_id.is_none());
        assert!(config.secret_access_key.is_none());
        assert!(config.session_token.is_none());
        assert!(config.region.is_none());
        assert!(config.role_arn.is_none());
        assert_eq!(config.session_name, "s3_reader");
        assert_eq!(config.retry_mode, "standard");
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.max_trials, 10);
        assert!(config.endpoint_url.is_none());
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_config_builders() {
        let config = S3ClientConfig::new()
            .with_profile("production")
            .with_region("eu-west-1")
            .with_role_arn("arn:aws:iam::123456789012:role/Reader")
            .with_session_name("nightly-batch")
            .with_retry_mode("adaptive")
            .with_max_attempts(3)
            .with_max_trials(5);

        assert_eq!(config.profile_name, Some("production".to_string()));
        assert_eq!(config.region, Some("eu-west-1".to_string()));
        assert_eq!(
            config.role_arn,
            Some("arn:aws:iam::123456789012:role/Reader".to_string())
        );
        assert_eq!(config.session_name, "nightly-batch");
        assert_eq!(config.retry_mode, "adaptive");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_trials, 5);
    }

    #[test]
    fn test_config_endpoint_implies_path_style() {
        let config = S3ClientConfig::new().with_endpoint_url("http://localhost:9000");
        assert_eq!(
            config.endpoint_url,
            Some("http://localhost:9000".to_string())
        );
        assert!(config.force_path_style);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(S3ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_retry_mode() {
        let config = S3ClientConfig::new().with_retry_mode("aggressive");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("aggressive"));
    }

    #[test]
    fn test_validate_rejects_unpaired_keys() {
        let mut config = S3ClientConfig::new();
        config.access_key_id = Some("AKIDEXAMPLE".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_malformed_role_arn() {
        let config = S3ClientConfig::new().with_role_arn("not-an-arn");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("not-an-arn"));
    }

    #[test]
    fn test_retry_mode_is_case_insensitive() {
        let config = S3ClientConfig::new().with_retry_mode("Standard");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = S3ClientConfig::new()
            .with_credentials("access_key", "secret_key")
            .with_region("us-east-1");

        let json = serde_json::to_string(&config).unwrap();
        let parsed: S3ClientConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.access_key_id, config.access_key_id);
        assert_eq!(parsed.secret_access_key, config.secret_access_key);
        assert_eq!(parsed.region, config.region);
        assert_eq!(parsed.session_name, "s3_reader");
    }

    #[test]
    fn test_config_partial_deserialization() {
        // Missing fields fall back to defaults
        let json = r#"{"region": "ap-northeast-1"}"#;
        let config: S3ClientConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.region, Some("ap-northeast-1".to_string()));
        assert_eq!(config.max_trials, 10);
        assert_eq!(config.retry_mode, "standard");
    }
}
