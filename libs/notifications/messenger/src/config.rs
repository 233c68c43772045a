//! Provider configuration parsed from JSON blobs.
//!
//! ## Pinpoint (SMS)
//!
//! ```json
//! { "app_id": "A1", "access_key": "", "secret_key": "", "region": "us-east-1",
//!   "message_type": "TRANSACTIONAL", "sender_id": "ACME", "log": false }
//! ```
//!
//! ## SES (email)
//!
//! ```json
//! { "access_key": "", "secret_key": "", "region": "us-east-1", "log": false }
//! ```
//!
//! Static credentials are only used when both keys are set. Otherwise the
//! standard AWS credential chain applies (environment, shared profile, IAM role).

use crate::error::{MessengerError, MessengerResult};
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_sts::config::Credentials;
use serde::Deserialize;
use tracing::debug;

/// Retries performed by the SDK transport on top of the first attempt
pub const MAX_RETRIES: u32 = 3;

/// Name recorded as the source of static credentials
const CREDENTIALS_PROVIDER_NAME: &str = "messenger";

/// AWS access settings shared by every provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl AwsSettings {
    /// Static credentials, if both keys are present
    pub fn static_credentials(&self) -> Option<Credentials> {
        if self.access_key.is_empty() || self.secret_key.is_empty() {
            return None;
        }

        Some(Credentials::new(
            &self.access_key,
            &self.secret_key,
            None, // session token
            None, // expiry
            CREDENTIALS_PROVIDER_NAME,
        ))
    }

    /// Region override, if configured
    pub fn region(&self) -> Option<Region> {
        (!self.region.is_empty()).then(|| Region::new(self.region.clone()))
    }

    /// Resolve the SDK configuration shared by all clients of one messenger
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_RETRIES + 1));

        if let Some(credentials) = self.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }

        if let Some(region) = self.region() {
            loader = loader.region(region);
        }

        let config = loader.load().await;

        debug!(
            region = ?config.region(),
            static_credentials = !self.access_key.is_empty() && !self.secret_key.is_empty(),
            "Resolved AWS SDK configuration"
        );

        config
    }
}

/// Configuration of the Pinpoint SMS messenger
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PinpointConfig {
    pub app_id: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub message_type: String,
    pub sender_id: String,
    pub log: bool,
}

impl PinpointConfig {
    /// Parse and validate a configuration blob
    pub fn from_slice(blob: &[u8]) -> MessengerResult<Self> {
        let config: Self = serde_json::from_slice(blob)?;

        if config.app_id.is_empty() {
            return Err(MessengerError::Config("invalid app_id".to_string()));
        }

        Ok(config)
    }

    pub fn aws(&self) -> AwsSettings {
        AwsSettings {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            region: self.region.clone(),
        }
    }
}

/// Configuration of the SES email messenger
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SesConfig {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub log: bool,
}

impl SesConfig {
    /// Parse a configuration blob
    pub fn from_slice(blob: &[u8]) -> MessengerResult<Self> {
        Ok(serde_json::from_slice(blob)?)
    }

    pub fn aws(&self) -> AwsSettings {
        AwsSettings {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            region: self.region.clone(),
        }
    }
}
