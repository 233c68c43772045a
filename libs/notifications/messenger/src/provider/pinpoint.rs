//! AWS Pinpoint SMS messenger
//!
//! Sends each message as a single-recipient SMS to the subscriber's `phone`
//! attribute. Pinpoint reports per-recipient results rather than one message
//! id, so a successful push always returns an empty id.

use super::Messenger;
use crate::config::PinpointConfig;
use crate::error::MessengerResult;
use crate::identity;
use crate::models::Message;
use crate::transport::{AwsSmsTransport, IdentityCheck, SmsRequest, SmsTransport};
use async_trait::async_trait;
use tracing::{debug, info};

/// Provider name used for registry lookups
pub const PROVIDER_NAME: &str = "pinpoint";

/// Channel every recipient address is bound to
pub const CHANNEL_TYPE: &str = "SMS";

/// Subscriber attribute holding the destination number
pub const PHONE_ATTRIB: &str = "phone";

/// SMS messenger backed by AWS Pinpoint
pub struct PinpointMessenger<T = AwsSmsTransport> {
    config: PinpointConfig,
    transport: T,
}

impl PinpointMessenger<AwsSmsTransport> {
    /// Parse `blob`, resolve AWS credentials and verify them before returning.
    pub async fn from_config(blob: &[u8]) -> MessengerResult<Self> {
        let config = PinpointConfig::from_slice(blob)?;
        let sdk_config = config.aws().load().await;

        identity::verify_sdk_config(&sdk_config).await?;

        debug!(app_id = %config.app_id, "Pinpoint messenger ready");

        Ok(Self::with_transport(config, AwsSmsTransport::new(&sdk_config)))
    }
}

impl<T: SmsTransport> PinpointMessenger<T> {
    /// Create a messenger over an existing transport without verification
    pub fn with_transport(config: PinpointConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Create a messenger over an existing transport, running `check` first
    pub async fn verified<C>(config: PinpointConfig, transport: T, check: &C) -> MessengerResult<Self>
    where
        C: IdentityCheck + ?Sized,
    {
        identity::check_credentials(check).await?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn config(&self) -> &PinpointConfig {
        &self.config
    }

    /// Build the single-recipient request for `msg`
    pub fn request(&self, msg: &Message) -> MessengerResult<SmsRequest> {
        let phone = msg.subscriber.attrib_str(PHONE_ATTRIB)?;

        Ok(SmsRequest {
            application_id: self.config.app_id.clone(),
            address: phone.to_string(),
            channel_type: CHANNEL_TYPE.to_string(),
            body: String::from_utf8_lossy(&msg.body).into_owned(),
            message_type: self.config.message_type.clone(),
            sender_id: self.config.sender_id.clone(),
        })
    }
}

#[async_trait]
impl<T: SmsTransport> Messenger for PinpointMessenger<T> {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn push(&self, msg: &Message) -> MessengerResult<String> {
        let request = self.request(msg)?;
        let results = self.transport.send_messages(request).await?;

        if self.config.log {
            for result in &results {
                info!(phone = %result.address, result = %result.detail, "successfully sent sms");
            }
        }

        Ok(String::new())
    }

    async fn flush(&self) -> MessengerResult<()> {
        Ok(())
    }

    async fn close(&self) -> MessengerResult<()> {
        Ok(())
    }
}
