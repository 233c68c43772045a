//! AWS SES (Simple Email Service) messenger
//!
//! Builds a MIME message from the [`Message`] and relays it as raw content,
//! so headers and attachments reach the recipient exactly as built.

use super::Messenger;
use crate::config::SesConfig;
use crate::envelope::Envelope;
use crate::error::MessengerResult;
use crate::identity;
use crate::models::Message;
use crate::transport::{AwsEmailTransport, EmailTransport, IdentityCheck, RawEmail};
use async_trait::async_trait;
use tracing::{debug, info};

/// Provider name used for registry lookups
pub const PROVIDER_NAME: &str = "ses";

/// Email messenger backed by AWS SES
pub struct SesMessenger<T = AwsEmailTransport> {
    config: SesConfig,
    transport: T,
}

impl SesMessenger<AwsEmailTransport> {
    /// Parse `blob`, resolve AWS credentials and verify them before returning.
    pub async fn from_config(blob: &[u8]) -> MessengerResult<Self> {
        let config = SesConfig::from_slice(blob)?;
        let sdk_config = config.aws().load().await;

        identity::verify_sdk_config(&sdk_config).await?;

        debug!(region = %config.region, "SES messenger ready");

        Ok(Self::with_transport(config, AwsEmailTransport::new(&sdk_config)))
    }
}

impl<T: EmailTransport> SesMessenger<T> {
    /// Create a messenger over an existing transport without verification
    pub fn with_transport(config: SesConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Create a messenger over an existing transport, running `check` first
    pub async fn verified<C>(config: SesConfig, transport: T, check: &C) -> MessengerResult<Self>
    where
        C: IdentityCheck + ?Sized,
    {
        identity::check_credentials(check).await?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn config(&self) -> &SesConfig {
        &self.config
    }
}

#[async_trait]
impl<T: EmailTransport> Messenger for SesMessenger<T> {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn push(&self, msg: &Message) -> MessengerResult<String> {
        let envelope = Envelope::from_message(msg);
        let data = envelope.to_bytes()?;

        let raw = RawEmail {
            source: envelope.from,
            destinations: vec![msg.subscriber.email.clone()],
            data,
        };

        let message_id = self.transport.send_raw_email(raw).await?;

        if self.config.log {
            info!(
                email = %msg.subscriber.email,
                message_id = %message_id,
                "successfully sent email"
            );
        }

        Ok(message_id)
    }

    async fn flush(&self) -> MessengerResult<()> {
        Ok(())
    }

    async fn close(&self) -> MessengerResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessengerError;
    use crate::models::{Attachment, Campaign, ContentType, Subscriber};
    use crate::transport::{MockEmailTransport, MockIdentityCheck};

    fn message() -> Message {
        Message::new(Subscriber::new("a@b.com"), "<p>hi</p>")
            .with_from("x@y.com")
            .with_subject("Greetings")
            .with_content_type(ContentType::Html)
    }

    #[tokio::test]
    async fn test_push_relays_raw_email_and_returns_id() {
        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_raw_email()
            .withf(|raw| {
                let data = String::from_utf8_lossy(&raw.data);
                raw.source == "x@y.com"
                    && raw.destinations == vec!["a@b.com".to_string()]
                    && data.contains("To: a@b.com")
                    && data.contains("text/html")
                    && data.contains("<p>hi</p>")
            })
            .times(1)
            .returning(|_| Ok("0100-abc".to_string()));

        let messenger = SesMessenger::with_transport(SesConfig::default(), transport);
        let id = messenger.push(&message()).await.unwrap();

        assert_eq!(id, "0100-abc");
    }

    #[tokio::test]
    async fn test_push_with_logging_returns_id() {
        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_raw_email()
            .times(1)
            .returning(|_| Ok("0100-logged".to_string()));

        let config = SesConfig {
            log: true,
            ..Default::default()
        };
        let messenger = SesMessenger::with_transport(config, transport);

        assert_eq!(messenger.push(&message()).await.unwrap(), "0100-logged");
    }

    #[tokio::test]
    async fn test_campaign_from_is_used_as_source() {
        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_raw_email()
            .withf(|raw| raw.source == "news@y.com")
            .times(1)
            .returning(|_| Ok("id".to_string()));

        let messenger = SesMessenger::with_transport(SesConfig::default(), transport);
        let msg = message().with_campaign(Campaign::new("news@y.com"));

        assert_eq!(messenger.push(&msg).await.unwrap(), "id");
    }

    #[tokio::test]
    async fn test_plain_message_is_sent_as_text() {
        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_raw_email()
            .withf(|raw| {
                let data = String::from_utf8_lossy(&raw.data);
                data.contains("text/plain") && !data.contains("text/html")
            })
            .times(1)
            .returning(|_| Ok("id".to_string()));

        let messenger = SesMessenger::with_transport(SesConfig::default(), transport);
        let msg = message().with_content_type(ContentType::Plain);

        messenger.push(&msg).await.unwrap();
    }

    #[tokio::test]
    async fn test_serialization_failure_skips_transport() {
        let mut transport = MockEmailTransport::new();
        transport.expect_send_raw_email().times(0);

        let messenger = SesMessenger::with_transport(SesConfig::default(), transport);
        let msg = message().with_attachment(
            Attachment::new("a.bin", b"x".to_vec()).with_header("Content-Type", "bogus"),
        );

        let err = messenger.push(&msg).await.unwrap_err();
        assert!(matches!(err, MessengerError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_transport_error_is_returned_unchanged() {
        let mut transport = MockEmailTransport::new();
        transport
            .expect_send_raw_email()
            .returning(|_| Err(MessengerError::transport(std::io::Error::other("MessageRejected"))));

        let messenger = SesMessenger::with_transport(SesConfig { log: true, ..Default::default() }, transport);

        let err = messenger.push(&message()).await.unwrap_err();
        assert_eq!(err.to_string(), "MessageRejected");
    }

    #[tokio::test]
    async fn test_verified_fails_on_credential_error() {
        let mut check = MockIdentityCheck::new();
        check
            .expect_check()
            .returning(|| Err(MessengerError::transport(std::io::Error::other("InvalidClientTokenId"))));

        let result =
            SesMessenger::verified(SesConfig::default(), MockEmailTransport::new(), &check).await;
        assert!(matches!(result, Err(MessengerError::Credential(_))));
    }

    #[tokio::test]
    async fn test_name_flush_close_are_idempotent() {
        let messenger = SesMessenger::with_transport(SesConfig::default(), MockEmailTransport::new());

        assert_eq!(messenger.name(), "ses");
        for _ in 0..2 {
            assert!(messenger.flush().await.is_ok());
            assert!(messenger.close().await.is_ok());
        }
    }
}
