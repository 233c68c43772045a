//! AWS SDK backed transports: Pinpoint for SMS, SES v2 for raw email and STS
//! for the credential check.
//!
//! The SDK clients are cheap to clone and safe to share between tasks.

use super::{EmailTransport, IdentityCheck, RawEmail, SmsRequest, SmsResult, SmsTransport};
use crate::error::{MessengerError, MessengerResult};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_pinpoint::types::{
    AddressConfiguration, ChannelType, DirectMessageConfiguration, MessageRequest, MessageResponse,
    MessageResult, MessageType, SmsMessage,
};
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use std::collections::HashMap;
use tracing::error;

/// Pinpoint `SendMessages` transport
#[derive(Clone)]
pub struct AwsSmsTransport {
    client: aws_sdk_pinpoint::Client,
}

impl AwsSmsTransport {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_pinpoint::Client::new(config),
        }
    }

    fn message_request(request: &SmsRequest) -> MessageRequest {
        let mut sms = SmsMessage::builder().body(&request.body);

        if !request.message_type.is_empty() {
            sms = sms.message_type(MessageType::from(request.message_type.as_str()));
        }

        if !request.sender_id.is_empty() {
            sms = sms.sender_id(&request.sender_id);
        }

        MessageRequest::builder()
            .addresses(
                &request.address,
                AddressConfiguration::builder()
                    .channel_type(ChannelType::from(request.channel_type.as_str()))
                    .build(),
            )
            .message_configuration(
                DirectMessageConfiguration::builder()
                    .sms_message(sms.build())
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl SmsTransport for AwsSmsTransport {
    async fn send_messages(&self, request: SmsRequest) -> MessengerResult<Vec<SmsResult>> {
        let output = self
            .client
            .send_messages()
            .application_id(&request.application_id)
            .message_request(Self::message_request(&request))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Pinpoint send_messages failed");
                MessengerError::transport(aws_sdk_pinpoint::Error::from(e))
            })?;

        let response: Option<&MessageResponse> = output.message_response().into();
        let results: Option<&HashMap<String, MessageResult>> =
            response.and_then(|response| response.result().into());

        let results = results
            .map(|results| {
                results
                    .iter()
                    .map(|(address, result)| SmsResult {
                        address: address.clone(),
                        detail: format!("{result:?}"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(results)
    }
}

/// SES v2 `SendEmail` transport using raw content
#[derive(Clone)]
pub struct AwsEmailTransport {
    client: aws_sdk_sesv2::Client,
}

impl AwsEmailTransport {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sesv2::Client::new(config),
        }
    }
}

#[async_trait]
impl EmailTransport for AwsEmailTransport {
    async fn send_raw_email(&self, email: RawEmail) -> MessengerResult<String> {
        let raw = RawMessage::builder()
            .data(Blob::new(email.data))
            .build()
            .map_err(|e| MessengerError::Serialization(e.to_string()))?;

        let destination = Destination::builder()
            .set_to_addresses(Some(email.destinations))
            .build();

        let response = self
            .client
            .send_email()
            .from_email_address(&email.source)
            .destination(destination)
            .content(EmailContent::builder().raw(raw).build())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "AWS SES send failed");
                MessengerError::transport(aws_sdk_sesv2::Error::from(e))
            })?;

        Ok(response.message_id().unwrap_or_default().to_string())
    }
}

/// STS `GetCallerIdentity` check
#[derive(Clone)]
pub struct AwsIdentityCheck {
    client: aws_sdk_sts::Client,
}

impl AwsIdentityCheck {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(config),
        }
    }
}

#[async_trait]
impl IdentityCheck for AwsIdentityCheck {
    async fn check(&self) -> MessengerResult<()> {
        self.client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| MessengerError::Credential(Box::new(aws_sdk_sts::Error::from(e))))?;

        Ok(())
    }
}
