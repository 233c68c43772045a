//! Seams to the external delivery services.
//!
//! Each trait is a single request/response call. The AWS implementations live
//! in [`aws`]; in-memory recorders for tests live in [`crate::mock`].

pub mod aws;

pub use aws::{AwsEmailTransport, AwsIdentityCheck, AwsSmsTransport};

use crate::error::MessengerResult;
use async_trait::async_trait;

/// Single-recipient SMS send request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsRequest {
    pub application_id: String,
    /// Destination phone number
    pub address: String,
    /// Channel the address is bound to
    pub channel_type: String,
    pub body: String,
    pub message_type: String,
    pub sender_id: String,
}

/// Per-recipient outcome reported by the SMS service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsResult {
    pub address: String,
    /// Provider result entry, rendered for logging
    pub detail: String,
}

/// Already-serialized email handed to the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEmail {
    pub source: String,
    pub destinations: Vec<String>,
    pub data: Vec<u8>,
}

/// Sends SMS messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send_messages(&self, request: SmsRequest) -> MessengerResult<Vec<SmsResult>>;
}

/// Relays raw MIME email
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Returns the provider-assigned message id
    async fn send_raw_email(&self, email: RawEmail) -> MessengerResult<String>;
}

/// Verifies that the resolved credentials belong to a usable account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityCheck: Send + Sync {
    async fn check(&self) -> MessengerResult<()>;
}
