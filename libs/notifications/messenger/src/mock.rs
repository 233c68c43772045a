//! In-memory transports for testing code that pushes messages.
//!
//! Each recorder is cheap to clone; clones share the captured requests, so a
//! test can hand one clone to a messenger and inspect another.

use crate::error::{MessengerError, MessengerResult};
use crate::transport::{EmailTransport, IdentityCheck, RawEmail, SmsRequest, SmsResult, SmsTransport};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

fn failure(message: &Option<String>) -> MessengerError {
    let message = message.clone().unwrap_or_else(|| "Mock failure".to_string());
    MessengerError::transport(message)
}

/// SMS transport that captures requests
#[derive(Clone, Default)]
pub struct RecordingSmsTransport {
    sent: Arc<Mutex<Vec<SmsRequest>>>,
    failure_message: Option<String>,
}

impl RecordingSmsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SmsRequest> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl SmsTransport for RecordingSmsTransport {
    async fn send_messages(&self, request: SmsRequest) -> MessengerResult<Vec<SmsResult>> {
        if self.failure_message.is_some() {
            return Err(failure(&self.failure_message));
        }

        let result = SmsResult {
            address: request.address.clone(),
            detail: "SUCCESSFUL".to_string(),
        };
        self.sent.lock().await.push(request);

        Ok(vec![result])
    }
}

/// Email transport that captures raw emails and hands out sequential ids
#[derive(Clone, Default)]
pub struct RecordingEmailTransport {
    sent: Arc<Mutex<Vec<RawEmail>>>,
    next_id: Arc<AtomicUsize>,
    failure_message: Option<String>,
}

impl RecordingEmailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure_message: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<RawEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Check if an email was relayed to a specific address
    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent
            .lock()
            .await
            .iter()
            .any(|raw| raw.destinations.iter().any(|d| d == email))
    }
}

#[async_trait]
impl EmailTransport for RecordingEmailTransport {
    async fn send_raw_email(&self, email: RawEmail) -> MessengerResult<String> {
        if self.failure_message.is_some() {
            return Err(failure(&self.failure_message));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push(email);

        Ok(format!("mock-{id}"))
    }
}

/// Identity check with a fixed outcome
#[derive(Clone, Default)]
pub struct StaticIdentityCheck {
    failure_message: Option<String>,
}

impl StaticIdentityCheck {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            failure_message: Some(message.into()),
        }
    }
}

#[async_trait]
impl IdentityCheck for StaticIdentityCheck {
    async fn check(&self) -> MessengerResult<()> {
        match &self.failure_message {
            Some(message) => Err(MessengerError::Credential(message.clone().into())),
            None => Ok(()),
        }
    }
}
