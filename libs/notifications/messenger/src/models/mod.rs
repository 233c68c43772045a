//! Provider-independent representation of one outbound message.

use crate::error::{MessengerError, MessengerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered, multi-valued MIME-style header fields.
///
/// A name may appear more than once; insertion order is preserved.
pub type Headers = Vec<(String, String)>;

/// How the message body is interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Plain,
    #[default]
    Html,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Html => "html",
        }
    }
}

/// File attached to an email
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient
    pub name: String,
    /// MIME header fields for the attachment part
    #[serde(default)]
    pub header: Headers,
    /// Raw file content
    #[serde(default)]
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            header: Vec::new(),
            content: content.into(),
        }
    }

    /// Add a header field
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.push((name.into(), value.into()));
        self
    }

    /// First value of a header field, matched case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Recipient of a message
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subscriber {
    /// Recipient email address
    pub email: String,
    /// Free-form attributes (e.g. `phone`)
    #[serde(default)]
    pub attribs: HashMap<String, serde_json::Value>,
}

impl Subscriber {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            attribs: HashMap::new(),
        }
    }

    /// Set an attribute
    pub fn with_attrib(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attribs.insert(key.into(), value.into());
        self
    }

    /// Look up a string attribute.
    ///
    /// Fails with [`MessengerError::MissingAttribute`] when the key is absent
    /// or holds a non-string value.
    pub fn attrib_str(&self, key: &str) -> MessengerResult<&str> {
        self.attribs
            .get(key)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| MessengerError::MissingAttribute(format!("subscriber {key}")))
    }
}

/// Campaign a message belongs to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Campaign {
    /// Sender address overriding the message's own `from`
    pub from_email: String,
}

impl Campaign {
    pub fn new(from_email: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
        }
    }
}

/// Message to be pushed through a messenger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    /// Raw body, plain text or HTML depending on `content_type`
    #[serde(default)]
    pub body: Vec<u8>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub subscriber: Subscriber,
    #[serde(default)]
    pub campaign: Option<Campaign>,
}

impl Message {
    /// Create a new message for a subscriber
    pub fn new(subscriber: Subscriber, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            subscriber,
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_campaign(mut self, campaign: Campaign) -> Self {
        self.campaign = Some(campaign);
        self
    }

    /// Sender address: the campaign's `from_email` when a campaign is set,
    /// the message's own `from` otherwise.
    pub fn from_address(&self) -> &str {
        match &self.campaign {
            Some(campaign) => &campaign.from_email,
            None => &self.from,
        }
    }
}
