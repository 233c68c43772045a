//! Provider-agnostic SMS and email delivery.
//!
//! Callers obtain a [`Messenger`] from the [`MessengerRegistry`] by provider
//! name and a JSON configuration blob, then push [`Message`]s through it
//! without knowing which service delivers them.
//!
//! ## Providers
//!
//! - `pinpoint` - SMS via AWS Pinpoint, addressed to the subscriber's `phone` attribute
//! - `ses` - email via AWS SES raw sends, MIME built with lettre
//!
//! Both verify their AWS credentials with STS before they are handed out.
//!
//! ## Usage
//!
//! ```ignore
//! use messenger::{Message, MessengerRegistry, Subscriber};
//!
//! let registry = MessengerRegistry::with_defaults();
//! let sms = registry
//!     .build("pinpoint", br#"{"app_id":"A1","message_type":"TRANSACTIONAL"}"#)
//!     .await?;
//!
//! let subscriber = Subscriber::new("jane@example.com").with_attrib("phone", "+15550001111");
//! sms.push(&Message::new(subscriber, "Your code is 1234")).await?;
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod mock;
pub mod models;
pub mod provider;
pub mod registry;
pub mod transport;

pub use config::{AwsSettings, PinpointConfig, SesConfig};
pub use envelope::Envelope;
pub use error::{MessengerError, MessengerResult};
pub use models::{Attachment, Campaign, ContentType, Headers, Message, Subscriber};
pub use provider::{Messenger, PinpointMessenger, SesMessenger};
pub use registry::MessengerRegistry;
