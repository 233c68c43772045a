//! Messenger implementations

pub mod pinpoint;
pub mod ses;

pub use pinpoint::PinpointMessenger;
pub use ses::SesMessenger;

use crate::error::MessengerResult;
use crate::models::Message;
use async_trait::async_trait;

/// Uniform contract for delivering a message through one provider.
///
/// Implementations hold no per-call state, so a single instance can be
/// shared across tasks (e.g. behind an `Arc`).
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Stable lowercase provider identifier
    fn name(&self) -> &'static str;

    /// Send one message.
    ///
    /// Returns the provider-assigned message id, which may be empty when the
    /// provider does not assign one.
    async fn push(&self, msg: &Message) -> MessengerResult<String>;

    /// Drain buffered messages
    async fn flush(&self) -> MessengerResult<()>;

    /// Release provider resources
    async fn close(&self) -> MessengerResult<()>;
}
