//! Construct messengers by provider name.
//!
//! ```ignore
//! use messenger::MessengerRegistry;
//!
//! let registry = MessengerRegistry::with_defaults();
//! let ses = registry.build("ses", br#"{"region":"us-east-1"}"#).await?;
//! let id = ses.push(&message).await?;
//! ```

use crate::error::{MessengerError, MessengerResult};
use crate::provider::{pinpoint, ses, Messenger, PinpointMessenger, SesMessenger};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Future resolving to a ready-to-use messenger
pub type MessengerFuture = BoxFuture<'static, MessengerResult<Box<dyn Messenger>>>;

/// Builds a messenger from a raw configuration blob
pub type Constructor = Arc<dyn Fn(Vec<u8>) -> MessengerFuture + Send + Sync>;

/// Constructors keyed by provider name
#[derive(Clone, Default)]
pub struct MessengerRegistry {
    constructors: HashMap<String, Constructor>,
}

impl MessengerRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `pinpoint` and `ses` providers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(pinpoint::PROVIDER_NAME, |blob| {
            async move {
                let messenger = PinpointMessenger::from_config(&blob).await?;
                Ok::<_, MessengerError>(Box::new(messenger) as Box<dyn Messenger>)
            }
            .boxed()
        });
        registry.register(ses::PROVIDER_NAME, |blob| {
            async move {
                let messenger = SesMessenger::from_config(&blob).await?;
                Ok::<_, MessengerError>(Box::new(messenger) as Box<dyn Messenger>)
            }
            .boxed()
        });
        registry
    }

    /// Register (or replace) the constructor for `name`
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(Vec<u8>) -> MessengerFuture + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered provider names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the messenger registered under `name` from `config`
    pub async fn build(&self, name: &str, config: &[u8]) -> MessengerResult<Box<dyn Messenger>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| MessengerError::UnknownProvider(name.to_string()))?;

        let messenger = constructor(config.to_vec()).await?;

        info!(provider = %messenger.name(), "Messenger initialized");

        Ok(messenger)
    }
}

impl std::fmt::Debug for MessengerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
