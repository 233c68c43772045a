use crate::{env_optional, env_or_default, ConfigError, FromEnv};
use std::path::PathBuf;

/// Which messenger to build and where its configuration blob comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessengerSettings {
    pub provider: String,
    /// Inline JSON configuration, takes precedence over `config_file`
    pub config: Option<String>,
    pub config_file: Option<PathBuf>,
}

impl MessengerSettings {
    /// Raw configuration blob: inline JSON, file contents, or `{}`
    pub fn config_blob(&self) -> Result<Vec<u8>, ConfigError> {
        if let Some(config) = &self.config {
            return Ok(config.clone().into_bytes());
        }

        match &self.config_file {
            Some(path) => std::fs::read(path).map_err(|e| ConfigError::ReadError {
                path: path.display().to_string(),
                details: e.to_string(),
            }),
            None => Ok(b"{}".to_vec()),
        }
    }
}

impl FromEnv for MessengerSettings {
    /// Reads:
    /// - MESSENGER_PROVIDER: defaults to "ses"
    /// - MESSENGER_CONFIG: inline JSON configuration
    /// - MESSENGER_CONFIG_FILE: path to a JSON configuration file
    fn from_env() -> Result<Self, ConfigError> {
        let provider = env_or_default("MESSENGER_PROVIDER", "ses").to_ascii_lowercase();

        if provider.trim().is_empty() {
            return Err(ConfigError::ParseError {
                key: "MESSENGER_PROVIDER".to_string(),
                details: "provider name is empty".to_string(),
            });
        }

        Ok(Self {
            provider,
            config: env_optional("MESSENGER_CONFIG"),
            config_file: env_optional("MESSENGER_CONFIG_FILE").map(PathBuf::from),
        })
    }
}

impl Default for MessengerSettings {
    fn default() -> Self {
        Self {
            provider: "ses".to_string(),
            config: None,
            config_file: None,
        }
    }
}
