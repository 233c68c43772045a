//! Messenger CLI
//!
//! Builds a messenger by provider name and pushes a single message through it.
//! Provider and configuration default to `MESSENGER_PROVIDER`,
//! `MESSENGER_CONFIG` and `MESSENGER_CONFIG_FILE`.

use clap::Parser;
use core_config::messenger::MessengerSettings;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use eyre::{eyre, Result, WrapErr};
use messenger::{Attachment, Campaign, ContentType, Message, MessengerRegistry, Subscriber};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "messenger-cli")]
#[command(about = "Push a single SMS or email through a configured messenger")]
struct Cli {
    /// Provider name (pinpoint, ses)
    #[arg(short, long)]
    provider: Option<String>,

    /// Path to the provider's JSON configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Recipient email address
    #[arg(short, long, default_value = "")]
    email: String,

    /// Recipient phone number (stored as the subscriber's `phone` attribute)
    #[arg(long)]
    phone: Option<String>,

    /// Sender address
    #[arg(short, long, default_value = "")]
    from: String,

    /// Campaign sender address, overrides --from for email
    #[arg(long)]
    campaign_from: Option<String>,

    #[arg(short, long, default_value = "")]
    subject: String,

    /// Send the body as plain text instead of HTML
    #[arg(long)]
    plain: bool,

    /// Extra header as "Name: Value", may be repeated
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// File to attach, may be repeated
    #[arg(short, long = "attach")]
    attachments: Vec<PathBuf>,

    /// Message body
    #[arg(short, long)]
    body: String,
}

impl Cli {
    fn settings(&self) -> Result<MessengerSettings> {
        let mut settings = MessengerSettings::from_env()?;

        if let Some(provider) = &self.provider {
            settings.provider = provider.to_ascii_lowercase();
        }

        if let Some(path) = &self.config {
            settings.config = None;
            settings.config_file = Some(path.clone());
        }

        Ok(settings)
    }

    fn message(&self) -> Result<Message> {
        let mut subscriber = Subscriber::new(self.email.as_str());
        if let Some(phone) = &self.phone {
            subscriber = subscriber.with_attrib("phone", phone.as_str());
        }

        let content_type = if self.plain {
            ContentType::Plain
        } else {
            ContentType::Html
        };

        let mut message = Message::new(subscriber, self.body.as_str())
            .with_from(self.from.as_str())
            .with_subject(self.subject.as_str())
            .with_content_type(content_type);

        if let Some(from) = &self.campaign_from {
            message = message.with_campaign(Campaign::new(from.as_str()));
        }

        for header in &self.headers {
            let (name, value) = header
                .split_once(':')
                .ok_or_else(|| eyre!("Invalid header {header:?}, expected \"Name: Value\""))?;
            message = message.with_header(name.trim(), value.trim());
        }

        for path in &self.attachments {
            let content = std::fs::read(path)
                .wrap_err_with(|| format!("Failed to read attachment {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            message = message.with_attachment(Attachment::new(name, content));
        }

        Ok(message)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let message = cli.message()?;

    let registry = MessengerRegistry::with_defaults();
    let blob = settings.config_blob()?;
    let messenger = registry
        .build(&settings.provider, &blob)
        .await
        .wrap_err_with(|| format!("Failed to initialize {} messenger", settings.provider))?;

    let message_id = messenger
        .push(&message)
        .await
        .wrap_err("Failed to push message")?;

    info!(provider = messenger.name(), %message_id, "Message pushed");
    println!("{message_id}");

    messenger.flush().await?;
    messenger.close().await?;

    Ok(())
}
