//! vapid-push CLI - generate VAPID keys, sign tokens and send test pushes.
//!
//! This is the binary entry point. See the `vapid_push` library for the
//! encryption and signing core.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use vapid_push::request::authorization_header;
use vapid_push::{
    jwt, PushNotification, PushSubscription, Urgency, VapidClient, VapidConfig, VapidIdentity,
};

#[derive(Parser)]
#[command(name = "vapid-push")]
#[command(version)]
#[command(about = "Web Push (aesgcm) encryption and VAPID signing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new VAPID key pair
    Keygen {
        /// Contact URI, e.g. mailto:ops@example.com
        #[arg(long)]
        subject: String,
        /// Write the config here instead of printing it
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the Authorization header for a push endpoint
    Sign {
        /// VAPID config file (falls back to VAPID_* environment variables)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Push service endpoint URL
        endpoint: String,
    },
    /// Encrypt and send one notification
    Send {
        /// VAPID config file (falls back to VAPID_* environment variables)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Subscription endpoint URL
        #[arg(long)]
        endpoint: String,
        /// Subscription p256dh key (base64url)
        #[arg(long)]
        p256dh: String,
        /// Subscription auth secret (base64url)
        #[arg(long)]
        auth: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// URL opened on click
        #[arg(long, default_value = "/")]
        navigate: String,
        /// Time to live in seconds
        #[arg(long)]
        ttl: Option<u64>,
        /// very-low, low, normal or high
        #[arg(long, default_value = "normal")]
        urgency: Urgency,
        #[arg(long)]
        topic: Option<String>,
    },
}

/// Resolve the identity from `--config`, else the environment.
fn load_identity(config: Option<&Path>) -> Result<VapidIdentity> {
    let config = match config {
        Some(path) => VapidConfig::load(path)
            .with_context(|| format!("Failed to read VAPID config {}", path.display()))?,
        None => match VapidConfig::from_env()? {
            Some(config) => config,
            None => bail!("No VAPID config: pass --config or set VAPID_SUBJECT, VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY"),
        },
    };
    config.into_identity().context("Invalid VAPID config")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen { subject, output } => {
            let config = VapidConfig::generate(&subject);
            match output {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Wrote VAPID config to {}", path.display());
                    println!("{}", config.public_key);
                }
                None => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
        Commands::Sign { config, endpoint } => {
            let identity = load_identity(config.as_deref())?;
            let token = jwt::sign(&endpoint, &identity).context("Failed to sign token")?;
            println!("{}", authorization_header(&token)?);
        }
        Commands::Send {
            config,
            endpoint,
            p256dh,
            auth,
            title,
            body,
            navigate,
            ttl,
            urgency,
            topic,
        } => {
            let identity = load_identity(config.as_deref())?;
            let subscription = PushSubscription::new(endpoint, p256dh, auth);

            let mut notification = PushNotification::new(title, body, navigate);
            notification.urgency = urgency;
            notification.ttl = ttl.map(Duration::from_secs);
            notification.topic = topic;

            let client = VapidClient::new(identity)?;
            if !client
                .send(&subscription, &notification)
                .await
                .context("Failed to send notification")?
            {
                bail!("Push service rejected the notification");
            }
            log::info!("Notification delivered");
        }
    }

    Ok(())
}
