//! APNs CLI - Send push notifications and read expired device tokens
//!
//! Talks to the binary gateway and feedback services with a client certificate.

use anyhow::{Context, Result};
use apns_client::{Apns, ApnsConfig};
use apns_core::{Payload, PayloadAlert};
use apns_transport::{ConnectionConfig, Endpoint};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// APNs - Apple Push Notification service client
#[derive(Parser)]
#[command(name = "apns")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Client certificate (PEM)
    #[arg(long, global = true, env = "APNS_CERT")]
    cert: Option<PathBuf>,

    /// Private key (PEM), if not bundled with the certificate
    #[arg(long, global = true, env = "APNS_KEY")]
    key: Option<PathBuf>,

    /// Trust roots replacing the system store (PEM)
    #[arg(long, global = true, env = "APNS_CA")]
    ca: Option<PathBuf>,

    /// Use the sandbox environment
    #[arg(long, global = true, env = "APNS_SANDBOX")]
    sandbox: bool,

    /// Gateway address override (host:port)
    #[arg(long, global = true, env = "APNS_GATEWAY")]
    gateway: Option<Endpoint>,

    /// Feedback address override (host:port)
    #[arg(long, global = true, env = "APNS_FEEDBACK")]
    feedback: Option<Endpoint>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a notification to one device
    Send {
        /// Device token (hex)
        #[arg(short, long)]
        token: String,

        /// Alert text
        #[arg(short, long)]
        alert: Option<String>,

        /// Localization key for the action button
        #[arg(long)]
        action_loc_key: Option<String>,

        /// Badge number (0 clears the badge)
        #[arg(short, long)]
        badge: Option<u32>,

        /// Sound name
        #[arg(short, long)]
        sound: Option<String>,

        /// Custom top-level field (key=value, value parsed as JSON)
        #[arg(long = "custom")]
        custom: Vec<String>,
    },

    /// Print the device tokens reported as expired
    Feedback {
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs)?;

    let config = load_config(&cli)?;
    info!(
        "Using {} environment",
        if config.sandbox { "sandbox" } else { "production" }
    );
    let mut apns = Apns::new(config);

    let result = tokio::select! {
        result = run(&mut apns, cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            Ok(())
        }
    };

    apns.close().await;
    result
}

async fn run(apns: &mut Apns, command: Commands) -> Result<()> {
    match command {
        Commands::Send {
            token,
            alert,
            action_loc_key,
            badge,
            sound,
            custom,
        } => {
            let payload = build_payload(alert, action_loc_key, badge, sound, &custom)?;
            apns.gateway()
                .send(&token, &payload)
                .await
                .with_context(|| format!("Failed to send to {}", token))?;
            println!(
                "{} Sent {} bytes to {}",
                "OK".green().bold(),
                payload.len(),
                token.yellow()
            );
        }

        Commands::Feedback { json } => {
            let mut records = apns.feedback().records();
            while let Some(record) = records
                .next()
                .await
                .context("Failed to read feedback")?
            {
                if json {
                    let line = serde_json::json!({
                        "timestamp": record.timestamp,
                        "expired_at": record.expired_at().to_rfc3339(),
                        "token": record.token_hex(),
                    });
                    println!("{}", line);
                } else {
                    println!(
                        "{}  {}",
                        record.expired_at().to_rfc3339().cyan(),
                        record.token_hex()
                    );
                }
            }
            info!("{} expired tokens", records.received());
        }
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

/// Merge the config file, environment and flags; flags win
fn load_config(cli: &Cli) -> Result<ApnsConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None => {
            let cert = cli
                .cert
                .clone()
                .context("A certificate is required (--cert, APNS_CERT or --config)")?;
            let mut config = ApnsConfig::new(cert, None);
            config.connection = ConnectionConfig::from_env();
            config
        }
    };

    if let Some(cert) = &cli.cert {
        config.cert_path = cert.clone();
    }
    if let Some(key) = &cli.key {
        config.key_path = Some(key.clone());
    }
    if let Some(ca) = &cli.ca {
        config.ca_path = Some(ca.clone());
    }
    if cli.sandbox {
        config.sandbox = true;
    }
    if let Some(gateway) = &cli.gateway {
        config.gateway = Some(gateway.clone());
    }
    if let Some(feedback) = &cli.feedback {
        config.feedback = Some(feedback.clone());
    }

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ApnsConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

fn build_payload(
    alert: Option<String>,
    action_loc_key: Option<String>,
    badge: Option<u32>,
    sound: Option<String>,
    custom: &[String],
) -> Result<Payload> {
    let mut builder = Payload::builder();

    match (alert, action_loc_key) {
        (Some(body), Some(key)) => {
            builder = builder.alert(PayloadAlert::new(body).action_loc_key(key));
        }
        (Some(body), None) => builder = builder.alert(body),
        (None, Some(_)) => anyhow::bail!("--action-loc-key needs --alert"),
        (None, None) => {}
    }
    if let Some(badge) = badge {
        builder = builder.badge(badge);
    }
    if let Some(sound) = sound {
        builder = builder.sound(sound);
    }
    for field in custom {
        let (key, value) = parse_custom(field)?;
        builder = builder.custom(key, value);
    }

    Ok(builder.build()?)
}

/// Parse `key=value`; values that are not valid JSON are taken as strings
fn parse_custom(field: &str) -> Result<(String, Value)> {
    let (key, raw) = field
        .split_once('=')
        .with_context(|| format!("Expected key=value, got {:?}", field))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
