//! cryptomessages - secured single-message exchange over UDP
//!
//! ```bash
//! cryptomessages init hmac
//! cryptomessages receive hmac 127.0.0.1:9999
//! cryptomessages send hmac 127.0.0.1:9999 "hello"
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wire_format::Mode;

use config::AppConfig;

/// Send and receive encrypted, authenticated messages over UDP
#[derive(Parser, Debug)]
#[command(name = "cryptomessages")]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding key files
    #[arg(long, global = true)]
    key_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize key(pair)s for the mode
    Init {
        /// hmac or rsa
        mode: Mode,
    },
    /// Send the message via UDP to the address
    Send {
        /// hmac or rsa
        mode: Mode,
        /// Peer address, e.g. 127.0.0.1:9999
        addr: String,
        message: String,
    },
    /// Receive one message via UDP listening on the address
    Receive {
        /// hmac or rsa
        mode: Mode,
        /// Local address, e.g. 127.0.0.1:9999
        addr: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Command::Init { mode } => {
            commands::init(&config, mode)?;
            info!("Keys written to {}", config.key_dir.display());
        }
        Command::Send {
            mode,
            addr,
            message,
        } => {
            commands::send(&config, mode, &addr, message.as_bytes()).await?;
            println!("Sent message to {addr}");
        }
        Command::Receive { mode, addr } => {
            let message = commands::receive(&config, mode, &addr).await?;
            println!("Received message {}", String::from_utf8_lossy(&message));
        }
    }

    Ok(())
}

/// File, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides(|name| std::env::var(name).ok());

    if let Some(dir) = &cli.key_dir {
        config.key_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}
