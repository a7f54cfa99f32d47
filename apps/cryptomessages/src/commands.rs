//! Command handlers

use std::net::SocketAddr;

use anyhow::{Context, Result};
use crypto_channel::{KeyMaterial, Role};
use net_transport::SecureChannel;
use tracing::info;
use wire_format::Mode;

use crate::config::AppConfig;

/// Generate and persist the key set for `mode`
pub fn init(config: &AppConfig, mode: Mode) -> Result<()> {
    KeyMaterial::generate(&config.key_store(), mode, &config.key_names())
        .with_context(|| format!("Failed to initialize {mode} keys"))?;
    Ok(())
}

/// Load keys once, then seal and send `message` to `addr`
pub async fn send(config: &AppConfig, mode: Mode, addr: &str, message: &[u8]) -> Result<usize> {
    let material = load(config, mode)?;
    let channel = SecureChannel::new(material.cipher(Role::Sender)?);

    let sent = channel
        .send(addr, message)
        .await
        .with_context(|| format!("Failed to send message to {addr}"))?;
    Ok(sent)
}

/// Load keys once, then wait for and open a single message on `addr`
pub async fn receive(config: &AppConfig, mode: Mode, addr: &str) -> Result<Vec<u8>> {
    receive_on(config, mode, addr, |local| {
        info!("Waiting for {} message on {}", mode, local)
    })
    .await
}

/// Like [`receive`], calling `on_bound` with the bound address before waiting
pub async fn receive_on(
    config: &AppConfig,
    mode: Mode,
    addr: &str,
    on_bound: impl FnOnce(SocketAddr),
) -> Result<Vec<u8>> {
    let material = load(config, mode)?;
    let channel = SecureChannel::new(material.cipher(Role::Receiver)?);

    let pending = channel
        .listen(addr)
        .await
        .with_context(|| format!("Failed to listen on {addr}"))?;
    on_bound(pending.local_addr());

    let message = pending
        .receive()
        .await
        .with_context(|| format!("Failed to receive message on {addr}"))?;
    Ok(message)
}

fn load(config: &AppConfig, mode: Mode) -> Result<KeyMaterial> {
    KeyMaterial::load(&config.key_store(), mode, &config.key_names()).with_context(|| {
        format!(
            "Failed to load {mode} keys from {} (run `init {mode}` first)",
            config.key_dir.display()
        )
    })
}
