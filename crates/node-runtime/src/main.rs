//! Fee-oracle node entry point.

use anyhow::{Context, Result};
use node_runtime::{OracleConfig, OracleNode};
use fo_security::DevSignatureVerifier;
use shared_types::{NullEventSink, SystemTimeSource};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load configuration: defaults, then the optional `FO_CONFIG` file, then
/// environment overrides.
fn load_config() -> Result<OracleConfig> {
    let mut config = match std::env::var("FO_CONFIG") {
        Ok(path) => OracleConfig::from_file(&path)
            .with_context(|| format!("loading config file {path}"))?,
        Err(_) => OracleConfig::default(),
    };
    config.apply_env_overrides();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    let config = load_config()?;

    let node = OracleNode::new(
        config,
        Arc::new(DevSignatureVerifier::default()),
        Arc::new(SystemTimeSource),
        Arc::new(NullEventSink),
    );
    node.start();

    info!("node is running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    node.shutdown();
    Ok(())
}
