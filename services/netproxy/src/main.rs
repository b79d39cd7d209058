//! netproxy
//!
//! Configuration-driven TCP relay. Each configured listener accepts
//! connections and forwards them to one of its destinations, racing all
//! destinations concurrently; the first successful connect wins.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use netproxy::{config::Settings, RelayListener};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (RUST_LOG overrides, diagnostics go to stderr)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load().context("failed to load proxy rules")?;
    info!(rule_count = settings.rules.len(), "Configuration loaded");

    let mut handles = Vec::new();
    for rule in &settings.rules {
        for listen in &rule.listens {
            let listener = match RelayListener::bind(listen, &rule.destinations).await {
                Ok(listener) => Arc::new(listener),
                Err(e) => {
                    error!(listen = %listen, error = %e, "Skipping listener");
                    continue;
                }
            };

            let destinations = listener
                .destinations()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("{} -> {}", listener.listen(), destinations);

            let handle = tokio::spawn(async move {
                if let Err(e) = listener.run().await {
                    error!(error = %e, "Listener error");
                }
            });
            handles.push(handle);
        }
    }

    if handles.is_empty() {
        bail!("no listeners could be started");
    }

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
