use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cookbook_server::http_server;
use cookbook_server::{Config, ServiceState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse().load().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).context("invalid log filter")?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = ServiceState::from_config(&config)
        .await
        .context("setting up service state")?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;

    http_server::serve(listener, state)
        .await
        .context("http server failed")?;

    Ok(())
}
