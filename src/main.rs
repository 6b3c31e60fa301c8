use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use reelgate::config::Cli;
use reelgate::{MovieProxy, Server, routes};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "reelgate=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), reelgate::Error> {
    let config = cli.into_config()?;
    info!(
        listen = %config.listen,
        upstream = %config.upstream.base_url(),
        "configuration loaded"
    );

    let proxy = Arc::new(MovieProxy::from_config(config.upstream)?);
    Server::bind(config.listen).await?.serve(routes(proxy)).await
}
