use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use roble_service::config::{self, ConnectionProfile};
use roble_service::dispatch::Dispatcher;
use roble_service::platform::PlatformClient;
use roble_service::{app, logic, AppState};

#[derive(Parser)]
#[command(name = "roble-service")]
#[command(about = "Microservice shell forwarding /execute to a Roble-backed data client")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Resolve the platform connection, print it and exit")]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local / .env so cargo run picks up ROBLE_* and TABLE_NAME
    config::load_env_files();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("roble_service=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::config();

    // Missing connection settings are fatal: never serve without them
    let profile = ConnectionProfile::resolve().map_err(|e| {
        tracing::error!("configuration error: {}", e);
        e
    })?;
    tracing::info!("platform connection: {}", profile.summary());

    if cli.check_config {
        println!("{}", serde_json::to_string_pretty(&profile.summary())?);
        return Ok(());
    }

    let logic = logic::from_name(&config.logic)?;
    let table_name = profile.table_name.clone();
    let client = PlatformClient::new(profile, config.platform_timeout())?;
    let dispatcher = Dispatcher::new(Arc::new(client), table_name, logic);
    let state = AppState::new(config.clone(), dispatcher);

    let port = cli.port.unwrap_or(config.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(
        "service {} ({}) listening on http://{}",
        config.service_id,
        config.logic,
        bind_addr
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
