//! confdeskd - conference desk backend daemon.

use confdesk::config::{Config, validate};
use confdesk::http;
use confdesk::state::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;

    init_tracing(&config.server.log_format);

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        listen = %config.server.listen,
        backend = %config.backend.url,
        model = %config.ai.model,
        "Starting confdeskd"
    );

    if config.server.metrics {
        confdesk::metrics::init();
    }

    let listen = config.server.listen;
    let state = AppState::from_config(config);
    let app = http::router(state);

    let listener = TcpListener::bind(listen).await.map_err(|e| {
        error!(%listen, error = %e, "Failed to bind");
        e
    })?;
    http::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
