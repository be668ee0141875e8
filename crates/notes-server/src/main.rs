use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notes_server::config::{parse_origins, Config, Credentials, TokenConfig};
use notes_server::routes::{cors_layer, router};
use notes_server::AppState;

#[derive(Parser)]
#[command(name = "notes-server")]
#[command(about = "Filesystem-backed note tree over HTTP with bearer-token login")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8000, env = "NOTES_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "NOTES_BIND")]
    bind: String,

    /// Shared login username
    #[arg(long, env = "USERNAME")]
    username: String,

    /// Shared login password
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    password: String,

    /// Token signing secret
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Token signing algorithm (HS256, HS384 or HS512)
    #[arg(long, default_value = "HS256", env = "ALGORITHM")]
    algorithm: String,

    /// Lifetime of issued tokens in minutes
    #[arg(long, default_value_t = 30, env = "ACCESS_TOKEN_EXPIRE_MINUTES")]
    access_token_expire_minutes: i64,

    /// Directory holding the note tree
    #[arg(long, default_value = "./data", env = "DATA_ROOT")]
    data_root: PathBuf,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, default_value = "", env = "CORS_ORIGINS")]
    cors_origins: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "notes_server=info,note_tree=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        credentials: Credentials::new(cli.username, cli.password),
        tokens: TokenConfig::new(
            cli.secret_key,
            &cli.algorithm,
            cli.access_token_expire_minutes,
        )
        .context("Invalid token configuration")?,
        data_root: cli.data_root,
        cors_origins: parse_origins(&cli.cors_origins),
    };

    if !config.data_root.is_dir() {
        tracing::warn!(
            "Data root {:?} does not exist yet; tree requests will fail until it is created",
            config.data_root
        );
    }

    let cors = cors_layer(&config.cors_origins)?;
    let state = Arc::new(AppState::new(&config));
    let app = router(state).layer(cors);

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    tracing::info!("Starting notes-server on {}", addr);
    tracing::info!("Serving notes from {:?}", config.data_root);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Notes server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
