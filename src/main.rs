use anyhow::Context;
use talebook::app::build_router;
use talebook::config::AppConfig;
use talebook::demo_seeder::seed_demo_users;
use talebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talebook=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting Talebook server...");

    let config = AppConfig::load()?;
    let addr = config.bind_addr()?;

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("Failed to connect to MongoDB")?;

    tracing::info!(
        "Connected to MongoDB at {} (database '{}')",
        config.redacted_mongodb_uri(),
        config.mongodb_database
    );

    let demo_mode = config.demo_mode;
    let state = AppState::connect(&mongo_client, config).await?;

    if demo_mode {
        seed_demo_users(state.user_repo.as_ref()).await;
    }

    let app = build_router(state);

    // Start the server
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped, closing MongoDB client");
    mongo_client.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
