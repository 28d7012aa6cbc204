use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use registration_intake::config::Config;
use registration_intake::email::{Notifier, StaffNotifier};
use registration_intake::state::AppState;
use registration_intake::store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting registration intake");

    let store = store::connect(&config.store).await?;

    let notifier: Option<Arc<dyn Notifier>> = match &config.mail {
        Some(mail) => {
            let notifier = StaffNotifier::new(mail)?;
            tracing::info!(host = %mail.host, "Staff notifications enabled");
            Some(Arc::new(notifier))
        }
        None => {
            tracing::info!("Mail not configured, staff notifications disabled");
            None
        }
    };

    let addr = SocketAddr::new(config.host, config.port);
    let app = registration_intake::build_app(Arc::new(AppState {
        config,
        store,
        notifier,
    }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
