use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use biblio_core::catalog::memory::InMemoryCatalogStore;
use biblio_core::catalog::store::CatalogStore;
use biblio_db::PgCatalogStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_api::config::{ServerConfig, StoreBackend};
use biblio_api::router::build_app_router;
use biblio_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "biblio_api=debug,biblio_core=debug,biblio_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Entity store ---
    let store = connect_store(StoreBackend::from_env()).await;

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain))
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Open the configured store. Postgres is health-checked and migrated
/// before the server accepts traffic.
async fn connect_store(backend: StoreBackend) -> Arc<dyn CatalogStore> {
    match backend {
        StoreBackend::Memory => {
            let store = InMemoryCatalogStore::new();
            let seeded = store.seed_default_categories().await;
            tracing::warn!(
                categories = seeded.len(),
                "Using in-memory catalog store; data is lost on restart"
            );
            Arc::new(store)
        }
        StoreBackend::Postgres { database_url } => {
            let pool = biblio_db::create_pool(&database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            biblio_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            biblio_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgCatalogStore::new(pool))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). In-flight requests
/// get `drain` to finish; after that the process exits regardless.
async fn shutdown_signal(drain: Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    tokio::spawn(async move {
        tokio::time::sleep(drain).await;
        tracing::warn!(drain_secs = drain.as_secs(), "Drain timeout elapsed, exiting");
        std::process::exit(1);
    });
}
