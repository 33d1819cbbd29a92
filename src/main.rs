use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use gigport_backend::api::{self, AppState};
use gigport_backend::auth::TokenVerifier;
use gigport_backend::config::AppConfig;
use gigport_backend::database::{self, gig_store::PgGigStore, order_store::PgOrderStore};
use gigport_backend::logging::init_tracing;
use gigport_backend::payments::factory::gateway_from_config;
use gigport_backend::services::disputes::DisputeService;
use gigport_backend::services::notification::NotificationService;
use gigport_backend::services::order_lifecycle::OrderLifecycleService;

/// Graceful shutdown signal handler
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

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "🚀 Starting Gigport backend service"
    );

    info!(
        host = %config.server.host,
        port = config.server.port,
        platform_fee_bps = config.settlement.platform_fee_bps,
        "Server configuration loaded"
    );

    info!("📊 Initializing database connection pool...");
    let pool = database::init_pool_from_config(&config.database)
        .await
        .map_err(|e| {
            error!("Failed to initialize database pool: {}", e);
            anyhow::anyhow!(e)
        })?;
    info!("✅ Database connection pool initialized");

    database::run_migrations(&pool).await?;

    let gateway = gateway_from_config(&config.gateway)
        .map_err(|e| anyhow::anyhow!("payment gateway setup failed: {e}"))?;

    let orders = Arc::new(PgOrderStore::new(pool.clone()));
    let gigs = Arc::new(PgGigStore::new(pool.clone()));
    let notifier = Arc::new(NotificationService::new());

    let lifecycle = Arc::new(OrderLifecycleService::new(
        orders.clone(),
        gigs,
        gateway.clone(),
        notifier.clone(),
        config.settlement.clone(),
    ));
    let disputes = Arc::new(DisputeService::new(orders, gateway, notifier));
    let verifier = Arc::new(TokenVerifier::from_config(&config.auth));

    let state = AppState {
        lifecycle,
        disputes,
        verifier,
        pool,
    };

    let app = api::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server address: {e}"))?;

    info!(%addr, "🌐 Listening for requests");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
