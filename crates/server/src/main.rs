//! Roboclub lending server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use roboclub_api::{AppState, identity_middleware, router as api_router};
use roboclub_common::Config;
use roboclub_core::{InventoryService, LabRequestService, LabReviewService, ReservationService};
use roboclub_db::repositories::{ComponentRepository, LabRequestRepository, ProfileRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roboclub=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting roboclub lending server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = roboclub_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    roboclub_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let component_repo = ComponentRepository::new(Arc::clone(&db));
    let request_repo = LabRequestRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));

    // Initialize services
    let inventory_service = InventoryService::new(component_repo.clone());
    let lab_request_service = LabRequestService::new(
        Arc::clone(&db),
        request_repo.clone(),
        profile_repo.clone(),
    );
    let reservation_service = ReservationService::new(Arc::clone(&db));
    let lab_review_service =
        LabReviewService::new(request_repo, component_repo, profile_repo);

    let state = AppState {
        inventory_service,
        lab_request_service,
        reservation_service,
        lab_review_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn(identity_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
