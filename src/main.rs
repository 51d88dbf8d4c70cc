//! nutrition_coach - Nutrition tracking backend API
//!
//! Serves account profiles, weight logs, dashboard metrics, chat history and
//! saved meal analyses to the web frontend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nutrition_coach::api::{self, middleware::CORRELATION_ID_HEADER, AppState};
use nutrition_coach::auth::SessionManager;
use nutrition_coach::jobs::{JobScheduler, JobSchedulerConfig};
use nutrition_coach::store::{
    AccountStore, MemoryAccountStore, MemorySessionStore, PgAccountStore, PgSessionStore,
    SessionStore,
};
use nutrition_coach::{db, Config};

/// Initialize tracing/logging
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nutrition_coach=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Build the application router
fn build_router(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let correlation_header = HeaderName::from_static(CORRELATION_ID_HEADER);

    let cors = CorsLayer::new()
        .allow_origin(config.cors_allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::PUT])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    // ServiceBuilder layers run top to bottom: the request id is set before
    // the trace span opens and copied onto the response on the way out
    let request_id = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(correlation_header.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(correlation_header));

    Ok(Router::new()
        // Health check (no auth)
        .route("/health", axum::routing::get(health_check))
        .merge(api::create_router(state))
        .layer(request_id)
        .layer(cors))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(config.log_json);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting nutrition_coach server");

    let (accounts, session_store, pool) = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");

            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            db::verify_connection(&pool).await?;
            db::run_migrations(&pool).await?;

            // Verify database schema
            if !db::check_schema(&pool).await? {
                tracing::error!("Database schema is not complete. Please run migrations.");
                return Err(anyhow::anyhow!("Database schema incomplete"));
            }

            tracing::info!("Database connected successfully");
            let accounts: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool.clone()));
            let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(pool.clone()));
            (accounts, sessions, Some(pool))
        }
        None => {
            if config.is_production() {
                return Err(anyhow::anyhow!("DATABASE_URL must be set in production"));
            }
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            let accounts: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::new());
            let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
            (accounts, sessions, None)
        }
    };

    let sessions = SessionManager::new(Arc::clone(&session_store), config.session_ttl);
    let state = AppState::new(accounts, sessions, config.password_hasher());

    let scheduler = JobScheduler::with_config(
        session_store,
        JobSchedulerConfig {
            session_purge_interval: Duration::from_secs(config.session_purge_interval_secs.max(1)),
        },
    )
    .start();

    // Build router and start server
    let app = build_router(state, &config)?;

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    scheduler.abort();
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Database connections closed. Goodbye!");
    }

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    fn test_app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::in_memory(
            config.session_ttl,
            nutrition_coach::auth::PasswordHasher::new(64, 1),
        );
        build_router(state, &config).unwrap()
    }

    #[tokio::test]
    async fn test_health_echoes_correlation_id() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(CORRELATION_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CORRELATION_ID_HEADER], "req-123");
    }

    #[tokio::test]
    async fn test_cors_allows_frontend_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/user/me")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
    }
}
