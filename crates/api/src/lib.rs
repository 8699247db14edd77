//! # StudioSync API
//!
//! The web server for the StudioSync lesson scheduling service: bookings,
//! recurring schedules, teacher absences and substitute coverage.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate HTTP requests into calls on the core services
//! - **Middleware**: Actor extraction and error mapping
//! - **Config**: Handle environment and application configuration
//!
//! Handlers are generic over the core [`Store`], so the same router runs on
//! PostgreSQL in production and on the in-memory store in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Middleware for actor extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::HeaderValue};
use eyre::{Result, WrapErr};
use studiosync_core::config::SchedulingConfig;
use studiosync_core::notify::NotificationSink;
use studiosync_core::store::Store;
use studiosync_db::{DbPool, PgNotificationSink, PgStore};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState<S: Store> {
    pub store: S,
    /// Receives notifications after the owning transaction committed
    pub notifier: Arc<dyn NotificationSink>,
    pub scheduling: SchedulingConfig,
}

impl<S: Store> ApiState<S> {
    pub fn new(store: S, notifier: Arc<dyn NotificationSink>, scheduling: SchedulingConfig) -> Self {
        Self {
            store,
            notifier,
            scheduling,
        }
    }
}

/// Builds the router with every endpoint attached to `state`.
pub fn app<S: Store>(state: Arc<ApiState<S>>) -> Router {
    Router::new()
        .merge(routes::health::routes::<S>())
        .merge(routes::conflicts::routes::<S>())
        .merge(routes::lessons::routes::<S>())
        .merge(routes::schedules::routes::<S>())
        .merge(routes::absences::routes::<S>())
        .merge(routes::substitutes::routes::<S>())
        .with_state(state)
}

/// Starts the API server with the provided configuration and database connection
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = studiosync_api::config::ApiConfig::from_env()?;
/// let db_pool = studiosync_db::create_pool(&config.database_url).await?;
/// studiosync_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: DbPool) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = Arc::new(ApiState::new(
        PgStore::new(db_pool.clone()),
        Arc::new(PgNotificationSink::new(db_pool)),
        config.scheduling(),
    ));
    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| {
                origin
                    .parse()
                    .wrap_err_with(|| format!("Invalid CORS origin '{origin}'"))
            })
            .collect::<Result<Vec<HeaderValue>>>()?;
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
                axum::http::HeaderName::from_static(middleware::auth::ACTOR_ID_HEADER),
                axum::http::HeaderName::from_static(middleware::auth::ACTOR_ROLE_HEADER),
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request tracing and timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
            .into_inner(),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
