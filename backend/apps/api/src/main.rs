//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors are rendered by the feature crates.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::middleware::authenticate;
use auth::{AuthConfig, PgUserRepository, RedisSessionStore, auth_middleware_state, auth_router};
use axum::{
    Router, http,
    http::{Method, StatusCode, header},
    middleware::from_fn_with_state,
};
use catalog::{FsImageBucket, PgCatalogRepository, catalog_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-level settings; auth settings live in [`AuthConfig`]
struct ServerConfig {
    database_url: String,
    redis_url: String,
    image_root: PathBuf,
    public_image_url: String,
    frontend_origins: String,
    port: u16,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a port number")?,
            Err(_) => 31113,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set in environment")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string()),
            image_root: env::var("IMAGE_ROOT")
                .unwrap_or_else(|_| "./images".to_string())
                .into(),
            public_image_url: env::var("PUBLIC_IMAGE_URL")
                .unwrap_or_else(|_| "/images".to_string()),
            frontend_origins: env::var("FRONTEND_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string()),
            port,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shop_api=info,auth=info,catalog=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Session store
    let sessions = Arc::new(RedisSessionStore::connect(&config.redis_url).await?);

    // Auth configuration
    let auth_config = Arc::new(AuthConfig::from_env()?);
    let codec = Arc::new(auth_config.token_codec());
    let users = Arc::new(PgUserRepository::new(pool.clone()));

    // Catalog
    tokio::fs::create_dir_all(&config.image_root)
        .await
        .with_context(|| format!("cannot create image root {}", config.image_root.display()))?;
    let catalog_repo = Arc::new(PgCatalogRepository::new(pool.clone()));
    let bucket = Arc::new(FsImageBucket::new(
        config.image_root.clone(),
        config.public_image_url.clone(),
    ));

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(users, sessions.clone(), codec.clone(), auth_config.clone()),
        )
        .nest("/api/catalog", catalog_router(catalog_repo, bucket))
        .nest_service("/images", ServeDir::new(&config.image_root))
        .layer(from_fn_with_state(
            auth_middleware_state(sessions, codec, auth_config),
            authenticate::<RedisSessionStore>,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                )),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
