use std::sync::Arc;
use axum::{
    routing::{get, Router},
    http::{HeaderValue, Method},
    middleware,
};
use tower_http::{
    cors::{Any, CorsLayer},
    compression::CompressionLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing::{error, info, warn};
use tokio::time::{interval, Duration};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use crate::{
    config::Config,
    state::AppState,
    services::{
        AuthService,
        CategoryService,
        CommentService,
        Database,
        LikeService,
        MessageService,
        NotificationService,
        PostService,
        TypingStatusStore,
        UserService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "aurora_blog=debug,tower_http=debug".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aurora-Blog service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    info!("Environment: {}", config.environment);

    let db = Arc::new(match Database::new(&config).await {
        Ok(db) => {
            match db.verify_connection().await {
                Ok(_) => {
                    info!("Database connection established successfully");
                    db
                }
                Err(e) => {
                    warn!("Database connection failed: {}", e);
                    info!("Attempting to auto-start database...");

                    if let Err(start_err) = auto_start_database(&config).await {
                        error!("Failed to auto-start database: {}. Original error: {}", start_err, e);
                        return Err(anyhow::anyhow!("Database connection failed"));
                    }

                    let db = Database::new(&config).await?;
                    db.verify_connection().await?;
                    info!("Database auto-started and connected successfully");
                    db
                }
            }
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    });

    let auth_service = AuthService::new(&config, db.clone()).await?;
    let user_service = UserService::new(db.clone()).await?;
    let post_service = PostService::new(db.clone()).await?;
    let category_service = CategoryService::new(db.clone()).await?;
    let notification_service = NotificationService::new(db.clone()).await?;
    let comment_service = CommentService::new(db.clone(), notification_service.clone(), &config).await?;
    let like_service = LikeService::new(db.clone(), notification_service.clone()).await?;
    let typing_store = TypingStatusStore::new();
    let message_service = MessageService::new(db.clone(), typing_store).await?;

    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth_service,
        user_service,
        post_service,
        category_service,
        comment_service,
        like_service,
        message_service,
        notification_service,
    });

    start_background_tasks(app_state.clone()).await;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(
            config.cors_allowed_origins
                .split(',')
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        );

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/auth", routes::auth::router())
        .nest("/posts", routes::posts::router())
        .nest("/categories", routes::categories::router())
        .nest("/profiles", routes::profiles::router())
        .nest("/messages", routes::messages::router())
        .nest("/notifications", routes::notifications::router())
        .layer(middleware::from_fn_with_state(app_state.clone(), utils::middleware::auth_middleware))
        .layer(middleware::from_fn_with_state(app_state.clone(), utils::middleware::rate_limit_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Aurora-Blog is running!"
}

async fn auto_start_database(config: &Config) -> anyhow::Result<()> {
    info!("Attempting to start SurrealDB...");

    let output = tokio::process::Command::new("surreal")
        .args(&[
            "start",
            "--user", &config.database_username,
            "--pass", &config.database_password,
            "memory",
        ])
        .spawn();

    match output {
        Ok(_) => {
            info!("SurrealDB started successfully");
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(())
        }
        Err(e) => {
            error!("Failed to start SurrealDB: {}", e);
            Err(anyhow::anyhow!("Failed to start database"))
        }
    }
}

async fn start_background_tasks(app_state: Arc<AppState>) {
    info!("Starting background tasks...");

    // auth cache cleanup
    let auth_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;
            if let Err(e) = auth_state.auth_service.cleanup_expired_sessions().await {
                error!("Failed to clean up auth caches: {}", e);
            }
        }
    });

    info!("Background tasks started successfully");
}
