use crate::{
    auth::{JwtKeys, SharedUserRepository},
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::calendar::LocalCalendar,
};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use emocare::infra::{
    db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
    gemini::gemini_client::{GeminiClient, GeminiConfig},
    image_hosting::imgbb_client::{ImgbbClient, ImgbbConfig},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let jwt_keys = Arc::new(JwtKeys::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_seconds,
    ));
    let session_users: SharedUserRepository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let calendar = LocalCalendar::from_offset_hours(config.calendar.utc_offset_hours)?;

    let ai_client = Arc::new(GeminiClient::new(GeminiConfig {
        api_base: config.gemini.api_base.clone(),
        api_key: config.gemini.api_key.clone(),
        model: config.gemini.model.clone(),
        temperature: config.gemini.temperature,
        max_output_tokens: config.gemini.max_output_tokens,
        timeout_secs: config.gemini.timeout_secs,
    })?);
    let image_storage = Arc::new(ImgbbClient::new(ImgbbConfig {
        upload_url: config.image_hosting.upload_url.clone(),
        api_key: config.image_hosting.api_key.clone(),
        timeout_secs: config.image_hosting.timeout_secs,
    })?);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/auth",
            routers::authentication::routes(Arc::clone(&db_pool), Arc::clone(&jwt_keys)),
        )
        .nest(
            "/api/v1/users",
            routers::profiles::routes(Arc::clone(&db_pool), Arc::clone(&image_storage)),
        )
        .nest(
            "/api/v1/admin/users",
            routers::admin_users::routes(Arc::clone(&db_pool), Arc::clone(&image_storage)),
        )
        .nest(
            "/api/v1/emotions",
            routers::emotions::routes(Arc::clone(&db_pool), calendar),
        )
        .nest(
            "/api/v1/diaries",
            routers::diaries::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/psychologists",
            routers::psychologists::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/bookings",
            routers::bookings::routes(Arc::clone(&db_pool), calendar),
        )
        .nest("/api/v1/chat", routers::chat::routes(Arc::clone(&db_pool)))
        .nest(
            "/api/v1/chatbot",
            routers::chatbot::routes(
                Arc::clone(&db_pool),
                ai_client,
                config.chatbot.free_daily_limit,
                calendar,
            ),
        )
        .nest(
            "/api/v1/vouchers",
            routers::vouchers::routes(Arc::clone(&db_pool)),
        )
        .nest(
            "/api/v1/transactions",
            routers::transactions::routes(Arc::clone(&db_pool), Arc::clone(&image_storage)),
        )
        .nest(
            "/api/v1/analytics",
            routers::analytics::routes(Arc::clone(&db_pool), calendar),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(jwt_keys))
        .layer(Extension(session_users))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
