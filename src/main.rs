use axum::{Router, http::header, routing::get};
use billsplit::api::{
    handlers::{AppService, api_routes},
    openapi::ApiDoc,
};
use billsplit::config::CONFIG;
use billsplit::infrastructure::{
    logging::in_memory::InMemoryLogging,
    storage::{Storage, in_memory::InMemoryStorage, json_file::JsonFileStorage},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Starting with {:?}", *CONFIG);

    let storage: Arc<dyn Storage> = match &CONFIG.storage_path {
        Some(path) => {
            info!("Saving recipients and pairings to {}", path.display());
            Arc::new(JsonFileStorage::open(path).await?)
        }
        None => Arc::new(InMemoryStorage::new()),
    };
    let logging = InMemoryLogging::new();
    let service: Arc<AppService> = Arc::new(AppService::new(storage, logging, CONFIG.service_settings()?));

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
