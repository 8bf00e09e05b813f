pub mod clients;
pub mod config;
pub mod error;
pub mod routes;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use clients::classifier::HttpClassifier;
use config::Config;

/// Build the application router with its shared state.
pub fn app(config: Config) -> anyhow::Result<Router> {
    let classifier = HttpClassifier::new(
        config.classifier_url.clone(),
        Duration::from_secs(config.classifier_timeout_secs),
    )?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/notation", post(routes::notation::generate_notation))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(Extension(classifier))
        .layer(Extension(config))
        .layer(cors);

    Ok(app)
}
