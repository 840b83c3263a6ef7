//! Moovi Backend Library
//!
//! Movie and TV metadata proxy: TMDB responses are fetched per request,
//! image paths are rewritten to absolute CDN URLs, oversized collections are
//! trimmed, and the result is served with CDN cache headers.
//! This library exposes modules for use in integration tests.

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub mod api;
pub mod config;
pub mod error;
pub mod response;
pub mod services;

use crate::config::Config;
use error::{AppError, Result};
use services::{ImageUrls, TmdbClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tmdb_client: Option<Arc<TmdbClient>>,
    pub images: Arc<ImageUrls>,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// The TMDB client is only created when an access token is configured;
    /// without one every proxy endpoint fails closed.
    pub fn new(config: Config) -> Self {
        let tmdb_client = match config.tmdb.token() {
            Some(token) => match TmdbClient::new_shared(
                token.to_string(),
                config.tmdb.base_url.clone(),
                Duration::from_secs(config.tmdb.timeout_secs),
            ) {
                Ok(client) => {
                    tracing::info!(base_url = %config.tmdb.base_url, "TMDB client initialized");
                    Some(client)
                }
                Err(e) => {
                    tracing::error!("Failed to create TMDB client: {}", e);
                    None
                }
            },
            None => {
                tracing::warn!("TMDB access token not configured - proxy endpoints will return 500");
                None
            }
        };

        let images = Arc::new(ImageUrls::from_config(&config.images));

        Self {
            config: Arc::new(config),
            tmdb_client,
            images,
        }
    }

    /// Get the TMDB client, or fail closed when no token is configured.
    pub fn tmdb(&self) -> Result<&TmdbClient> {
        self.tmdb_client.as_deref().ok_or(AppError::MissingToken)
    }

    /// Get the image URL builder.
    pub fn images(&self) -> &ImageUrls {
        &self.images
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
    pub upstream_configured: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Moovi backend is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream_configured: state.tmdb_client.is_some(),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Build the complete application router.
///
/// Shared by `main` and the integration tests; transport layers (CORS,
/// tracing) are added by the caller.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/movies", api::movies::router())
        .nest("/api/series", api::series::router())
        .nest("/api/person", api::person::router())
        .nest("/api/trending", api::trending::router())
        .route("/api/search", get(api::search::search))
        .fallback(not_found)
        .with_state(state)
}
