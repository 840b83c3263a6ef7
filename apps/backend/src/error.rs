//! Application error types for the Moovi backend.
//!
//! Provides a unified error type that implements `IntoResponse` for Axum.
//! Every error body is `{ "error": string }`; upstream details are logged only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::tmdb::TmdbError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading/parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// No TMDB access token configured; raised before any network call
    #[error("TMDB API token not configured")]
    MissingToken,

    /// TMDB call failed; `context` is the message returned to the client
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: TmdbError,
    },

    /// Invalid request data
    #[error("{0}")]
    BadRequest(String),

    /// No such route
    #[error("Not found")]
    NotFound,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Adapter for `map_err` that tags a TMDB failure with a client-facing message.
    ///
    /// ```ignore
    /// tmdb.movie_details(&id).await.map_err(AppError::upstream("Failed to fetch movie details"))?;
    /// ```
    pub fn upstream(context: &'static str) -> impl FnOnce(TmdbError) -> AppError {
        move |source| AppError::Upstream { context, source }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            AppError::MissingToken => {
                tracing::error!("TMDB access token is not configured");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Upstream { context, source } => {
                // Upstream status and body stay in the logs
                tracing::error!(error = %source, "{}", context);
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
