//! services/api/src/error.rs
//!
//! The service-wide error type and its mapping onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use book_catalog_core::error::ImportError;
use book_catalog_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// Everything a handler or the startup sequence can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog store error: {0}")]
    Port(#[from] PortError),

    /// A Goodreads import that could not run at all.
    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Socket binding or reading the lexicon file.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed request the handler rejected itself.
    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Port(PortError::Invalid(_)) | ApiError::Port(PortError::Conflict(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Import(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Port(PortError::NotFound(m))
            | ApiError::Port(PortError::Invalid(m))
            | ApiError::Port(PortError::Conflict(m)) => m.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}

/// A convenience type alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;
