use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

/// Message returned to clients when an employee id does not exist.
pub const NOT_FOUND_MESSAGE: &str = "Funcionário não encontrado.";

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(format!("Database error: {}", err))
    }
}

impl From<config::ConfigError> for RegistryError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Employee {0} not found")]
    NotFound(i64),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    pub fn missing_body() -> Self {
        Self::BadRequest("Employee body is required".to_string())
    }

    pub fn audit<E: std::fmt::Display>(msg: E) -> Self {
        Self::Persistence(format!("Audit store error: {}", msg))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(_) | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::NotFound(_) => (
                status,
                Json(serde_json::json!({ "Mensagem": NOT_FOUND_MESSAGE })),
            )
                .into_response(),
            Self::BadRequest(_) => status.into_response(),
            Self::Persistence(ref detail) | Self::Config(ref detail) => {
                // Backend details stay in the logs.
                error!("Request failed: {}", detail);
                (
                    status,
                    Json(serde_json::json!({ "error": "Persistence failure" })),
                )
                    .into_response()
            }
        }
    }
}
