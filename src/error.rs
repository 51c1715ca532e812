use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::data::LoadError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Customer {0} not found or has no purchases")]
    CustomerHasNoPurchases(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data load error: {0}")]
    Load(#[from] LoadError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ProductNotFound(_) | AppError::CustomerHasNoPurchases(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Load(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
