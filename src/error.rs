use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::VenueError;
use crate::services::checkout::CheckoutError;
use crate::sessions::SessionError;

/// Ошибки при старте приложения.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Venue(#[from] VenueError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// Ошибки HTTP-слоя.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Конфликт состояния: место занято, сессия уже оформлена.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

pub(crate) fn status_419() -> StatusCode {
    StatusCode::from_u16(419).unwrap_or(StatusCode::CONFLICT)
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => status_419(),
            AppError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Session(SessionError::Submitted | SessionError::CheckoutInProgress) => status_419(),
            AppError::Checkout(CheckoutError::EmptySelection) => StatusCode::BAD_REQUEST,
            AppError::Checkout(CheckoutError::CircuitOpen) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Checkout(CheckoutError::Gateway(_)) => StatusCode::BAD_GATEWAY,
            AppError::Checkout(CheckoutError::Rejected(_)) => StatusCode::PAYMENT_REQUIRED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}
