//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Palette error: {0}")]
    Palette(#[from] colorpixel_core::Error),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Unknown dropper: {0}")]
    UnknownDropper(String),

    #[error("Invalid point: {0}")]
    InvalidPoint(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::UnknownDropper(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidPoint(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Config(_) | AppError::Palette(_) | AppError::Capture(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        (status, message).into_response()
    }
}
