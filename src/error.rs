use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input, caught before any write
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Role or verification-status precondition unmet
    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Operation attempted from a state that does not permit it
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("promo code not found")]
    PromoNotFound,

    #[error("promo code has expired")]
    PromoExpired,

    #[error("promo code has no uses left")]
    PromoDepleted,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    /// Stable machine-readable code for client dispatch
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::AccessDenied(_) => "access_denied",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::InvalidStateTransition(_) => "invalid_state_transition",
            AppError::PromoNotFound => "promo_not_found",
            AppError::PromoExpired => "promo_expired",
            AppError::PromoDepleted => "promo_depleted",
            AppError::Internal(_) => "internal_error",
            AppError::Database(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::PromoNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InvalidStateTransition(_) => StatusCode::CONFLICT,
            AppError::PromoExpired | AppError::PromoDepleted => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs, not in the response body
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                "Internal server error".to_string()
            }
            AppError::Database(err) => {
                tracing::error!(%err, "database error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}
