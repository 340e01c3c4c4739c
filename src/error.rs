//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Товар не найден")]
    ProductNotFound(i32),
    #[error("Связанная запись не найдена")]
    InvalidReference { field: &'static str, id: i32 },
    #[error("Ошибка при получении данных")]
    Query(#[from] sqlx::Error),
    #[error("Ошибка при обновлении товара")]
    UpdateFailed(#[source] sqlx::Error),
    #[error("Ошибка при обработке запроса, попробуйте позже")]
    Internal(String),
    #[error("Раздел находится в разработке")]
    NotImplemented(&'static str),
    #[error("Некорректные данные запроса")]
    InvalidBody { status: StatusCode, reason: String },
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Query(_) | AppError::UpdateFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::InvalidBody { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ProductNotFound(_) => "product_not_found",
            AppError::InvalidReference { .. } => "invalid_reference",
            AppError::Query(_) => "database_error",
            AppError::UpdateFailed(_) => "update_failed",
            AppError::Internal(_) => "internal_error",
            AppError::NotImplemented(_) => "not_implemented",
            AppError::InvalidBody { .. } => "invalid_body",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::ProductNotFound(id) => Some(serde_json::json!({ "id": id })),
            AppError::InvalidReference { field, id } => Some(serde_json::json!({ "field": field, "id": id })),
            AppError::NotImplemented(path) => Some(serde_json::json!({ "path": path })),
            AppError::InvalidBody { reason, .. } => Some(serde_json::json!({ "reason": reason })),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Query(e) | AppError::UpdateFailed(e) => {
                tracing::error!(code = self.code(), error = %e, "storage failure");
            }
            AppError::Internal(reason) => {
                tracing::error!(code = self.code(), %reason, "unhandled failure");
            }
            _ => tracing::debug!(code = self.code(), "request rejected"),
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_have_distinct_codes() {
        let errors = [
            AppError::ProductNotFound(1),
            AppError::InvalidReference { field: "order_id", id: 9 },
            AppError::Query(sqlx::Error::PoolTimedOut),
            AppError::UpdateFailed(sqlx::Error::PoolTimedOut),
            AppError::Internal("lock poisoned".into()),
            AppError::NotImplemented("/storekeeper/sale-form"),
            AppError::InvalidBody {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                reason: "missing field `id`".into(),
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(AppError::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn storage_and_unhandled_failures_use_different_messages() {
        let update = AppError::UpdateFailed(sqlx::Error::PoolClosed);
        let other = AppError::Internal("boom".into());
        assert_eq!(update.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(update.to_string(), "Ошибка при обновлении товара");
        assert_eq!(other.to_string(), "Ошибка при обработке запроса, попробуйте позже");
    }

    #[test]
    fn not_found_is_a_client_error() {
        let err = AppError::ProductNotFound(42);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Товар не найден");
        assert_eq!(err.details(), Some(serde_json::json!({ "id": 42 })));
    }
}
