use crate::application::rental::RentalApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{auth::TokenIssueError, types::ErrorResponse};

/// API層のエラー型
///
/// アプリケーション層のエラーと認証エラーをHTTPレスポンスにマッピングする。
#[derive(Debug)]
pub enum ApiError {
    Application(RentalApplicationError),
    /// トークンがない、または検証に失敗した
    Unauthorized,
    /// トークンのメールアドレスがリクエスト対象と一致しない
    Forbidden,
    /// トークン発行に失敗した
    TokenIssue(TokenIssueError),
}

impl From<RentalApplicationError> for ApiError {
    fn from(err: RentalApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 400 Bad Request
            // 重複予約のみJSONではなく固定文字列を本文にする
            ApiError::Application(e @ RentalApplicationError::DuplicateBooking) => {
                return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
            }
            ApiError::Application(ref e @ RentalApplicationError::InvalidStatus(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_STATUS", e.to_string())
            }
            ApiError::Application(ref e @ RentalApplicationError::InvalidQuery(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_QUERY", e.to_string())
            }

            // 401 / 403
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized access".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Forbidden access".to_string(),
            ),

            // 404 Not Found
            ApiError::Application(ref e @ RentalApplicationError::CarNotFound) => {
                (StatusCode::NOT_FOUND, "CAR_NOT_FOUND", e.to_string())
            }
            ApiError::Application(ref e @ RentalApplicationError::BookingNotFound) => {
                (StatusCode::NOT_FOUND, "BOOKING_NOT_FOUND", e.to_string())
            }

            // 422 Unprocessable Entity - 状態遷移違反
            ApiError::Application(ref e @ RentalApplicationError::InvalidTransition { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_TRANSITION",
                e.to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Application(RentalApplicationError::CarInventoryError(ref e)) => {
                tracing::error!("Car inventory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CAR_INVENTORY_ERROR",
                    "Failed to access car inventory".to_string(),
                )
            }
            ApiError::Application(RentalApplicationError::BookingStoreError(ref e)) => {
                tracing::error!("Booking store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BOOKING_STORE_ERROR",
                    "Failed to access bookings".to_string(),
                )
            }
            ApiError::TokenIssue(ref e) => {
                tracing::error!("Token encoding failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TOKEN_ERROR",
                    "Failed to issue token".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
