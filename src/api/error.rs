use crate::application::book::BookApplicationError;
use crate::domain::BookValidationError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーと、リクエスト本文を解釈できなかったことを
/// ラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Application(BookApplicationError),
    /// JSONとして読めない、または型が合わない本文（null、文字列の年、i32に収まらない数値など）
    InvalidBody(JsonRejection),
}

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl From<BookValidationError> for ApiError {
    fn from(err: BookValidationError) -> Self {
        ApiError::Application(BookApplicationError::Validation(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Application(err) => err,
            // 400 Bad Request - 本文の形式不正も入力不正として扱う
            ApiError::InvalidBody(rejection) => {
                let body = Json(ErrorResponse::new(
                    "VALIDATION_ERROR",
                    rejection.body_text(),
                ));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
        };

        let (status, error_type, message) = match err {
            // 400 Bad Request - 入力不正・重複
            ref err @ BookApplicationError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.to_string(),
            ),
            ref err @ BookApplicationError::DuplicateBook { .. } => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_BOOK", err.to_string())
            }

            // 404 Not Found - リクエストされたリソースが存在しない
            BookApplicationError::BookNotFound => (
                StatusCode::NOT_FOUND,
                "BOOK_NOT_FOUND",
                "Book not found".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            BookApplicationError::PendingPersistFailure(ref e) => {
                tracing::error!("Pending queue write error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PENDING_PERSIST_FAILURE",
                    "Failed to store pending book".to_string(),
                )
            }
            BookApplicationError::PendingQueueError(ref e) => {
                tracing::error!("Pending queue read error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PENDING_QUEUE_ERROR",
                    "Failed to read pending books".to_string(),
                )
            }
            BookApplicationError::BookStoreError(ref e) => {
                tracing::error!("Book store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "BOOK_STORE_ERROR",
                    "Book store error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
