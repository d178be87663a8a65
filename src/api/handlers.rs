use crate::application::book::{
    self as book_app, RegistrationOutcome, ServiceDependencies, register_book,
};
use crate::application::maintenance::{ConfigChange, MaintenanceGate};
use crate::domain::BookId;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        BookRequest, BookResponse, ConfigChangeRequest, CountResponse, MaintenanceStatusResponse,
        PendingBookResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    /// メンテナンスゲート（読み取り専用で参照する）
    pub gate: Arc<MaintenanceGate>,
    /// 設定変更の通知チャネル
    pub config_changes: mpsc::Sender<ConfigChange>,
}

// ============================================================================
// Command handlers
// ============================================================================

/// POST /books - 書籍を登録
///
/// - 201 Created: ISBNを取得して登録した（Locationヘッダー付き）
/// - 202 Accepted: 採番サービスが利用できず保留キューに退避した（本文なし）
/// - 400 Bad Request: 入力不正（本文の形式不正を含む）、または同じ著者・タイトルの書籍が登録済み
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    let outcome = register_book(&state.service_deps, req.to_draft()).await?;

    let response = match outcome {
        RegistrationOutcome::Created(book) => {
            let location = book.location();
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(BookResponse::from(book)),
            )
                .into_response()
        }
        RegistrationOutcome::Pending(_) => StatusCode::ACCEPTED.into_response(),
    };

    Ok(response)
}

/// PUT /books - 既存の書籍を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let Json(req) = body?;
    let cmd = req.to_update_command()?;
    let book = book_app::update_book(&state.service_deps, cmd).await?;

    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を削除（存在しなくても204）
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    book_app::delete_book(&state.service_deps, BookId::from_uuid(id)).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books - 全書籍を取得
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = book_app::list_books(&state.service_deps).await?;

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/count - 書籍の件数を取得
pub async fn count_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, ApiError> {
    let book_count = book_app::count_books(&state.service_deps).await?;

    Ok(Json(CountResponse { book_count }))
}

/// GET /books/random - ランダムに1冊取得（空の場合は404）
pub async fn get_random_book(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = book_app::find_random_book(&state.service_deps).await?;

    Ok(Json(BookResponse::from(book)))
}

/// GET /books/:id - 書籍をIDで取得
pub async fn get_book_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = book_app::find_book(&state.service_deps, BookId::from_uuid(id)).await?;

    Ok(Json(BookResponse::from(book)))
}

/// GET /books/pending - 登録待ちの書籍を一覧
///
/// 保留キューからは削除しない。
pub async fn list_pending_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PendingBookResponse>>, ApiError> {
    let entries = book_app::find_pending_books(&state.service_deps).await?;

    Ok(Json(
        entries.into_iter().map(PendingBookResponse::from).collect(),
    ))
}

// ============================================================================
// Maintenance handlers
// ============================================================================

/// GET /maintenance - メンテナンスゲートの現在の状態
pub async fn get_maintenance_status(
    State(state): State<Arc<AppState>>,
) -> Json<MaintenanceStatusResponse> {
    Json(MaintenanceStatusResponse::from(state.gate.state()))
}

/// PUT /maintenance/config - 設定変更を通知する
///
/// 変更は監視タスクが非同期に検証・反映する。受け付けた時点で202を返す。
pub async fn publish_config_change(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfigChangeRequest>,
) -> StatusCode {
    let change = ConfigChange::new(req.key, req.value);

    match state.config_changes.send(change).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Config change observer is not running: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
