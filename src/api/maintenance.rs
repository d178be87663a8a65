use crate::application::maintenance::MaintenanceGate;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::MaintenanceResponse;

/// メンテナンス中に返す理由
pub const MAINTENANCE_REASON: &str = "Service currently in maintenance";

/// メンテナンス中のため処理しなかったことを示すレスポンス（503）
#[derive(Debug)]
pub struct MaintenanceClosed;

impl IntoResponse for MaintenanceClosed {
    fn into_response(self) -> Response {
        let body = Json(MaintenanceResponse {
            reason: MAINTENANCE_REASON.to_string(),
        });
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

/// 保護されたリソースへのリクエストの前にゲートを確認するミドルウェア
///
/// CLOSEDの場合はハンドラーを実行せずに503を返す。
pub async fn check_maintenance(
    State(gate): State<Arc<MaintenanceGate>>,
    request: Request,
    next: Next,
) -> Response {
    if !gate.is_open() {
        tracing::warn!(
            method = %request.method(),
            uri = %request.uri(),
            "SERVICE_UNAVAILABLE, site in maintenance"
        );
        return MaintenanceClosed.into_response();
    }

    next.run(request).await
}
