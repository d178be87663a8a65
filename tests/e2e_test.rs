use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use bookstore_catalog::adapters::mock::number_provider::{Behavior, MOCK_ISBN_10, MOCK_ISBN_13};
use bookstore_catalog::api::handlers::AppState;
use bookstore_catalog::api::maintenance::MAINTENANCE_REASON;
use bookstore_catalog::api::router::create_router;
use bookstore_catalog::api::types::*;
use bookstore_catalog::application::maintenance::{
    MAINTENANCE_KEY, MaintenanceGate, spawn_config_observer,
};
use bookstore_catalog::domain::BookId;
use bookstore_catalog::ports::{BookStore, PendingQueue};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

mod common;

use common::TestAdapters;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// E2Eテスト用のアプリケーション一式
///
/// モックのストアと採番サービス、一時ディレクトリの保留キュー、
/// 実際のAPIルーターと設定変更の監視タスクを使用します。
struct TestApp {
    router: axum::Router,
    adapters: TestAdapters,
    gate: Arc<MaintenanceGate>,
    _pending_dir: TempDir,
}

fn setup_e2e_app() -> TestApp {
    let pending_dir = tempfile::tempdir().unwrap();
    let adapters = TestAdapters::new(pending_dir.path());
    let gate = Arc::new(MaintenanceGate::new(true));

    let (config_changes, receiver) = mpsc::channel(16);
    spawn_config_observer(gate.clone(), receiver);

    let app_state = Arc::new(AppState {
        service_deps: adapters.service_deps(),
        gate: gate.clone(),
        config_changes,
    });

    TestApp {
        router: create_router(app_state),
        adapters,
        gate,
        _pending_dir: pending_dir,
    }
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn book_json(author: &str, title: &str) -> Value {
    json!({
        "title": title,
        "author": author,
        "yearOfPublication": 2021,
        "nbOfPages": 320,
        "rank": 7,
        "price": 12.5,
        "description": "A book about books",
    })
}

/// 監視タスクが設定変更を反映するまで待つ
async fn wait_for_gate(gate: &MaintenanceGate, expected_open: bool) {
    for _ in 0..100 {
        if gate.is_open() == expected_open {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("gate did not become is_open={}", expected_open);
}

// ============================================================================
// E2Eテスト: 登録フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_registration_flow() {
    let app = setup_e2e_app();

    // Step 1: 採番サービス正常 → 201 Created
    let response = send(&app.router, "POST", "/books", Some(book_json("A", "T1"))).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let body = read_body(response).await;
    let created: BookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(location, format!("/books/{}", created.id));
    assert_eq!(created.title, "T1");
    assert_eq!(created.author, "A");
    assert_eq!(created.isbn13.as_deref(), Some(MOCK_ISBN_13));
    assert_eq!(created.isbn10.as_deref(), Some(MOCK_ISBN_10));

    // Step 2: 同じ著者・タイトルの再登録 → 400
    let response = send(&app.router, "POST", "/books", Some(book_json("A", "T1"))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_body(response).await;
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "DUPLICATE_BOOK");
    assert_eq!(error.message, "Book T1 from A already registered");
    assert_eq!(app.adapters.metrics.duplication_count(), 1);

    // Step 3: 採番サービス停止中 → 202 Accepted（本文なし）
    app.adapters
        .number_provider
        .set_behavior(Behavior::Unavailable);
    let response = send(&app.router, "POST", "/books", Some(book_json("B", "T2"))).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(read_body(response).await.is_empty());

    // Step 4: 保留中の書籍にB/T2が1件（ISBNなし）
    let response = send(&app.router, "GET", "/books/pending", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let pending: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["title"], "T2");
    assert_eq!(pending[0]["author"], "B");
    assert!(pending[0]["pendingKey"].is_string());
    assert!(pending[0].get("isbn13").is_none());
    assert!(pending[0].get("isbn10").is_none());

    // Step 5: 件数は変わらない
    let response = send(&app.router, "GET", "/books/count", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let count: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(count, json!({ "book.count": 1 }));

    // Step 6: 登録済みの書籍を取得
    let response = send(&app.router, "GET", &location, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let fetched: BookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.rank, Some(7));
    assert_eq!(fetched.description.as_deref(), Some("A book about books"));
}

#[tokio::test]
async fn test_e2e_pending_listing_does_not_consume() {
    let app = setup_e2e_app();
    app.adapters
        .number_provider
        .set_behavior(Behavior::Unavailable);

    send(&app.router, "POST", "/books", Some(book_json("B", "T2"))).await;
    send(&app.router, "POST", "/books", Some(book_json("C", "T3"))).await;

    for _ in 0..2 {
        let response = send(&app.router, "GET", "/books/pending", None).await;
        let body = read_body(response).await;
        let pending: Vec<PendingBookResponse> = serde_json::from_slice(&body).unwrap();

        let titles: Vec<&str> = pending.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["T2", "T3"]);
    }
}

// ============================================================================
// E2Eテスト: カタログ操作
// ============================================================================

#[tokio::test]
async fn test_e2e_update_and_delete() {
    let app = setup_e2e_app();

    let response = send(&app.router, "POST", "/books", Some(book_json("A", "T1"))).await;
    let body = read_body(response).await;
    let created: BookResponse = serde_json::from_slice(&body).unwrap();

    // 更新（ISBNは保持される）
    let mut update = book_json("A", "T1 (2nd edition)");
    update["id"] = json!(created.id);
    update["isbn13"] = json!(created.isbn13);
    update["isbn10"] = json!(created.isbn10);
    let response = send(&app.router, "PUT", "/books", Some(update)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let updated: BookResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "T1 (2nd edition)");
    assert_eq!(updated.isbn13, created.isbn13);

    // 削除は冪等
    let uri = format!("/books/{}", created.id);
    let response = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app.router, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app.router, "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_list_and_random() {
    let app = setup_e2e_app();

    // 空の場合、ランダム取得は404
    let response = send(&app.router, "GET", "/books/random", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    send(&app.router, "POST", "/books", Some(book_json("A", "T1"))).await;
    send(&app.router, "POST", "/books", Some(book_json("B", "T2"))).await;

    let response = send(&app.router, "GET", "/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let books: Vec<BookResponse> = serde_json::from_slice(&body).unwrap();
    assert_eq!(books.len(), 2);

    let response = send(&app.router, "GET", "/books/random", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let random: BookResponse = serde_json::from_slice(&body).unwrap();
    assert!(books.iter().any(|b| b.id == random.id));
}

// ============================================================================
// E2Eテスト: 異常系
// ============================================================================

#[tokio::test]
async fn test_e2e_validation_errors() {
    let app = setup_e2e_app();

    // タイトルなし
    let response = send(
        &app.router,
        "POST",
        "/books",
        Some(json!({ "author": "A", "yearOfPublication": 2021 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_body(response).await;
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.error, "VALIDATION_ERROR");

    // ランク範囲外
    let mut book = book_json("A", "T1");
    book["rank"] = json!(11);
    let response = send(&app.router, "POST", "/books", Some(book)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 更新時のid欠落
    let response = send(&app.router, "PUT", "/books", Some(book_json("A", "T1"))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 存在しない書籍の更新
    let mut update = book_json("A", "T1");
    update["id"] = json!(uuid::Uuid::new_v4());
    let response = send(&app.router, "PUT", "/books", Some(update)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 副作用なし
    assert_eq!(app.adapters.number_provider.calls(), 0);
}

#[tokio::test]
async fn test_e2e_malformed_fields_are_validation_errors() {
    let app = setup_e2e_app();

    let mut null_title = book_json("A", "T1");
    null_title["title"] = Value::Null;
    let mut null_author = book_json("A", "T1");
    null_author["author"] = Value::Null;
    let mut year_as_string = book_json("A", "T1");
    year_as_string["yearOfPublication"] = json!("1999");
    let mut rank_overflow = book_json("A", "T1");
    rank_overflow["rank"] = json!(3_000_000_000_i64);

    for body in [null_title, null_author, year_as_string, rank_overflow] {
        for method in ["POST", "PUT"] {
            let response = send(&app.router, method, "/books", Some(body.clone())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, body);

            let bytes = read_body(response).await;
            let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error.error, "VALIDATION_ERROR");
            assert!(!error.message.is_empty());
        }
    }

    assert_eq!(app.adapters.number_provider.calls(), 0);
    assert!(
        app.adapters
            .pending_queue
            .list_pending()
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_e2e_values_beyond_storage_limits_are_rejected() {
    let app = setup_e2e_app();

    let too_long = book_json("A", &"t".repeat(300));
    let mut too_expensive = book_json("A", "T1");
    too_expensive["price"] = json!(10_000_000_000.0);

    // 採番サービスが停止していても保留キューには入らない
    app.adapters
        .number_provider
        .set_behavior(Behavior::Unavailable);

    for body in [too_long, too_expensive] {
        let response = send(&app.router, "POST", "/books", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = read_body(response).await;
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error.error, "VALIDATION_ERROR");
    }

    assert_eq!(app.adapters.number_provider.calls(), 0);
    assert!(
        app.adapters
            .pending_queue
            .list_pending()
            .await
            .unwrap()
            .is_empty()
    );
}

// ============================================================================
// E2Eテスト: メンテナンスゲート
// ============================================================================

#[tokio::test]
async fn test_e2e_maintenance_gate() {
    let app = setup_e2e_app();

    // 閉じる前に1冊登録しておく
    let response = send(&app.router, "POST", "/books", Some(book_json("A", "T1"))).await;
    let body = read_body(response).await;
    let existing: BookResponse = serde_json::from_slice(&body).unwrap();
    let existing_uri = format!("/books/{}", existing.id);
    let calls_before = app.adapters.number_provider.calls();

    // CLOSEDにする
    let change = json!({ "key": MAINTENANCE_KEY, "value": "false" });
    let response = send(&app.router, "PUT", "/maintenance/config", Some(change)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_gate(&app.gate, false).await;

    // 保護されたリソースは503
    let mut update = book_json("A", "T1 (2nd edition)");
    update["id"] = json!(existing.id);

    for (method, uri, body) in [
        ("GET", "/books".to_string(), None),
        ("GET", "/books/count".to_string(), None),
        ("GET", "/books/pending".to_string(), None),
        ("GET", "/books/random".to_string(), None),
        ("GET", existing_uri.clone(), None),
        ("POST", "/books".to_string(), Some(book_json("B", "T2"))),
        ("PUT", "/books".to_string(), Some(update)),
        ("DELETE", existing_uri.clone(), None),
    ] {
        let response = send(&app.router, method, &uri, body).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{} {}", method, uri);

        let body = read_body(response).await;
        let closed: MaintenanceResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(closed.reason, MAINTENANCE_REASON);
    }

    // ハンドラーは実行されていない（登録・更新・削除のいずれもストアに届いていない）
    assert_eq!(app.adapters.number_provider.calls(), calls_before);
    let stored = app
        .adapters
        .book_store
        .get_by_id(BookId::from_uuid(existing.id))
        .await
        .unwrap();
    assert_eq!(stored.map(|b| b.title), Some("T1".to_string()));
    assert_eq!(app.adapters.book_store.count().await.unwrap(), 1);

    // ヘルスチェックと状態確認は利用できる
    let response = send(&app.router, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app.router, "GET", "/maintenance", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    let status: MaintenanceStatusResponse = serde_json::from_slice(&body).unwrap();
    assert!(!status.is_open);

    // OPENに戻す
    let change = json!({ "key": MAINTENANCE_KEY, "value": "true" });
    let response = send(&app.router, "PUT", "/maintenance/config", Some(change)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_gate(&app.gate, true).await;

    let response = send(&app.router, "GET", "/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
