use crate::domain::{Book, BookDraft, IsbnNumbers, NewBook, PendingKey};
use crate::ports::*;
use std::sync::Arc;
use std::time::Duration;

use super::errors::{BookApplicationError, NumberServiceUnavailable, Result};
use super::metrics::BookMetrics;

/// 採番サービス呼び出しのデフォルトのタイムアウト
pub const DEFAULT_NUMBER_TIMEOUT: Duration = Duration::from_millis(250);

/// サービスの依存関係
///
/// データ構造として定義し、振る舞いは持たない。
/// ワークフローの関数に明示的に渡される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_store: Arc<dyn BookStore>,
    pub number_provider: Arc<dyn NumberProvider>,
    pub pending_queue: Arc<dyn PendingQueue>,
    pub metrics: Arc<BookMetrics>,
    /// 採番サービスの応答を待つ上限
    pub number_timeout: Duration,
}

/// 書籍登録の結果
///
/// エラーでない2つの結果を区別する。失敗は `Err` で表す。
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    /// ISBNを取得してカタログに永続化した
    Created(Book),
    /// 採番できなかったため保留キューに退避した（カタログには未登録）
    Pending(PendingKey),
}

/// 重複を検出したときのエラーを組み立て、カウンタを進める
fn duplicate_book(metrics: &BookMetrics, candidate: &NewBook) -> BookApplicationError {
    let count = metrics.record_duplicate();
    tracing::info!(
        author = %candidate.author,
        title = %candidate.title,
        duplication_count = count,
        "Duplicate book registration rejected"
    );

    BookApplicationError::DuplicateBook {
        title: candidate.title.clone(),
        author: candidate.author.clone(),
    }
}

/// 同じ著者・タイトルの書籍が登録済みでないことを確認する
///
/// 完全一致で比較する。見つかった場合は重複カウンタを進めて
/// DuplicateBookを返す。それ以外の副作用はない。
async fn ensure_not_duplicate(deps: &ServiceDependencies, candidate: &NewBook) -> Result<()> {
    let exists = deps
        .book_store
        .exists_by_author_title(&candidate.author, &candidate.title)
        .await
        .map_err(BookApplicationError::BookStoreError)?;

    if exists {
        return Err(duplicate_book(&deps.metrics, candidate));
    }

    Ok(())
}

/// 採番サービスからISBNを取得する（タイムアウト付き、1回のみ）
async fn acquire_numbers(
    deps: &ServiceDependencies,
) -> std::result::Result<IsbnNumbers, NumberServiceUnavailable> {
    match tokio::time::timeout(
        deps.number_timeout,
        deps.number_provider.generate_isbn_numbers(),
    )
    .await
    {
        Ok(Ok(numbers)) => Ok(numbers),
        Ok(Err(e)) => Err(NumberServiceUnavailable::Unreachable(e)),
        Err(_) => Err(NumberServiceUnavailable::TimedOut(deps.number_timeout)),
    }
}

/// 書籍を登録する
///
/// 処理フロー：
/// 1. 入力のバリデーション
/// 2. 重複確認（同じ author, title）
/// 3. 採番サービスからISBNを取得（タイムアウト付き）
/// 4a. 取得できた場合：BookStoreにアトミックに永続化して Created を返す
/// 4b. 取得できなかった場合：保留キューに退避して Pending を返す
///
/// 採番サービスの障害はエラーにしない。保留キューへの書き込み失敗だけは
/// これ以上のフォールバックがないためサーバーエラーとして返す。
///
/// # 並行性
///
/// 手順2の確認と手順4aの永続化の間に別のリクエストが同じ書籍を登録した場合、
/// BookStoreのアトミックな挿入が衝突を検出し DuplicateBook となる。
///
/// # エラー
/// - Validation: 入力が不正
/// - DuplicateBook: 同じ著者・タイトルの書籍が登録済み
/// - PendingPersistFailure: 保留キューに書き込めない
/// - BookStoreError: BookStoreの障害
pub async fn register_book(
    deps: &ServiceDependencies,
    draft: BookDraft,
) -> Result<RegistrationOutcome> {
    // 1. バリデーション
    let candidate = NewBook::try_from(draft)?;

    // 2. 重複確認
    ensure_not_duplicate(deps, &candidate).await?;

    // 3. 採番
    let numbers = match acquire_numbers(deps).await {
        Ok(numbers) => numbers,
        Err(unavailable) => {
            tracing::warn!(
                author = %candidate.author,
                title = %candidate.title,
                "Number service unavailable, deferring registration: {}",
                unavailable
            );

            // 4b. 保留キューに退避
            let key = deps
                .pending_queue
                .append(&candidate)
                .await
                .map_err(BookApplicationError::PendingPersistFailure)?;

            tracing::info!(pending_key = %key, "Book stored as pending");
            return Ok(RegistrationOutcome::Pending(key));
        }
    };

    // 4a. 永続化
    let outcome = deps
        .book_store
        .insert_unique(candidate.clone(), numbers)
        .await
        .map_err(BookApplicationError::BookStoreError)?;

    match outcome {
        InsertOutcome::Inserted(book) => {
            tracing::info!(book_id = %book.id, "Book registered");
            Ok(RegistrationOutcome::Created(book))
        }
        InsertOutcome::Duplicate => Err(duplicate_book(&deps.metrics, &candidate)),
    }
}
