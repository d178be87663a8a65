use crate::domain::{Book, BookId, NewBook, commands::UpdateBook};
use crate::ports::*;

use super::book_service::ServiceDependencies;
use super::errors::{BookApplicationError, Result};

/// 全書籍を取得する
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_store
        .list_all()
        .await
        .map_err(BookApplicationError::BookStoreError)
}

/// 書籍の件数を取得する
pub async fn count_books(deps: &ServiceDependencies) -> Result<u64> {
    deps.book_store
        .count()
        .await
        .map_err(BookApplicationError::BookStoreError)
}

/// IDで書籍を取得する
pub async fn find_book(deps: &ServiceDependencies, id: BookId) -> Result<Book> {
    deps.book_store
        .get_by_id(id)
        .await
        .map_err(BookApplicationError::BookStoreError)?
        .ok_or(BookApplicationError::BookNotFound)
}

/// ランダムに1冊取得する
///
/// カタログが空の場合は BookNotFound。
pub async fn find_random_book(deps: &ServiceDependencies) -> Result<Book> {
    deps.book_store
        .random()
        .await
        .map_err(BookApplicationError::BookStoreError)?
        .ok_or(BookApplicationError::BookNotFound)
}

/// 既存の書籍を更新する
///
/// 登録と同じバリデーションを行う。更新後の (author, title) が
/// 別の書籍と衝突する場合は DuplicateBook。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    let contents = NewBook::try_from(cmd.contents)?;
    let book = Book::with_contents(cmd.id, contents, cmd.isbn13, cmd.isbn10)?;

    let outcome = deps
        .book_store
        .update(book.clone())
        .await
        .map_err(BookApplicationError::BookStoreError)?;

    match outcome {
        UpdateOutcome::Updated(updated) => Ok(updated),
        UpdateOutcome::NotFound => Err(BookApplicationError::BookNotFound),
        UpdateOutcome::Duplicate => {
            deps.metrics.record_duplicate();
            Err(BookApplicationError::DuplicateBook {
                title: book.title,
                author: book.author,
            })
        }
    }
}

/// IDで書籍を削除する（存在しなくても成功）
pub async fn delete_book(deps: &ServiceDependencies, id: BookId) -> Result<()> {
    let deleted = deps
        .book_store
        .delete(id)
        .await
        .map_err(BookApplicationError::BookStoreError)?;

    if deleted {
        tracing::info!(book_id = %id, "Book deleted");
    }

    Ok(())
}

/// 保留中の書籍を一覧する（読み取り専用、何度呼んでも同じ結果）
pub async fn find_pending_books(deps: &ServiceDependencies) -> Result<Vec<PendingEntry>> {
    deps.pending_queue
        .list_pending()
        .await
        .map_err(BookApplicationError::PendingQueueError)
}
