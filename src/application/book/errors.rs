use crate::domain::BookValidationError;
use thiserror::Error;

/// 書籍管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// 入力が不正（副作用の前に検出）
    #[error("Invalid book: {0}")]
    Validation(#[from] BookValidationError),

    /// 同じ著者・タイトルの書籍が既に登録されている
    #[error("Book {title} from {author} already registered")]
    DuplicateBook { title: String, author: String },

    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 保留キューへの書き込み失敗（これ以上のフォールバックはない）
    #[error("Failed to persist pending book")]
    PendingPersistFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 保留キューの読み取り失敗
    #[error("Failed to read pending books")]
    PendingQueueError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BookStoreのエラー
    #[error("Book store error")]
    BookStoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// 採番サービスを利用できなかった理由
///
/// ワークフロー内部のシグナルであり、呼び出し側にはエラーとして返さない。
/// 保留パスへの切り替えに使われる。
#[derive(Debug, Error)]
pub(super) enum NumberServiceUnavailable {
    #[error("number service did not respond within {0:?}")]
    TimedOut(std::time::Duration),

    #[error("number service unreachable: {0}")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
