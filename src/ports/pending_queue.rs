use crate::domain::{NewBook, PendingKey};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 保留エントリ
///
/// 採番に失敗した書籍のスナップショット。ISBNは持たない。
/// 一度書き込まれたら変更されない。
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub key: PendingKey,
    pub book: NewBook,
}

/// 保留キューポート
///
/// 追記専用のログ。エントリは読み取りで削除されない。
/// BookStoreへの反映（リコンシリエーション）は運用側で別途行う。
#[async_trait]
pub trait PendingQueue: Send + Sync {
    /// 書籍を新しいエントリとして追記する
    ///
    /// 既存のエントリを上書きしない。一意なキーを返す。
    async fn append(&self, book: &NewBook) -> Result<PendingKey>;

    /// 保存されているすべてのエントリを取得する
    ///
    /// 読めないエントリや壊れたエントリは警告を出してスキップする。
    /// 一部の失敗で一覧全体を失敗させない。
    async fn list_pending(&self) -> Result<Vec<PendingEntry>>;
}
