use crate::domain::{Book, BookId, IsbnNumbers, NewBook};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 一意性を保った挿入の結果
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// 挿入された（IDはストアが採番）
    Inserted(Book),
    /// 同じ (author, title) の書籍が既に存在した
    Duplicate,
}

/// 更新の結果
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Book),
    NotFound,
    /// 更新後の (author, title) が別の書籍と衝突する
    Duplicate,
}

/// 書籍ストアポート
///
/// カタログの永続化を抽象化する。
/// 不変条件: (author, title) の組が同じ書籍を2冊以上保持しない。
#[async_trait]
pub trait BookStore: Send + Sync {
    /// 同じ著者・タイトルの書籍が存在するか確認する
    ///
    /// 文字列の完全一致で比較する（大文字小文字や空白の正規化はしない）。
    async fn exists_by_author_title(&self, author: &str, title: &str) -> Result<bool>;

    /// 重複がなければ書籍を挿入する
    ///
    /// 重複確認と挿入は1つのアトミックな単位で行われる。
    /// 同じ (author, title) の並行登録はどちらか一方しか成功しない。
    async fn insert_unique(
        &self,
        candidate: NewBook,
        numbers: IsbnNumbers,
    ) -> Result<InsertOutcome>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 全書籍を取得する
    async fn list_all(&self) -> Result<Vec<Book>>;

    /// 既存の書籍を置き換える
    async fn update(&self, book: Book) -> Result<UpdateOutcome>;

    /// IDで書籍を削除する
    ///
    /// 削除した場合は true、存在しなかった場合は false を返す。
    async fn delete(&self, id: BookId) -> Result<bool>;

    /// 登録されている書籍の件数
    async fn count(&self) -> Result<u64>;

    /// ランダムに1冊取得する（空の場合は None）
    async fn random(&self) -> Result<Option<Book>>;
}
