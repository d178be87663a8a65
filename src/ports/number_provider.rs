use crate::domain::IsbnNumbers;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 採番サービスポート
///
/// 新しい書籍のISBN番号を外部サービスから取得する。
/// 応答が遅い、または到達できないことがある。
/// リトライは行わない（1回の呼び出しのみ）。
#[async_trait]
pub trait NumberProvider: Send + Sync {
    /// ISBN-13 / ISBN-10 を生成する
    async fn generate_isbn_numbers(&self) -> Result<IsbnNumbers>;
}
