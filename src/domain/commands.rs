use super::{BookDraft, BookId};

/// コマンド：既存の書籍を更新する
///
/// ISBNは採番済みの値を呼び出し側がそのまま送り返す。
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBook {
    pub id: BookId,
    pub contents: BookDraft,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
}
