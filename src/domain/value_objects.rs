use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::BookValidationError;

/// 書籍ID - カタログの集約ID
///
/// 永続化時にBookStoreが採番する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 評価ランク
///
/// 不変条件：1〜10の範囲（両端を含む）
/// 型システムでこの制約を強制し、範囲外の値を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rank(u8);

impl Rank {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 10;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Rank {
    type Error = BookValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(BookValidationError::RankOutOfRange(value));
        }
        Ok(Self(value as u8))
    }
}

impl From<Rank> for i32 {
    fn from(rank: Rank) -> Self {
        rank.0 as i32
    }
}

/// ISBNとして保存できる最大文字数
pub const MAX_ISBN_LENGTH: usize = 32;

/// ISBN番号（採番サービスから取得した番号の組）
///
/// 不変条件：isbn13, isbn10ともに空白でなく、MAX_ISBN_LENGTH以下。
/// `new` 以外から構築できないよう、serdeは実装しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsbnNumbers {
    isbn13: String,
    isbn10: String,
}

impl IsbnNumbers {
    /// 空白のみ、または長すぎる番号は採番失敗とみなす
    pub fn new(
        isbn13: impl Into<String>,
        isbn10: impl Into<String>,
    ) -> Result<Self, BookValidationError> {
        let isbn13 = isbn13.into();
        let isbn10 = isbn10.into();

        if isbn13.trim().is_empty() {
            return Err(BookValidationError::Blank("isbn13"));
        }
        if isbn10.trim().is_empty() {
            return Err(BookValidationError::Blank("isbn10"));
        }
        BookValidationError::check_length("isbn13", &isbn13, MAX_ISBN_LENGTH)?;
        BookValidationError::check_length("isbn10", &isbn10, MAX_ISBN_LENGTH)?;

        Ok(Self { isbn13, isbn10 })
    }

    pub fn isbn13(&self) -> &str {
        &self.isbn13
    }

    pub fn isbn10(&self) -> &str {
        &self.isbn10
    }
}

/// 保留エントリのキー
///
/// 作成時刻（ミリ秒）と単調増加のシーケンスから生成される。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingKey(String);

impl PendingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
