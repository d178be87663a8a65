use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::maintenance::MaintenanceState;
use crate::domain::{Book, BookDraft, BookId, BookValidationError, commands::UpdateBook};
use crate::ports::PendingEntry;

/// 書籍リクエスト（POST /books と PUT /books）
///
/// 必須項目の欠落はバリデーションで検出するため、文字列はデフォルト値で受け取る。
/// null や型の合わない値はデコードに失敗し、ハンドラーで400に変換される。
/// POSTではid/isbnは無視される。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    #[serde(default)]
    pub author: String,
    pub year_of_publication: Option<i32>,
    pub nb_of_pages: Option<i32>,
    pub rank: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub small_image_url: Option<String>,
    pub medium_image_url: Option<String>,
    pub description: Option<String>,
}

impl BookRequest {
    /// 登録用の未検証入力に変換する
    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            year_of_publication: self.year_of_publication,
            nb_of_pages: self.nb_of_pages,
            rank: self.rank,
            price: self.price,
            small_image_url: self.small_image_url.clone(),
            medium_image_url: self.medium_image_url.clone(),
            description: self.description.clone(),
        }
    }

    /// 更新コマンドに変換する（idは必須）
    pub fn to_update_command(&self) -> Result<UpdateBook, BookValidationError> {
        let id = self.id.ok_or(BookValidationError::Missing("id"))?;

        Ok(UpdateBook {
            id: BookId::from_uuid(id),
            contents: self.to_draft(),
            isbn13: self.isbn13.clone(),
            isbn10: self.isbn10.clone(),
        })
    }
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    pub author: String,
    pub year_of_publication: i32,
    pub nb_of_pages: Option<i32>,
    pub rank: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub small_image_url: Option<String>,
    pub medium_image_url: Option<String>,
    pub description: Option<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            isbn13: book.isbn13,
            isbn10: book.isbn10,
            author: book.author,
            year_of_publication: book.year_of_publication,
            nb_of_pages: book.nb_of_pages,
            rank: book.rank.map(i32::from),
            price: book.price,
            small_image_url: book.small_image_url,
            medium_image_url: book.medium_image_url,
            description: book.description,
        }
    }
}

/// 保留中の書籍レスポンス（GET /books/pending）
///
/// ISBNは持たない。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBookResponse {
    pub pending_key: String,
    pub title: String,
    pub author: String,
    pub year_of_publication: i32,
    pub nb_of_pages: Option<i32>,
    pub rank: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub small_image_url: Option<String>,
    pub medium_image_url: Option<String>,
    pub description: Option<String>,
}

impl From<PendingEntry> for PendingBookResponse {
    fn from(entry: PendingEntry) -> Self {
        let book = entry.book;
        Self {
            pending_key: entry.key.as_str().to_string(),
            title: book.title,
            author: book.author,
            year_of_publication: book.year_of_publication,
            nb_of_pages: book.nb_of_pages,
            rank: book.rank.map(i32::from),
            price: book.price,
            small_image_url: book.small_image_url,
            medium_image_url: book.medium_image_url,
            description: book.description,
        }
    }
}

/// 件数レスポンス（GET /books/count）
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    #[serde(rename = "book.count")]
    pub book_count: u64,
}

/// メンテナンス状態レスポンス（GET /maintenance）
#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceStatusResponse {
    pub is_open: bool,
    pub changed_at: DateTime<Utc>,
}

impl From<MaintenanceState> for MaintenanceStatusResponse {
    fn from(state: MaintenanceState) -> Self {
        Self {
            is_open: state.is_open,
            changed_at: state.changed_at,
        }
    }
}

/// メンテナンス中レスポンス（503）
#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub reason: String,
}

/// 設定変更リクエスト（PUT /maintenance/config）
#[derive(Debug, Deserialize)]
pub struct ConfigChangeRequest {
    pub key: String,
    pub value: String,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
