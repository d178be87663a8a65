use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, BookValidationError, IsbnNumbers, MAX_ISBN_LENGTH, Rank};

/// 説明文の最大文字数
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
/// タイトル・著者名の最大文字数
pub const MAX_NAME_LENGTH: usize = 255;
/// 画像URLの最大文字数
pub const MAX_URL_LENGTH: usize = 2048;
/// 価格の精度（小数点以下の桁数）
pub const PRICE_SCALE: u32 = 2;

/// 価格の絶対値の上限（この値未満）。NUMERIC(12, 2) に収まる範囲
pub fn max_price() -> Decimal {
    Decimal::from(10_000_000_000_i64)
}

/// 未検証の書籍入力
///
/// API層から渡される生の値。`NewBook::try_from` で検証されるまで
/// ワークフローには渡されない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year_of_publication: Option<i32>,
    pub nb_of_pages: Option<i32>,
    pub rank: Option<i32>,
    pub price: Option<Decimal>,
    pub small_image_url: Option<String>,
    pub medium_image_url: Option<String>,
    pub description: Option<String>,
}

/// 登録候補の書籍（検証済み）
///
/// IDもISBNもまだ持たない。採番に失敗した場合はこの形のまま
/// 保留キューにスナップショットとして書き出される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year_of_publication: i32,
    pub nb_of_pages: Option<i32>,
    pub rank: Option<Rank>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub small_image_url: Option<String>,
    pub medium_image_url: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<BookDraft> for NewBook {
    type Error = BookValidationError;

    fn try_from(draft: BookDraft) -> Result<Self, Self::Error> {
        if draft.title.trim().is_empty() {
            return Err(BookValidationError::Blank("title"));
        }
        if draft.author.trim().is_empty() {
            return Err(BookValidationError::Blank("author"));
        }
        BookValidationError::check_length("title", &draft.title, MAX_NAME_LENGTH)?;
        BookValidationError::check_length("author", &draft.author, MAX_NAME_LENGTH)?;

        let year_of_publication = draft
            .year_of_publication
            .ok_or(BookValidationError::Missing("yearOfPublication"))?;

        let rank = draft.rank.map(Rank::try_from).transpose()?;

        let price = draft.price.map(validate_price).transpose()?;

        if let Some(url) = &draft.small_image_url {
            BookValidationError::check_length("smallImageUrl", url, MAX_URL_LENGTH)?;
        }
        if let Some(url) = &draft.medium_image_url {
            BookValidationError::check_length("mediumImageUrl", url, MAX_URL_LENGTH)?;
        }

        if let Some(description) = &draft.description {
            validate_description(description)?;
        }

        Ok(Self {
            title: draft.title,
            author: draft.author,
            year_of_publication,
            nb_of_pages: draft.nb_of_pages,
            rank,
            price,
            small_image_url: draft.small_image_url,
            medium_image_url: draft.medium_image_url,
            description: draft.description,
        })
    }
}

fn validate_description(description: &str) -> Result<(), BookValidationError> {
    if description.is_empty() {
        return Err(BookValidationError::Blank("description"));
    }

    BookValidationError::check_length("description", description, MAX_DESCRIPTION_LENGTH)
}

/// 保存時と同じ精度に丸めてから範囲を確認する
fn validate_price(price: Decimal) -> Result<Decimal, BookValidationError> {
    let price = price.round_dp(PRICE_SCALE);
    if price.abs() >= max_price() {
        return Err(BookValidationError::PriceOutOfRange { max: max_price() });
    }
    Ok(price)
}

/// Book集約 - カタログに登録された1冊の書籍
///
/// ビジネスルール：
/// - (author, title) の組はカタログ内で一意
/// - 登録ワークフローの成功パスでのみ作成される（ISBNを持つ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    pub author: String,
    pub year_of_publication: i32,
    pub nb_of_pages: Option<i32>,
    pub rank: Option<Rank>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub small_image_url: Option<String>,
    pub medium_image_url: Option<String>,
    pub description: Option<String>,
}

impl Book {
    /// 採番済みの登録候補から書籍を組み立てる
    pub fn from_candidate(id: BookId, candidate: NewBook, numbers: IsbnNumbers) -> Self {
        Self {
            id,
            title: candidate.title,
            isbn13: Some(numbers.isbn13().to_string()),
            isbn10: Some(numbers.isbn10().to_string()),
            author: candidate.author,
            year_of_publication: candidate.year_of_publication,
            nb_of_pages: candidate.nb_of_pages,
            rank: candidate.rank,
            price: candidate.price,
            small_image_url: candidate.small_image_url,
            medium_image_url: candidate.medium_image_url,
            description: candidate.description,
        }
    }

    /// 更新用：既存IDと検証済みの内容から書籍を組み立てる
    ///
    /// ISBNは呼び出し側が指定した値をそのまま保持する（長さのみ確認）。
    pub fn with_contents(
        id: BookId,
        contents: NewBook,
        isbn13: Option<String>,
        isbn10: Option<String>,
    ) -> Result<Self, BookValidationError> {
        if let Some(isbn13) = &isbn13 {
            BookValidationError::check_length("isbn13", isbn13, MAX_ISBN_LENGTH)?;
        }
        if let Some(isbn10) = &isbn10 {
            BookValidationError::check_length("isbn10", isbn10, MAX_ISBN_LENGTH)?;
        }

        Ok(Self {
            id,
            title: contents.title,
            isbn13,
            isbn10,
            author: contents.author,
            year_of_publication: contents.year_of_publication,
            nb_of_pages: contents.nb_of_pages,
            rank: contents.rank,
            price: contents.price,
            small_image_url: contents.small_image_url,
            medium_image_url: contents.medium_image_url,
            description: contents.description,
        })
    }

    /// 作成された書籍のリソースURI
    pub fn location(&self) -> String {
        format!("/books/{}", self.id)
    }
}
