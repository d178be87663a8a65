use crate::domain::{Book, BookId, IsbnNumbers, NewBook, Rank};
use crate::ports::book_store::{BookStore as BookStoreTrait, InsertOutcome, Result, UpdateOutcome};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

const BOOK_COLUMNS: &str = r#"
    id,
    title,
    isbn_13,
    isbn_10,
    author,
    year_of_publication,
    nb_of_pages,
    rank,
    price,
    small_image_url,
    medium_image_url,
    description
"#;

/// PostgreSQLの行データをBookに変換する
///
/// rankはCHECK制約で範囲が保証されているが、
/// 範囲外の値が読めた場合はデータ不整合としてエラーにする。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let rank = row
        .get::<Option<i32>, _>("rank")
        .map(Rank::try_from)
        .transpose()
        .map_err(|e| {
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                as Box<dyn std::error::Error + Send + Sync>
        })?;

    Ok(Book {
        id: BookId::from_uuid(row.get("id")),
        title: row.get("title"),
        isbn13: row.get("isbn_13"),
        isbn10: row.get("isbn_10"),
        author: row.get("author"),
        year_of_publication: row.get("year_of_publication"),
        nb_of_pages: row.get("nb_of_pages"),
        rank,
        price: row.get("price"),
        small_image_url: row.get("small_image_url"),
        medium_image_url: row.get("medium_image_url"),
        description: row.get("description"),
    })
}

/// 一意制約違反かどうか
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// BookStoreのPostgreSQL実装
///
/// (author, title) のUNIQUE制約が重複確認と挿入のアトミック性を保証する。
pub struct BookStore {
    pool: PgPool,
}

impl BookStore {
    /// PostgreSQLコネクションプールから新しいBookStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStoreTrait for BookStore {
    async fn exists_by_author_title(&self, author: &str, title: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM books WHERE author = $1 AND title = $2
            )
            "#,
        )
        .bind(author)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 書籍を挿入する（重複時は何もしない）
    ///
    /// INSERT ... ON CONFLICT DO NOTHING を使い、並行登録でも
    /// 同じ (author, title) は1件しか挿入されない。
    async fn insert_unique(
        &self,
        candidate: NewBook,
        numbers: IsbnNumbers,
    ) -> Result<InsertOutcome> {
        let query = format!(
            r#"
            INSERT INTO books (
                title,
                isbn_13,
                isbn_10,
                author,
                year_of_publication,
                nb_of_pages,
                rank,
                price,
                small_image_url,
                medium_image_url,
                description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT ON CONSTRAINT books_author_title_key DO NOTHING
            RETURNING {BOOK_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(&candidate.title)
            .bind(numbers.isbn13())
            .bind(numbers.isbn10())
            .bind(&candidate.author)
            .bind(candidate.year_of_publication)
            .bind(candidate.nb_of_pages)
            .bind(candidate.rank.map(i32::from))
            .bind(candidate.price)
            .bind(&candidate.small_image_url)
            .bind(&candidate.medium_image_url)
            .bind(&candidate.description)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(InsertOutcome::Inserted(map_row_to_book(&row)?)),
            None => Ok(InsertOutcome::Duplicate),
        }
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at ASC");

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn update(&self, book: Book) -> Result<UpdateOutcome> {
        let query = format!(
            r#"
            UPDATE books SET
                title = $2,
                isbn_13 = $3,
                isbn_10 = $4,
                author = $5,
                year_of_publication = $6,
                nb_of_pages = $7,
                rank = $8,
                price = $9,
                small_image_url = $10,
                medium_image_url = $11,
                description = $12
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        );

        let result = sqlx::query(&query)
            .bind(book.id.value())
            .bind(&book.title)
            .bind(&book.isbn13)
            .bind(&book.isbn10)
            .bind(&book.author)
            .bind(book.year_of_publication)
            .bind(book.nb_of_pages)
            .bind(book.rank.map(i32::from))
            .bind(book.price)
            .bind(&book.small_image_url)
            .bind(&book.medium_image_url)
            .bind(&book.description)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(Some(row)) => Ok(UpdateOutcome::Updated(map_row_to_book(&row)?)),
            Ok(None) => Ok(UpdateOutcome::NotFound),
            Err(e) if is_unique_violation(&e) => Ok(UpdateOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn random(&self) -> Result<Option<Book>> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY random() LIMIT 1");

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;

        row.as_ref().map(map_row_to_book).transpose()
    }
}
