use crate::domain::{Book, BookId, IsbnNumbers, NewBook};
use crate::ports::book_store::{BookStore as BookStoreTrait, InsertOutcome, Result, UpdateOutcome};
use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

/// BookStoreのインメモリ実装
///
/// 登録順を保持する。すべての操作は1つのロックの中で行うため、
/// 重複確認と挿入はアトミックになる。
pub struct BookStore {
    books: Mutex<Vec<Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(Vec::new()),
        }
    }

    /// テスト用にISBN付きの書籍を直接登録
    pub fn add_book(&self, book: Book) {
        self.books.lock().push(book);
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new()
    }
}

fn same_author_title(book: &Book, author: &str, title: &str) -> bool {
    book.author == author && book.title == title
}

#[async_trait]
impl BookStoreTrait for BookStore {
    async fn exists_by_author_title(&self, author: &str, title: &str) -> Result<bool> {
        Ok(self
            .books
            .lock()
            .iter()
            .any(|b| same_author_title(b, author, title)))
    }

    async fn insert_unique(
        &self,
        candidate: NewBook,
        numbers: IsbnNumbers,
    ) -> Result<InsertOutcome> {
        let mut books = self.books.lock();

        if books
            .iter()
            .any(|b| same_author_title(b, &candidate.author, &candidate.title))
        {
            return Ok(InsertOutcome::Duplicate);
        }

        let book = Book::from_candidate(BookId::new(), candidate, numbers);
        books.push(book.clone());
        Ok(InsertOutcome::Inserted(book))
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.books.lock().iter().find(|b| b.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        Ok(self.books.lock().clone())
    }

    async fn update(&self, book: Book) -> Result<UpdateOutcome> {
        let mut books = self.books.lock();

        if books
            .iter()
            .any(|b| b.id != book.id && same_author_title(b, &book.author, &book.title))
        {
            return Ok(UpdateOutcome::Duplicate);
        }

        match books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => {
                *existing = book.clone();
                Ok(UpdateOutcome::Updated(book))
            }
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let mut books = self.books.lock();
        let before = books.len();
        books.retain(|b| b.id != id);
        Ok(books.len() != before)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.books.lock().len() as u64)
    }

    async fn random(&self) -> Result<Option<Book>> {
        let books = self.books.lock();
        if books.is_empty() {
            return Ok(None);
        }

        // v4 UUIDは乱数由来なのでインデックスの選択に使う
        let index = (Uuid::new_v4().as_u128() % books.len() as u128) as usize;
        Ok(books.get(index).cloned())
    }
}
