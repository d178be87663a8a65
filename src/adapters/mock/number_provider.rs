use crate::domain::IsbnNumbers;
use crate::ports::number_provider::{NumberProvider as NumberProviderTrait, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// モックが返すISBN-13
pub const MOCK_ISBN_13: &str = "978-1-234-56789-7";
/// モックが返すISBN-10
pub const MOCK_ISBN_10: &str = "1-234-56789-X";

/// モックの振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// 固定のISBNを即座に返す
    Healthy,
    /// 接続できない（エラーを返す）
    Unavailable,
    /// 指定時間待ってから固定のISBNを返す
    Slow(Duration),
}

/// NumberProviderのモック実装
///
/// テストから振る舞いを切り替えられる。呼び出し回数を記録する。
pub struct NumberProvider {
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
}

impl NumberProvider {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Healthy)
    }

    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock() = behavior;
    }

    /// これまでの呼び出し回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NumberProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NumberProviderTrait for NumberProvider {
    async fn generate_isbn_numbers(&self) -> Result<IsbnNumbers> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let behavior = *self.behavior.lock();
        match behavior {
            Behavior::Healthy => {}
            Behavior::Unavailable => return Err("Numbers service not accessible".into()),
            Behavior::Slow(delay) => tokio::time::sleep(delay).await,
        }

        Ok(IsbnNumbers::new(MOCK_ISBN_13, MOCK_ISBN_10)?)
    }
}
