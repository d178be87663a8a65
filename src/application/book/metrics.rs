use std::sync::atomic::{AtomicU64, Ordering};

/// 書籍登録のプロセス内カウンタ
///
/// エクスポートの仕組みは持たない。値は読み取り専用で公開する。
#[derive(Debug, Default)]
pub struct BookMetrics {
    duplication_count: AtomicU64,
}

impl BookMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 重複検出を1件記録し、記録後の件数を返す
    pub fn record_duplicate(&self) -> u64 {
        self.duplication_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// これまでに検出した重複の件数
    pub fn duplication_count(&self) -> u64 {
        self.duplication_count.load(Ordering::Relaxed)
    }
}
