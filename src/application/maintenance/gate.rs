use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// メンテナンス状態を切り替える設定キー
pub const MAINTENANCE_KEY: &str = "app.is.open";

/// メンテナンス状態のスナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaintenanceState {
    /// true: 受付中（OPEN）、false: メンテナンス中（CLOSED）
    pub is_open: bool,
    /// 最後に状態が変更された時刻
    pub changed_at: DateTime<Utc>,
}

/// 設定変更の通知
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigChange {
    pub key: String,
    pub value: String,
}

impl ConfigChange {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 設定変更を適用した結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChangeOutcome {
    /// 状態を更新した
    Applied(MaintenanceState),
    /// メンテナンスキーだが値が "true" / "false" 以外だった（状態は変更なし）
    Rejected,
    /// 関係のないキー
    Ignored,
}

/// メンテナンスゲート
///
/// プロセス全体で共有される状態セル。
/// 書き込みは `apply_config_change` の1か所のみで、値を検証してから反映する。
/// 読み取りは全リクエストから並行して行われ、常に一貫したスナップショットを返す。
#[derive(Debug)]
pub struct MaintenanceGate {
    state: RwLock<MaintenanceState>,
}

impl MaintenanceGate {
    /// 起動時の設定から初期状態を決める
    pub fn new(is_open: bool) -> Self {
        Self {
            state: RwLock::new(MaintenanceState {
                is_open,
                changed_at: Utc::now(),
            }),
        }
    }

    /// 現在の状態
    pub fn state(&self) -> MaintenanceState {
        *self.state.read()
    }

    pub fn is_open(&self) -> bool {
        self.state.read().is_open
    }

    /// 設定変更の通知を検証して反映する
    ///
    /// 値が "true" / "false" の場合のみ状態と変更時刻を更新する
    /// （値が現在と同じでも変更時刻は更新される）。
    pub fn apply_config_change(&self, change: &ConfigChange) -> ConfigChangeOutcome {
        if change.key != MAINTENANCE_KEY {
            return ConfigChangeOutcome::Ignored;
        }

        let is_open = match change.value.as_str() {
            "true" => true,
            "false" => false,
            other => {
                tracing::warn!(
                    key = MAINTENANCE_KEY,
                    value = other,
                    "{} value should be false or true",
                    MAINTENANCE_KEY
                );
                return ConfigChangeOutcome::Rejected;
            }
        };

        let mut state = self.state.write();
        *state = MaintenanceState {
            is_open,
            changed_at: Utc::now(),
        };

        tracing::info!(is_open, "Maintenance state changed");
        ConfigChangeOutcome::Applied(*state)
    }
}

/// 設定変更の通知を監視するタスクを起動する
///
/// ゲートへの唯一の書き込み手。送信側がすべて閉じられると終了する。
pub fn spawn_config_observer(
    gate: Arc<MaintenanceGate>,
    mut changes: mpsc::Receiver<ConfigChange>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(change) = changes.recv().await {
            tracing::debug!(key = %change.key, "Config change received");
            gate.apply_config_change(&change);
        }
        tracing::debug!("Config change channel closed");
    })
}
