use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::application::book::DEFAULT_NUMBER_TIMEOUT;

/// 設定値の読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value for {key}: {value:?} ({reason})")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// アプリケーション設定
///
/// 環境変数から読み込む。未設定の項目はデフォルト値を使う。
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    /// 採番サービスのエンドポイント（GET）
    pub number_service_url: String,
    /// 採番サービスの応答を待つ上限
    pub number_timeout: Duration,
    /// 保留キューのディレクトリ
    pub pending_dir: PathBuf,
    /// 起動時のメンテナンスゲートの状態
    pub app_is_open: bool,
}

impl AppConfig {
    /// プロセスの環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/bookstore".into());

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5, |v| {
            v.parse::<u32>().ok().filter(|n| *n > 0)
        })?;

        let port = parse_or(&lookup, "PORT", 3000, |v| v.parse::<u16>().ok())?;

        let number_service_url = lookup("NUMBER_SERVICE_URL")
            .unwrap_or_else(|| "http://localhost:8084/api/numbers/book".into());

        let default_timeout_ms = DEFAULT_NUMBER_TIMEOUT.as_millis() as u64;
        let number_timeout_ms = parse_or(&lookup, "NUMBER_TIMEOUT_MS", default_timeout_ms, |v| {
            v.parse::<u64>().ok().filter(|ms| *ms > 0)
        })?;

        let pending_dir = lookup("PENDING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let app_is_open = parse_or(&lookup, "APP_IS_OPEN", true, |v| match v {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })?;

        Ok(Self {
            database_url,
            database_max_connections,
            port,
            number_service_url,
            number_timeout: Duration::from_millis(number_timeout_ms),
            pending_dir,
            app_is_open,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => parse(value.trim()).ok_or(ConfigError {
            key,
            value,
            reason: "unparseable or out of range",
        }),
    }
}
