//! # 送信バッチ設定
//!
//! 環境変数から送信バッチの設定を読み込む。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `MAILING_LIST_NAME` | **Yes** | 処理するメーリングリスト名 |
//! | `SITE_BASE_URL` | No | 配信停止リンクのベース URL（デフォルト: `http://localhost:8080`） |
//! | `SENDER_ON_FAILURE` | No | `abort` / `mark_failed`（デフォルト: `abort`） |
//! | `SENDER_MAX_ATTEMPTS` | No | `mark_failed` 時の最大送信回数（デフォルト: 3） |
//! | `SENDER_INITIAL_BACKOFF_MS` | No | リトライ初回の待機時間（デフォルト: 100） |
//! | `SENDER_MAX_BACKOFF_MS` | No | リトライ待機時間の上限（デフォルト: 5000） |
//! | `MAIL_BACKEND` | No | `smtp` / `ses` / `noop`（デフォルト: `noop`） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP 接続先（デフォルト: `localhost:1025`） |
//! | `MAIL_FROM_ADDRESS` | No | 送信元アドレス |

use std::{env, str::FromStr, time::Duration};

use sitemail_infra::mail::{MailBackend, MailSettings};
use thiserror::Error;

use crate::usecase::{DeliveryPolicy, FailureAction};

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{key} の値が不正です: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 送信バッチの設定
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// データベース接続 URL
    pub database_url: String,
    /// 処理するメーリングリスト名
    pub list_name:    String,
    /// サイトのベース URL（メール内リンク用）
    pub base_url:     String,
    /// 配信ポリシー
    pub policy:       DeliveryPolicy,
    /// メール送信設定
    pub mail:         MailSettings,
}

impl SenderConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = DeliveryPolicy::default();

        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            list_name:    required(&lookup, "MAILING_LIST_NAME")?,
            base_url:     lookup("SITE_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            policy:       DeliveryPolicy {
                on_failure:      parsed(&lookup, "SENDER_ON_FAILURE", FailureAction::Abort)?,
                max_attempts:    parsed(&lookup, "SENDER_MAX_ATTEMPTS", defaults.max_attempts)?,
                initial_backoff: Duration::from_millis(parsed(
                    &lookup,
                    "SENDER_INITIAL_BACKOFF_MS",
                    100,
                )?),
                max_backoff:     Duration::from_millis(parsed(
                    &lookup,
                    "SENDER_MAX_BACKOFF_MS",
                    5_000,
                )?),
            },
            mail:         MailSettings {
                backend:      parsed(&lookup, "MAIL_BACKEND", MailBackend::Noop)?,
                smtp_host:    lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                smtp_port:    parsed(&lookup, "SMTP_PORT", 1025)?,
                from_address: lookup("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|| "noreply@sitemail.example.com".to_string()),
            },
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
