//! # フォーラム通知バッチ設定
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `SITE_BASE_URL` | No | トピック URL のベース（デフォルト: `http://localhost:8080`） |
//! | `MAIL_BACKEND` | No | `smtp` / `ses` / `noop`（デフォルト: `noop`） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP 接続先（デフォルト: `localhost:1025`） |
//! | `MAIL_FROM_ADDRESS` | No | 送信元アドレス |

use std::{env, str::FromStr};

use sitemail_infra::mail::{MailBackend, MailSettings};
use thiserror::Error;

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{key} の値が不正です: {value}")]
    Invalid { key: &'static str, value: String },
}

/// フォーラム通知バッチの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// データベース接続 URL
    pub database_url: String,
    /// サイトのベース URL（メール内リンク・キュー表示用）
    pub base_url:     String,
    /// メール送信設定
    pub mail:         MailSettings,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            base_url: lookup("SITE_BASE_URL").unwrap_or_else(|| "http://localhost:8080".to_string()),
            mail: MailSettings {
                backend:      parsed(&lookup, "MAIL_BACKEND", MailBackend::Noop)?,
                smtp_host:    lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                smtp_port:    parsed(&lookup, "SMTP_PORT", 1025)?,
                from_address: lookup("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|| "noreply@sitemail.example.com".to_string()),
            },
        })
    }
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
