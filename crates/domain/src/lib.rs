//! # Sitemail ドメイン層
//!
//! メーリングリスト送信とフォーラム通知の 2 つのバッチが扱う
//! エンティティ・値オブジェクト・エラーを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! apps → infra → domain
//!   ↘      ↓
//!     shared
//! ```
//!
//! ドメイン層は DB やメール送信の実装に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`mailing_list`] - メーリングリスト、キャンペーン、購読者、送信キュー
//! - [`forum`] - フォーラム投稿、トピック、ユーザー、通知設定
//! - [`mail`] - 送信するメールメッセージと送信エラー
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層で発生するエラー
//!
//! ## 使用例
//!
//! ```rust
//! use chrono::Utc;
//! use sitemail_domain::mailing_list::{
//!     CampaignId, ListEntryId, MailingListId, NewQueueEntry, QueueEntry, QueueEntryId, QueueStatus,
//! };
//!
//! let now = Utc::now();
//! let entry = QueueEntry::new(NewQueueEntry {
//!     id: QueueEntryId::new(),
//!     list_id: MailingListId::new(),
//!     campaign_id: CampaignId::new(),
//!     entry_id: ListEntryId::new(),
//!     now,
//! });
//!
//! let sending = entry.claimed(now).unwrap();
//! let sent = sending.sent(now).unwrap();
//! assert_eq!(sent.status(), QueueStatus::Sent);
//! assert_eq!(sent.sent_at(), Some(now));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod forum;
pub mod mail;
pub mod mailing_list;

pub use error::DomainError;
