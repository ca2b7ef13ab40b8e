//! # フォーラム
//!
//! フォーラム投稿のメール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ForumPost`] | 投稿 | 通知状態（[`ActivityStatus`]）を持つ |
//! | [`ForumTopic`] | トピック | 投稿が属するスレッド |
//! | [`ForumUser`] | ユーザー | 投稿者・モデレーター・購読者 |
//! | [`ForumPreference`] | ユーザー設定 | 自動送信 / 新規投稿通知 / アクティビティ受信 |
//!
//! ## 投稿の通知状態
//!
//! ```text
//! new ──モデレーター通知──→ queued ──承認──→ ready ──アクティビティ送信──→ sent
//!  └───────────────自動送信───────────────↗
//! ```

mod post;
mod preference;
mod topic;
mod user;

pub use post::{ActivityStatus, ForumPost, ForumPostId, ForumPostRecord, PostSummary};
pub use preference::{FORUM_CONFIG_MODULE, ForumPreference};
pub use topic::{ForumTopic, ForumTopicId};
pub use user::{ForumUser, ForumUserId};
