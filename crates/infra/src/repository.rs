//! # リポジトリ実装
//!
//! 各バッチが使う永続化操作をトレイトで定義し、PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **トレイト経由**: ユースケースは `Arc<dyn Trait>` で受け取り、テストではモックに差し替える
//! - **条件付き更新**: 状態遷移は `WHERE status = 期待値` 付きで更新し、0 件なら競合として扱う
//! - **実行時クエリ**: `sqlx::query_as::<_, Row>` と `FromRow` で行をマッピングし、
//!   `TryFrom` でドメインモデルへの変換を一箇所に集約する

pub mod campaign_repository;
pub mod forum_post_repository;
pub mod forum_user_repository;
pub mod list_entry_repository;
pub mod mailing_list_repository;
pub mod send_queue_repository;
pub mod user_config_repository;

pub use campaign_repository::{CampaignRefresh, CampaignRepository, PostgresCampaignRepository};
pub use forum_post_repository::{ForumPostRepository, PostgresForumPostRepository};
pub use forum_user_repository::{ForumUserRepository, PostgresForumUserRepository};
pub use list_entry_repository::{ListEntryRepository, PostgresListEntryRepository};
pub use mailing_list_repository::{MailingListRepository, PostgresMailingListRepository};
pub use send_queue_repository::{PostgresSendQueueRepository, SendQueueRepository};
pub use user_config_repository::{PostgresUserConfigRepository, UserConfigRepository};
