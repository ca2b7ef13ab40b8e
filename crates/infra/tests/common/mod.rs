//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシードデータ作成ヘルパー。
//! Rust の統合テスト規約に従い `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use sitemail_domain::{
    forum::{ForumPostId, ForumTopicId, ForumUserId},
    mailing_list::{CampaignId, ListEntryId, MailingListId, QueueEntryId},
};
use sqlx::PgPool;
use uuid::Uuid;

/// テスト用の固定日時
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

// =============================================================================
// メーリングリスト
// =============================================================================

/// メーリングリストを作成する
pub async fn insert_list(pool: &PgPool, name: &str) -> MailingListId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO mailing_lists (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .expect("メーリングリスト作成に失敗");
    MailingListId::from_uuid(id)
}

/// 購読者を作成する
pub async fn insert_entry(
    pool: &PgPool,
    list_id: &MailingListId,
    email: &str,
    name: Option<&str>,
) -> ListEntryId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO list_entries (id, list_id, email, name) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(list_id.as_uuid())
        .bind(email)
        .bind(name)
        .execute(pool)
        .await
        .expect("購読者作成に失敗");
    ListEntryId::from_uuid(id)
}

/// キャンペーンを作成する
pub async fn insert_campaign(
    pool: &PgPool,
    list_id: &MailingListId,
    title: &str,
    status: &str,
) -> CampaignId {
    let id = Uuid::now_v7();
    sqlx::query(
        r#"
        INSERT INTO campaigns (id, list_id, title, body, status)
        VALUES ($1, $2, $3, 'Hello {{ name }}', $4)
        "#,
    )
    .bind(id)
    .bind(list_id.as_uuid())
    .bind(title)
    .bind(status)
    .execute(pool)
    .await
    .expect("キャンペーン作成に失敗");
    CampaignId::from_uuid(id)
}

/// 送信キューにエントリを積む
///
/// `order` 秒ずつ `created_at` をずらし、取得順序を固定する。
pub async fn insert_queue_entry(
    pool: &PgPool,
    list_id: &MailingListId,
    campaign_id: &CampaignId,
    entry_id: &ListEntryId,
    status: &str,
    order: i64,
) -> QueueEntryId {
    let id = Uuid::now_v7();
    let created_at = test_now() + Duration::seconds(order);
    let claimed_at = (status == "sending").then_some(created_at);
    sqlx::query(
        r#"
        INSERT INTO send_queue
            (id, list_id, campaign_id, entry_id, status, claimed_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        "#,
    )
    .bind(id)
    .bind(list_id.as_uuid())
    .bind(campaign_id.as_uuid())
    .bind(entry_id.as_uuid())
    .bind(status)
    .bind(claimed_at)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("送信キュー作成に失敗");
    QueueEntryId::from_uuid(id)
}

/// 送信キューエントリの現在のステータスを取得する
pub async fn queue_status(pool: &PgPool, id: &QueueEntryId) -> String {
    let (status,): (String,) = sqlx::query_as("SELECT status FROM send_queue WHERE id = $1")
        .bind(id.as_uuid())
        .fetch_one(pool)
        .await
        .expect("送信キュー取得に失敗");
    status
}

// =============================================================================
// フォーラム
// =============================================================================

/// フォーラムユーザーを作成する
pub async fn insert_user(pool: &PgPool, username: &str) -> ForumUserId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO users (id, username, email) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(username)
        .bind(format!("{username}@example.com"))
        .execute(pool)
        .await
        .expect("ユーザー作成に失敗");
    ForumUserId::from_uuid(id)
}

/// ユーザー設定値を保存する
pub async fn set_config(pool: &PgPool, user_id: &ForumUserId, module: &str, name: &str, value: &str) {
    sqlx::query(
        r#"
        INSERT INTO user_config_values (user_id, module, name, value)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, module, name) DO UPDATE SET value = EXCLUDED.value
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(module)
    .bind(name)
    .bind(value)
    .execute(pool)
    .await
    .expect("ユーザー設定保存に失敗");
}

/// フォーラムトピックを作成する
pub async fn insert_topic(pool: &PgPool, title: &str, full_link_name: &str) -> ForumTopicId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO forum_topics (id, title, full_link_name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(title)
        .bind(full_link_name)
        .execute(pool)
        .await
        .expect("トピック作成に失敗");
    ForumTopicId::from_uuid(id)
}

/// フォーラム投稿を作成する
pub async fn insert_post(
    pool: &PgPool,
    topic_id: &ForumTopicId,
    user_id: &ForumUserId,
    activity: &str,
    order: i64,
) -> ForumPostId {
    let id = Uuid::now_v7();
    let created_at = test_now() + Duration::seconds(order);
    sqlx::query(
        r#"
        INSERT INTO forum_posts (id, topic_id, user_id, activity_mailed, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(id)
    .bind(topic_id.as_uuid())
    .bind(user_id.as_uuid())
    .bind(activity)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("投稿作成に失敗");
    ForumPostId::from_uuid(id)
}
