//! # ForumPostRepository
//!
//! フォーラム投稿の通知状態（`activity_mailed`）を読み書きするリポジトリ。
//!
//! 投稿はトピック・投稿者と結合した [`PostSummary`] として返す。
//! 状態更新は期待ステータス付きの条件付き UPDATE で行う。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitemail_domain::forum::{
    ActivityStatus,
    ForumPost,
    ForumPostId,
    ForumPostRecord,
    ForumTopic,
    ForumTopicId,
    ForumUser,
    ForumUserId,
    PostSummary,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// フォーラム投稿リポジトリトレイト
#[async_trait]
pub trait ForumPostRepository: Send + Sync {
    /// 指定した通知状態の投稿を作成順に取得する
    async fn find_by_activity(
        &self,
        status: ActivityStatus,
    ) -> Result<Vec<PostSummary>, InfraError>;

    /// 投稿の通知状態を保存する
    ///
    /// DB 上の状態が `expected` と一致しない場合は `InfraErrorKind::Conflict` を返す。
    async fn update_activity(
        &self,
        post: &ForumPost,
        expected: ActivityStatus,
    ) -> Result<(), InfraError>;
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    id: Uuid,
    topic_id: Uuid,
    user_id: Uuid,
    activity_mailed: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    topic_title: String,
    full_link_name: String,
    username: String,
    email: String,
}

impl TryFrom<PostSummaryRow> for PostSummary {
    type Error = InfraError;

    fn try_from(row: PostSummaryRow) -> Result<Self, Self::Error> {
        let topic_id = ForumTopicId::from_uuid(row.topic_id);
        let user_id = ForumUserId::from_uuid(row.user_id);

        let post = ForumPost::from_db(ForumPostRecord {
            id: ForumPostId::from_uuid(row.id),
            topic_id: topic_id.clone(),
            user_id: user_id.clone(),
            activity: row
                .activity_mailed
                .parse::<ActivityStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        });

        Ok(PostSummary {
            post,
            topic: ForumTopic::new(topic_id, row.topic_title, row.full_link_name),
            author: ForumUser::new(user_id, row.username, row.email),
        })
    }
}

/// PostgreSQL 実装の ForumPostRepository
#[derive(Debug, Clone)]
pub struct PostgresForumPostRepository {
    pool: PgPool,
}

impl PostgresForumPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForumPostRepository for PostgresForumPostRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%status))]
    async fn find_by_activity(
        &self,
        status: ActivityStatus,
    ) -> Result<Vec<PostSummary>, InfraError> {
        let status_label: &str = status.into();

        let rows = sqlx::query_as::<_, PostSummaryRow>(
            r#"
            SELECT
                p.id, p.topic_id, p.user_id, p.activity_mailed, p.created_at, p.updated_at,
                t.title AS topic_title, t.full_link_name,
                u.username, u.email
            FROM forum_posts p
            INNER JOIN forum_topics t ON t.id = p.topic_id
            INNER JOIN users u ON u.id = p.user_id
            WHERE p.activity_mailed = $1
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(status_label)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PostSummary::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(post_id = %post.id()))]
    async fn update_activity(
        &self,
        post: &ForumPost,
        expected: ActivityStatus,
    ) -> Result<(), InfraError> {
        let activity: &str = post.activity().into();
        let expected: &str = expected.into();

        let result = sqlx::query(
            r#"
            UPDATE forum_posts
            SET activity_mailed = $2, updated_at = $3
            WHERE id = $1 AND activity_mailed = $4
            "#,
        )
        .bind(post.id().as_uuid())
        .bind(activity)
        .bind(post.updated_at())
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("ForumPost", post.id().to_string()));
        }

        Ok(())
    }
}
