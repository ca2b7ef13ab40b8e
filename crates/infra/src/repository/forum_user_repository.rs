//! # ForumUserRepository
//!
//! フォーラムの通知設定を有効にしているユーザーを取得するリポジトリ。
//!
//! 設定は `user_config_values`（モジュール `forum`）に `"1"` として保存されている。

use async_trait::async_trait;
use sitemail_domain::forum::{FORUM_CONFIG_MODULE, ForumPreference, ForumUser, ForumUserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// フォーラムユーザーリポジトリトレイト
#[async_trait]
pub trait ForumUserRepository: Send + Sync {
    /// 指定した設定を有効にしているユーザーをユーザー名順に取得する
    async fn find_by_preference(
        &self,
        preference: ForumPreference,
    ) -> Result<Vec<ForumUser>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ForumUserRow {
    id: Uuid,
    username: String,
    email: String,
}

impl From<ForumUserRow> for ForumUser {
    fn from(row: ForumUserRow) -> Self {
        ForumUser::new(ForumUserId::from_uuid(row.id), row.username, row.email)
    }
}

/// PostgreSQL 実装の ForumUserRepository
#[derive(Debug, Clone)]
pub struct PostgresForumUserRepository {
    pool: PgPool,
}

impl PostgresForumUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ForumUserRepository for PostgresForumUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%preference))]
    async fn find_by_preference(
        &self,
        preference: ForumPreference,
    ) -> Result<Vec<ForumUser>, InfraError> {
        let rows = sqlx::query_as::<_, ForumUserRow>(
            r#"
            SELECT u.id, u.username, u.email
            FROM users u
            INNER JOIN user_config_values v ON v.user_id = u.id
            WHERE v.module = $1 AND v.name = $2 AND v.value = '1'
            ORDER BY u.username
            "#,
        )
        .bind(FORUM_CONFIG_MODULE)
        .bind(preference.key())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ForumUser::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresForumUserRepository>();
    }
}
