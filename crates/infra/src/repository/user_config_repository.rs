//! # UserConfigRepository
//!
//! ユーザーごとの設定値（`user_config_values`）を読み取るリポジトリ。

use async_trait::async_trait;
use sitemail_domain::forum::ForumUserId;
use sqlx::PgPool;

use crate::error::InfraError;

/// ユーザー設定リポジトリトレイト
#[async_trait]
pub trait UserConfigRepository: Send + Sync {
    /// 設定値を取得する。未設定の場合は `None`
    async fn get_value(
        &self,
        user_id: &ForumUserId,
        module: &str,
        name: &str,
    ) -> Result<Option<String>, InfraError>;
}

/// PostgreSQL 実装の UserConfigRepository
#[derive(Debug, Clone)]
pub struct PostgresUserConfigRepository {
    pool: PgPool,
}

impl PostgresUserConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserConfigRepository for PostgresUserConfigRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%user_id, %module, %name))]
    async fn get_value(
        &self,
        user_id: &ForumUserId,
        module: &str,
        name: &str,
    ) -> Result<Option<String>, InfraError> {
        let value: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT value
            FROM user_config_values
            WHERE user_id = $1 AND module = $2 AND name = $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(module)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.map(|(value,)| value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresUserConfigRepository>();
    }
}
