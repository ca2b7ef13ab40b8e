//! # MailingListRepository
//!
//! メーリングリストを名前で解決するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitemail_domain::mailing_list::{MailingList, MailingListId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// メーリングリストリポジトリトレイト
#[async_trait]
pub trait MailingListRepository: Send + Sync {
    /// 名前でメーリングリストを取得する
    async fn find_by_name(&self, name: &str) -> Result<Option<MailingList>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct MailingListRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<MailingListRow> for MailingList {
    fn from(row: MailingListRow) -> Self {
        MailingList::from_db(MailingListId::from_uuid(row.id), row.name, row.created_at)
    }
}

/// PostgreSQL 実装の MailingListRepository
#[derive(Debug, Clone)]
pub struct PostgresMailingListRepository {
    pool: PgPool,
}

impl PostgresMailingListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MailingListRepository for PostgresMailingListRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%name))]
    async fn find_by_name(&self, name: &str) -> Result<Option<MailingList>, InfraError> {
        let row = sqlx::query_as::<_, MailingListRow>(
            "SELECT id, name, created_at FROM mailing_lists WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MailingList::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresMailingListRepository>();
    }
}
