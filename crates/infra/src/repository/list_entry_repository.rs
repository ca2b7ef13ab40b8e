//! # ListEntryRepository
//!
//! 送信キューのエントリが指す購読者を取得するリポジトリ。

use async_trait::async_trait;
use sitemail_domain::mailing_list::{ListEntry, ListEntryId, MailingListId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 購読者リポジトリトレイト
#[async_trait]
pub trait ListEntryRepository: Send + Sync {
    /// ID で購読者を取得する
    async fn find_by_id(&self, id: &ListEntryId) -> Result<Option<ListEntry>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct ListEntryRow {
    id: Uuid,
    list_id: Uuid,
    email: String,
    name: Option<String>,
}

impl From<ListEntryRow> for ListEntry {
    fn from(row: ListEntryRow) -> Self {
        ListEntry::new(
            ListEntryId::from_uuid(row.id),
            MailingListId::from_uuid(row.list_id),
            row.email,
            row.name,
        )
    }
}

/// PostgreSQL 実装の ListEntryRepository
#[derive(Debug, Clone)]
pub struct PostgresListEntryRepository {
    pool: PgPool,
}

impl PostgresListEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListEntryRepository for PostgresListEntryRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &ListEntryId) -> Result<Option<ListEntry>, InfraError> {
        let row = sqlx::query_as::<_, ListEntryRow>(
            "SELECT id, list_id, email, name FROM list_entries WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ListEntry::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresListEntryRepository>();
    }
}
