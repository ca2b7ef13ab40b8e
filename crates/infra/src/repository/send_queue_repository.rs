//! # SendQueueRepository
//!
//! メーリングリスト送信キューの取得と状態更新を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **アトミックな取得**: `pending → sending` の変更を 1 文の UPDATE で行い、
//!   `FOR UPDATE SKIP LOCKED` で複数プロセスが同じエントリを取得しないようにする
//! - **取得順序**: `created_at, id` の昇順（キューに積まれた順）
//! - **削除しない**: 送信済み・失敗したエントリも履歴として残す

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitemail_domain::mailing_list::{
    CampaignId,
    ListEntryId,
    MailingListId,
    QueueEntry,
    QueueEntryId,
    QueueEntryRecord,
    QueueStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// 送信キューリポジトリトレイト
#[async_trait]
pub trait SendQueueRepository: Send + Sync {
    /// 次の送信待ちエントリを送信中にして返す
    ///
    /// 送信待ちが残っていない場合は `None` を返す。
    async fn claim_next_pending(
        &self,
        list_id: &MailingListId,
        now: DateTime<Utc>,
    ) -> Result<Option<QueueEntry>, InfraError>;

    /// エントリの状態を保存する
    ///
    /// DB 上のステータスが `expected` と一致する場合のみ更新する。
    /// 不一致の場合は `InfraErrorKind::Conflict` を返す。
    async fn update_status(
        &self,
        entry: &QueueEntry,
        expected: QueueStatus,
    ) -> Result<(), InfraError>;

    /// 送信中のまま `claimed_before` より前に取得されたエントリを送信待ちに戻す
    ///
    /// 戻した件数を返す。
    async fn requeue_stuck(
        &self,
        list_id: &MailingListId,
        claimed_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, InfraError>;
}

/// DB の send_queue テーブルの行
#[derive(sqlx::FromRow)]
struct QueueEntryRow {
    id: Uuid,
    list_id: Uuid,
    campaign_id: Uuid,
    entry_id: Uuid,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QueueEntryRow> for QueueEntry {
    type Error = InfraError;

    fn try_from(row: QueueEntryRow) -> Result<Self, Self::Error> {
        Ok(QueueEntry::from_db(QueueEntryRecord {
            id: QueueEntryId::from_uuid(row.id),
            list_id: MailingListId::from_uuid(row.list_id),
            campaign_id: CampaignId::from_uuid(row.campaign_id),
            entry_id: ListEntryId::from_uuid(row.entry_id),
            status: row
                .status
                .parse::<QueueStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            attempts: u32::try_from(row.attempts)
                .map_err(|e| InfraError::unexpected(format!("不正な試行回数: {e}")))?,
            last_error: row.last_error,
            claimed_at: row.claimed_at,
            sent_at: row.sent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

/// PostgreSQL 実装の SendQueueRepository
#[derive(Debug, Clone)]
pub struct PostgresSendQueueRepository {
    pool: PgPool,
}

impl PostgresSendQueueRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SendQueueRepository for PostgresSendQueueRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%list_id))]
    async fn claim_next_pending(
        &self,
        list_id: &MailingListId,
        now: DateTime<Utc>,
    ) -> Result<Option<QueueEntry>, InfraError> {
        let row = sqlx::query_as::<_, QueueEntryRow>(
            r#"
            UPDATE send_queue
            SET status = 'sending', claimed_at = $2, updated_at = $2
            WHERE id = (
                SELECT id
                FROM send_queue
                WHERE list_id = $1 AND status = 'pending'
                ORDER BY created_at, id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING
                id, list_id, campaign_id, entry_id, status, attempts,
                last_error, claimed_at, sent_at, created_at, updated_at
            "#,
        )
        .bind(list_id.as_uuid())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QueueEntry::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(entry_id = %entry.id()))]
    async fn update_status(
        &self,
        entry: &QueueEntry,
        expected: QueueStatus,
    ) -> Result<(), InfraError> {
        let status: &str = entry.status().into();
        let expected: &str = expected.into();
        let attempts = i32::try_from(entry.attempts())
            .map_err(|e| InfraError::unexpected(format!("不正な試行回数: {e}")))?;

        let result = sqlx::query(
            r#"
            UPDATE send_queue
            SET status = $2, attempts = $3, last_error = $4,
                claimed_at = $5, sent_at = $6, updated_at = $7
            WHERE id = $1 AND status = $8
            "#,
        )
        .bind(entry.id().as_uuid())
        .bind(status)
        .bind(attempts)
        .bind(entry.last_error())
        .bind(entry.claimed_at())
        .bind(entry.sent_at())
        .bind(entry.updated_at())
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("QueueEntry", entry.id().to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%list_id))]
    async fn requeue_stuck(
        &self,
        list_id: &MailingListId,
        claimed_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE send_queue
            SET status = 'pending', claimed_at = NULL, updated_at = $3
            WHERE list_id = $1 AND status = 'sending' AND claimed_at < $2
            "#,
        )
        .bind(list_id.as_uuid())
        .bind(claimed_before)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresSendQueueRepository>();
    }

    #[test]
    fn 不正なステータスの行は復元できない() {
        let now = Utc::now();
        let row = QueueEntryRow {
            id: Uuid::now_v7(),
            list_id: Uuid::now_v7(),
            campaign_id: Uuid::now_v7(),
            entry_id: Uuid::now_v7(),
            status: "archived".to_string(),
            attempts: 0,
            last_error: None,
            claimed_at: None,
            sent_at: None,
            created_at: now,
            updated_at: now,
        };

        assert!(QueueEntry::try_from(row).is_err());
    }
}
