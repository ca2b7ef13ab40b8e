//! # CampaignRepository
//!
//! キャンペーンの取得と送信件数の集計（ブックキーピング）を担当するリポジトリ。
//!
//! 集計は送信キューの状態から `sent_count` / `failed_count` を再計算し、
//! 未処理エントリが残っていないキャンペーンを完了にする。
//! 対象は送信中（`sending`）のキャンペーンのみ。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitemail_domain::mailing_list::{
    Campaign,
    CampaignId,
    CampaignRecord,
    CampaignStatus,
    MailingListId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ブックキーピングの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignRefresh {
    /// 集計し直したキャンペーン数
    pub refreshed: u64,
    /// 今回完了になったキャンペーン数
    pub completed: u64,
}

/// キャンペーンリポジトリトレイト
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// ID でキャンペーンを取得する
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, InfraError>;

    /// リストに属する送信中キャンペーンの件数を再集計する
    async fn refresh_bookkeeping(
        &self,
        list_id: &MailingListId,
        now: DateTime<Utc>,
    ) -> Result<CampaignRefresh, InfraError>;
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: Uuid,
    list_id: Uuid,
    title: String,
    body: String,
    html_body: Option<String>,
    status: String,
    sent_count: i32,
    failed_count: i32,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = InfraError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Campaign::from_db(CampaignRecord {
            id: CampaignId::from_uuid(row.id),
            list_id: MailingListId::from_uuid(row.list_id),
            title: row.title,
            body_template: row.body,
            html_template: row.html_body,
            status: row
                .status
                .parse::<CampaignStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            sent_count: to_count(row.sent_count)?,
            failed_count: to_count(row.failed_count)?,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

fn to_count(value: i32) -> Result<u32, InfraError> {
    u32::try_from(value).map_err(|e| InfraError::unexpected(format!("不正な件数: {e}")))
}

/// PostgreSQL 実装の CampaignRepository
#[derive(Debug, Clone)]
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, InfraError> {
        let row = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT
                id, list_id, title, body, html_body, status,
                sent_count, failed_count, completed_at, created_at, updated_at
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Campaign::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%list_id))]
    async fn refresh_bookkeeping(
        &self,
        list_id: &MailingListId,
        now: DateTime<Utc>,
    ) -> Result<CampaignRefresh, InfraError> {
        let statuses: Vec<(String,)> = sqlx::query_as(
            r#"
            WITH stats AS (
                SELECT
                    c.id,
                    COUNT(q.id) FILTER (WHERE q.status = 'sent') AS sent,
                    COUNT(q.id) FILTER (WHERE q.status = 'failed') AS failed,
                    COUNT(q.id) FILTER (WHERE q.status IN ('pending', 'sending')) AS outstanding
                FROM campaigns c
                LEFT JOIN send_queue q ON q.campaign_id = c.id
                WHERE c.list_id = $1 AND c.status = 'sending'
                GROUP BY c.id
            )
            UPDATE campaigns c
            SET
                sent_count = stats.sent::INTEGER,
                failed_count = stats.failed::INTEGER,
                status = CASE WHEN stats.outstanding = 0 THEN 'completed' ELSE 'sending' END,
                completed_at = CASE WHEN stats.outstanding = 0 THEN $2 ELSE NULL END,
                updated_at = $2
            FROM stats
            WHERE c.id = stats.id
            RETURNING c.status
            "#,
        )
        .bind(list_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let completed_label: &str = CampaignStatus::Completed.into();
        let completed = statuses
            .iter()
            .filter(|(status,)| status == completed_label)
            .count();

        Ok(CampaignRefresh {
            refreshed: statuses.len() as u64,
            completed: completed as u64,
        })
    }
}
