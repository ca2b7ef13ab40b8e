//! # 送信キューエントリ
//!
//! 「このキャンペーンをこの購読者に送る」1 件の作業単位。
//! 状態遷移は `pending → sending → sent`（または `sending → failed`）のみ許可する。
//! `sent` は送信成功後にのみ到達する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::{CampaignId, ListEntryId, MailingListId};
use crate::DomainError;

define_uuid_id! {
    /// 送信キューエントリ ID
    pub struct QueueEntryId;
}

/// 送信キューのステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QueueStatus {
    /// 送信待ち
    Pending,
    /// 送信中（取得済み）
    Sending,
    /// 送信済み
    Sent,
    /// 送信失敗
    Failed,
}

impl std::str::FromStr for QueueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sending" => Ok(Self::Sending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::Validation(format!(
                "不正な送信キューステータス: {s}"
            ))),
        }
    }
}

/// 送信キューエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    id: QueueEntryId,
    list_id: MailingListId,
    campaign_id: CampaignId,
    entry_id: ListEntryId,
    status: QueueStatus,
    attempts: u32,
    last_error: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    sent_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// 送信キューエントリの新規作成パラメータ
pub struct NewQueueEntry {
    pub id: QueueEntryId,
    pub list_id: MailingListId,
    pub campaign_id: CampaignId,
    pub entry_id: ListEntryId,
    pub now: DateTime<Utc>,
}

/// 送信キューエントリの DB 復元パラメータ
pub struct QueueEntryRecord {
    pub id: QueueEntryId,
    pub list_id: MailingListId,
    pub campaign_id: CampaignId,
    pub entry_id: ListEntryId,
    pub status: QueueStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueueEntry {
    /// 送信待ちのエントリを作成する
    pub fn new(params: NewQueueEntry) -> Self {
        Self {
            id: params.id,
            list_id: params.list_id,
            campaign_id: params.campaign_id,
            entry_id: params.entry_id,
            status: QueueStatus::Pending,
            attempts: 0,
            last_error: None,
            claimed_at: None,
            sent_at: None,
            created_at: params.now,
            updated_at: params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: QueueEntryRecord) -> Self {
        Self {
            id: record.id,
            list_id: record.list_id,
            campaign_id: record.campaign_id,
            entry_id: record.entry_id,
            status: record.status,
            attempts: record.attempts,
            last_error: record.last_error,
            claimed_at: record.claimed_at,
            sent_at: record.sent_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &QueueEntryId {
        &self.id
    }

    pub fn list_id(&self) -> &MailingListId {
        &self.list_id
    }

    pub fn campaign_id(&self) -> &CampaignId {
        &self.campaign_id
    }

    pub fn entry_id(&self) -> &ListEntryId {
        &self.entry_id
    }

    pub fn status(&self) -> QueueStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 送信中として取得した新しいインスタンスを返す
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 送信待ち以外の状態で呼び出した場合
    pub fn claimed(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(QueueStatus::Pending, "取得")?;

        Ok(Self {
            status: QueueStatus::Sending,
            claimed_at: Some(now),
            updated_at: now,
            ..self
        })
    }

    /// 送信試行回数を 1 増やした新しいインスタンスを返す
    pub fn attempted(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(QueueStatus::Sending, "送信試行")?;

        Ok(Self {
            attempts: self.attempts.saturating_add(1),
            updated_at: now,
            ..self
        })
    }

    /// 送信済みにした新しいインスタンスを返す
    ///
    /// 送信時刻として `now` を記録する。
    pub fn sent(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(QueueStatus::Sending, "送信完了")?;

        Ok(Self {
            status: QueueStatus::Sent,
            last_error: None,
            sent_at: Some(now),
            updated_at: now,
            ..self
        })
    }

    /// 送信失敗にした新しいインスタンスを返す
    pub fn failed(self, reason: impl Into<String>, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(QueueStatus::Sending, "送信失敗")?;

        Ok(Self {
            status: QueueStatus::Failed,
            last_error: Some(reason.into()),
            updated_at: now,
            ..self
        })
    }

    /// 送信待ちに戻した新しいインスタンスを返す
    ///
    /// 送信中のまま取り残されたエントリを運用者が再投入するために使う。
    pub fn requeued(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_status(QueueStatus::Sending, "再投入")?;

        Ok(Self {
            status: QueueStatus::Pending,
            claimed_at: None,
            updated_at: now,
            ..self
        })
    }

    fn ensure_status(&self, expected: QueueStatus, operation: &str) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::Validation(format!(
                "{operation}は{expected}状態でのみ可能です（現在: {}）",
                self.status
            )));
        }
        Ok(())
    }
}
