//! # キャンペーン
//!
//! 購読者に一斉送信するメッセージ（件名 + 本文テンプレート）と、
//! 送信キューから集計する配信状況を管理する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::MailingListId;
use crate::DomainError;

define_uuid_id! {
    /// キャンペーン ID
    pub struct CampaignId;
}

/// キャンペーンステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CampaignStatus {
    /// 下書き（まだキューに積まれていない）
    Draft,
    /// 配信中（未処理のキューエントリが残っている可能性がある）
    Sending,
    /// 配信完了
    Completed,
}

impl std::str::FromStr for CampaignStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sending" => Ok(Self::Sending),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::Validation(format!(
                "不正なキャンペーンステータス: {s}"
            ))),
        }
    }
}

/// 送信キューから集計したキャンペーン単位の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// 送信済み
    pub sent:        u32,
    /// 送信失敗
    pub failed:      u32,
    /// 未処理（pending + sending）
    pub outstanding: u32,
}

/// キャンペーン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    id: CampaignId,
    list_id: MailingListId,
    title: String,
    body_template: String,
    html_template: Option<String>,
    status: CampaignStatus,
    sent_count: u32,
    failed_count: u32,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// キャンペーンの新規作成パラメータ
pub struct NewCampaign {
    pub id: CampaignId,
    pub list_id: MailingListId,
    pub title: String,
    pub body_template: String,
    pub html_template: Option<String>,
    pub now: DateTime<Utc>,
}

/// キャンペーンの DB 復元パラメータ
pub struct CampaignRecord {
    pub id: CampaignId,
    pub list_id: MailingListId,
    pub title: String,
    pub body_template: String,
    pub html_template: Option<String>,
    pub status: CampaignStatus,
    pub sent_count: u32,
    pub failed_count: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// 新しいキャンペーンを下書き状態で作成する
    pub fn new(params: NewCampaign) -> Self {
        Self {
            id: params.id,
            list_id: params.list_id,
            title: params.title,
            body_template: params.body_template,
            html_template: params.html_template,
            status: CampaignStatus::Draft,
            sent_count: 0,
            failed_count: 0,
            completed_at: None,
            created_at: params.now,
            updated_at: params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: CampaignRecord) -> Self {
        Self {
            id: record.id,
            list_id: record.list_id,
            title: record.title,
            body_template: record.body_template,
            html_template: record.html_template,
            status: record.status,
            sent_count: record.sent_count,
            failed_count: record.failed_count,
            completed_at: record.completed_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    pub fn list_id(&self) -> &MailingListId {
        &self.list_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body_template(&self) -> &str {
        &self.body_template
    }

    pub fn html_template(&self) -> Option<&str> {
        self.html_template.as_deref()
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn sent_count(&self) -> u32 {
        self.sent_count
    }

    pub fn failed_count(&self) -> u32 {
        self.failed_count
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 配信を開始した新しいインスタンスを返す
    ///
    /// # Errors
    ///
    /// - `DomainError::Validation`: 下書き以外の状態で呼び出した場合
    pub fn started(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.status != CampaignStatus::Draft {
            return Err(DomainError::Validation(format!(
                "配信開始は下書き状態でのみ可能です（現在: {}）",
                self.status
            )));
        }

        Ok(Self {
            status: CampaignStatus::Sending,
            updated_at: now,
            ..self
        })
    }

    /// キュー集計を反映した新しいインスタンスを返す
    ///
    /// 配信中のキャンペーンのみ対象。未処理エントリが残っていなければ完了にする。
    /// 配信中以外はそのまま返す。
    pub fn refreshed(self, stats: QueueStats, now: DateTime<Utc>) -> Self {
        if self.status != CampaignStatus::Sending {
            return self;
        }

        let completed = stats.outstanding == 0;
        Self {
            status: if completed {
                CampaignStatus::Completed
            } else {
                CampaignStatus::Sending
            },
            sent_count: stats.sent,
            failed_count: stats.failed,
            completed_at: if completed { Some(now) } else { None },
            updated_at: now,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[fixture]
    fn sending_campaign(now: DateTime<Utc>) -> Campaign {
        Campaign::new(NewCampaign {
            id: CampaignId::new(),
            list_id: MailingListId::new(),
            title: "Mbed TLS 3.6 リリースのお知らせ".to_string(),
            body_template: "{{ name }} 様".to_string(),
            html_template: None,
            now,
        })
        .started(now)
        .unwrap()
    }

    #[rstest]
    fn test_未処理が残っていれば配信中のまま件数だけ更新する(
        now: DateTime<Utc>,
        sending_campaign: Campaign,
    ) {
        let stats = QueueStats {
            sent:        3,
            failed:      1,
            outstanding: 2,
        };

        let refreshed = sending_campaign.refreshed(stats, now);

        assert_eq!(refreshed.status(), CampaignStatus::Sending);
        assert_eq!(refreshed.sent_count(), 3);
        assert_eq!(refreshed.failed_count(), 1);
        assert_eq!(refreshed.completed_at(), None);
    }

    #[rstest]
    fn test_未処理がなければ完了になる(now: DateTime<Utc>, sending_campaign: Campaign) {
        let stats = QueueStats {
            sent:        5,
            failed:      0,
            outstanding: 0,
        };

        let refreshed = sending_campaign.refreshed(stats, now);

        assert_eq!(refreshed.status(), CampaignStatus::Completed);
        assert_eq!(refreshed.completed_at(), Some(now));
    }

    #[rstest]
    fn test_下書きはrefreshedで変化しない(now: DateTime<Utc>) {
        let draft = Campaign::new(NewCampaign {
            id: CampaignId::new(),
            list_id: MailingListId::new(),
            title: "下書き".to_string(),
            body_template: "本文".to_string(),
            html_template: None,
            now,
        });

        let refreshed = draft.clone().refreshed(QueueStats::default(), now);

        assert_eq!(refreshed, draft);
    }

    #[rstest]
    fn test_配信中のキャンペーンは再度開始できない(
        now: DateTime<Utc>,
        sending_campaign: Campaign,
    ) {
        assert!(sending_campaign.started(now).is_err());
    }

    #[rstest]
    #[case("draft", CampaignStatus::Draft)]
    #[case("sending", CampaignStatus::Sending)]
    #[case("completed", CampaignStatus::Completed)]
    fn test_ステータスの文字列変換(#[case] s: &str, #[case] expected: CampaignStatus) {
        assert_eq!(s.parse::<CampaignStatus>().unwrap(), expected);
        assert_eq!(expected.to_string(), s);
    }
}
