//! # フォーラム投稿
//!
//! 投稿本文は扱わず、メール通知の進行状態（`activity_mailed`）のみを管理する。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::{ForumTopic, ForumTopicId, ForumUser, ForumUserId};
use crate::DomainError;

define_uuid_id! {
    /// 投稿 ID
    pub struct ForumPostId;
}

/// 投稿の通知状態
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityStatus {
    /// 新規投稿（未通知）
    New,
    /// モデレーター通知済み（承認待ち）
    Queued,
    /// アクティビティ送信待ち
    Ready,
    /// アクティビティ送信済み
    Sent,
}

impl std::str::FromStr for ActivityStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "queued" => Ok(Self::Queued),
            "ready" => Ok(Self::Ready),
            "sent" => Ok(Self::Sent),
            _ => Err(DomainError::Validation(format!("不正な通知状態: {s}"))),
        }
    }
}

/// フォーラム投稿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumPost {
    id: ForumPostId,
    topic_id: ForumTopicId,
    user_id: ForumUserId,
    activity: ActivityStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// フォーラム投稿の DB 復元パラメータ
pub struct ForumPostRecord {
    pub id: ForumPostId,
    pub topic_id: ForumTopicId,
    pub user_id: ForumUserId,
    pub activity: ActivityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForumPost {
    pub fn from_db(record: ForumPostRecord) -> Self {
        Self {
            id: record.id,
            topic_id: record.topic_id,
            user_id: record.user_id,
            activity: record.activity,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn id(&self) -> &ForumPostId {
        &self.id
    }

    pub fn topic_id(&self) -> &ForumTopicId {
        &self.topic_id
    }

    pub fn user_id(&self) -> &ForumUserId {
        &self.user_id
    }

    pub fn activity(&self) -> ActivityStatus {
        self.activity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// モデレーター通知済みにした新しいインスタンスを返す
    pub fn moderation_requested(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.transition(&[ActivityStatus::New], ActivityStatus::Queued, now)
    }

    /// 自動送信によりアクティビティ送信待ちにした新しいインスタンスを返す
    ///
    /// 新規投稿・承認待ちのどちらからも遷移できる。
    pub fn auto_approved(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.transition(
            &[ActivityStatus::New, ActivityStatus::Queued],
            ActivityStatus::Ready,
            now,
        )
    }

    /// アクティビティ送信済みにした新しいインスタンスを返す
    pub fn activity_sent(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.transition(&[ActivityStatus::Ready], ActivityStatus::Sent, now)
    }

    fn transition(
        self,
        from: &[ActivityStatus],
        to: ActivityStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !from.contains(&self.activity) {
            return Err(DomainError::Validation(format!(
                "通知状態を {} から {to} に変更できません",
                self.activity
            )));
        }

        Ok(Self {
            activity: to,
            updated_at: now,
            ..self
        })
    }
}

/// 通知に必要な情報をまとめた投稿
///
/// 進捗行・メール本文にはトピック名と投稿者名を使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub post:   ForumPost,
    pub topic:  ForumTopic,
    pub author: ForumUser,
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn make_post(activity: ActivityStatus, now: DateTime<Utc>) -> ForumPost {
        ForumPost::from_db(ForumPostRecord {
            id: ForumPostId::new(),
            topic_id: ForumTopicId::new(),
            user_id: ForumUserId::new(),
            activity,
            created_at: now,
            updated_at: now,
        })
    }

    #[rstest]
    fn test_新規投稿はモデレーター通知で承認待ちになる(now: DateTime<Utc>) {
        let post = make_post(ActivityStatus::New, now).moderation_requested(now).unwrap();

        assert_eq!(post.activity(), ActivityStatus::Queued);
    }

    #[rstest]
    #[case(ActivityStatus::New)]
    #[case(ActivityStatus::Queued)]
    fn test_自動送信は新規と承認待ちから送信待ちにできる(
        now: DateTime<Utc>,
        #[case] from: ActivityStatus,
    ) {
        let post = make_post(from, now).auto_approved(now).unwrap();

        assert_eq!(post.activity(), ActivityStatus::Ready);
    }

    #[rstest]
    fn test_送信済みの投稿は自動送信できない(now: DateTime<Utc>) {
        let result = make_post(ActivityStatus::Sent, now).auto_approved(now);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_送信待ち以外はアクティビティ送信済みにできない(now: DateTime<Utc>) {
        assert!(make_post(ActivityStatus::Queued, now).activity_sent(now).is_err());
        assert!(make_post(ActivityStatus::Ready, now).activity_sent(now).is_ok());
    }
}
