//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリのリポジトリとメール送信。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! sitemail-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sitemail_domain::{
    forum::{
        ActivityStatus,
        FORUM_CONFIG_MODULE,
        ForumPost,
        ForumPreference,
        ForumUser,
        ForumUserId,
        PostSummary,
    },
    mail::{EmailMessage, MailError},
    mailing_list::{
        Campaign,
        CampaignId,
        CampaignStatus,
        ListEntry,
        ListEntryId,
        MailingList,
        MailingListId,
        QueueEntry,
        QueueEntryId,
        QueueStats,
        QueueStatus,
    },
};

use crate::{
    error::InfraError,
    mail::MailSender,
    repository::{
        CampaignRefresh,
        CampaignRepository,
        ForumPostRepository,
        ForumUserRepository,
        ListEntryRepository,
        MailingListRepository,
        SendQueueRepository,
        UserConfigRepository,
    },
};

// ===== MockMailSender =====

/// 送信したメールを記録するモック
///
/// `fail_next` で直近の呼び出しを、`fail_for` で特定の宛先を常に失敗させられる。
#[derive(Clone, Default)]
pub struct MockMailSender {
    sent:            Arc<Mutex<Vec<EmailMessage>>>,
    attempts:        Arc<Mutex<u32>>,
    remaining_fails: Arc<Mutex<u32>>,
    failing_to:      Arc<Mutex<Vec<String>>>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の `times` 回の送信を失敗させる
    pub fn fail_next(&self, times: u32) {
        *self.remaining_fails.lock().unwrap() = times;
    }

    /// 指定した宛先への送信を常に失敗させる
    pub fn fail_for(&self, to: impl Into<String>) {
        self.failing_to.lock().unwrap().push(to.into());
    }

    /// 送信に成功したメール
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 失敗を含む送信の呼び出し回数
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), MailError> {
        *self.attempts.lock().unwrap() += 1;

        {
            let mut remaining = self.remaining_fails.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(MailError::SendFailed("mock failure".to_string()));
            }
        }

        if self.failing_to.lock().unwrap().contains(&email.to) {
            return Err(MailError::SendFailed(format!("mock rejects {}", email.to)));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ===== MockMailingListRepository =====

#[derive(Clone, Default)]
pub struct MockMailingListRepository {
    lists: Arc<Mutex<Vec<MailingList>>>,
}

impl MockMailingListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_list(&self, list: MailingList) {
        self.lists.lock().unwrap().push(list);
    }
}

#[async_trait]
impl MailingListRepository for MockMailingListRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<MailingList>, InfraError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.name() == name)
            .cloned())
    }
}

// ===== MockListEntryRepository =====

#[derive(Clone, Default)]
pub struct MockListEntryRepository {
    entries: Arc<Mutex<Vec<ListEntry>>>,
}

impl MockListEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&self, entry: ListEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl ListEntryRepository for MockListEntryRepository {
    async fn find_by_id(&self, id: &ListEntryId) -> Result<Option<ListEntry>, InfraError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == id)
            .cloned())
    }
}

// ===== MockSendQueueRepository =====

/// インメモリの送信キュー
///
/// 保存されたステータスの変化を `status_history` で確認できる。
#[derive(Clone, Default)]
pub struct MockSendQueueRepository {
    entries: Arc<Mutex<Vec<QueueEntry>>>,
    history: Arc<Mutex<Vec<(QueueEntryId, QueueStatus)>>>,
}

impl MockSendQueueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&self, entry: QueueEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    /// 現在のキューの内容
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// ID でエントリを取得する
    pub fn find(&self, id: &QueueEntryId) -> Option<QueueEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    /// 保存されたステータスの履歴（保存順）
    pub fn status_history(&self) -> Vec<(QueueEntryId, QueueStatus)> {
        self.history.lock().unwrap().clone()
    }

    /// キャンペーンごとのキュー集計
    pub fn stats_for(&self, campaign_id: &CampaignId) -> QueueStats {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.campaign_id() == campaign_id)
            .fold(QueueStats::default(), |mut stats, e| {
                match e.status() {
                    QueueStatus::Sent => stats.sent += 1,
                    QueueStatus::Failed => stats.failed += 1,
                    QueueStatus::Pending | QueueStatus::Sending => stats.outstanding += 1,
                }
                stats
            })
    }

    fn record(&self, entry: &QueueEntry) {
        self.history
            .lock()
            .unwrap()
            .push((entry.id().clone(), entry.status()));
    }
}

#[async_trait]
impl SendQueueRepository for MockSendQueueRepository {
    async fn claim_next_pending(
        &self,
        list_id: &MailingListId,
        now: DateTime<Utc>,
    ) -> Result<Option<QueueEntry>, InfraError> {
        let claimed = {
            let mut entries = self.entries.lock().unwrap();
            let next = entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.list_id() == list_id && e.status() == QueueStatus::Pending)
                .min_by_key(|(_, e)| (e.created_at(), *e.id().as_uuid()))
                .map(|(index, _)| index);

            let Some(index) = next else {
                return Ok(None);
            };

            let claimed = entries[index]
                .clone()
                .claimed(now)
                .map_err(|e| InfraError::unexpected(e.to_string()))?;
            entries[index] = claimed.clone();
            claimed
        };

        self.record(&claimed);
        Ok(Some(claimed))
    }

    async fn update_status(
        &self,
        entry: &QueueEntry,
        expected: QueueStatus,
    ) -> Result<(), InfraError> {
        {
            let mut entries = self.entries.lock().unwrap();
            let stored = entries
                .iter_mut()
                .find(|e| e.id() == entry.id() && e.status() == expected)
                .ok_or_else(|| InfraError::conflict("QueueEntry", entry.id().to_string()))?;
            *stored = entry.clone();
        }

        self.record(entry);
        Ok(())
    }

    async fn requeue_stuck(
        &self,
        list_id: &MailingListId,
        claimed_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<u64, InfraError> {
        let mut entries = self.entries.lock().unwrap();
        let mut count = 0;

        for stored in entries.iter_mut() {
            let stuck = stored.list_id() == list_id
                && stored.status() == QueueStatus::Sending
                && stored.claimed_at().is_some_and(|at| at < claimed_before);
            if !stuck {
                continue;
            }

            *stored = stored
                .clone()
                .requeued(now)
                .map_err(|e| InfraError::unexpected(e.to_string()))?;
            count += 1;
        }

        Ok(count)
    }
}

// ===== MockCampaignRepository =====

/// インメモリのキャンペーン
///
/// 集計は紐づけた [`MockSendQueueRepository`] の内容から行う。
#[derive(Clone)]
pub struct MockCampaignRepository {
    campaigns:     Arc<Mutex<Vec<Campaign>>>,
    queue:         MockSendQueueRepository,
    refresh_calls: Arc<Mutex<u32>>,
}

impl MockCampaignRepository {
    pub fn new(queue: MockSendQueueRepository) -> Self {
        Self {
            campaigns: Arc::new(Mutex::new(Vec::new())),
            queue,
            refresh_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn add_campaign(&self, campaign: Campaign) {
        self.campaigns.lock().unwrap().push(campaign);
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.campaigns.lock().unwrap().clone()
    }

    /// `refresh_bookkeeping` の呼び出し回数
    pub fn refresh_calls(&self) -> u32 {
        *self.refresh_calls.lock().unwrap()
    }
}

#[async_trait]
impl CampaignRepository for MockCampaignRepository {
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, InfraError> {
        Ok(self
            .campaigns
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn refresh_bookkeeping(
        &self,
        list_id: &MailingListId,
        now: DateTime<Utc>,
    ) -> Result<CampaignRefresh, InfraError> {
        *self.refresh_calls.lock().unwrap() += 1;

        let mut campaigns = self.campaigns.lock().unwrap();
        let mut result = CampaignRefresh::default();

        for stored in campaigns.iter_mut() {
            if stored.list_id() != list_id
                || stored.status() != CampaignStatus::Sending
            {
                continue;
            }

            let refreshed = stored
                .clone()
                .refreshed(self.queue.stats_for(stored.id()), now);
            result.refreshed += 1;
            if refreshed.completed_at().is_some() {
                result.completed += 1;
            }
            *stored = refreshed;
        }

        Ok(result)
    }
}

// ===== MockForumPostRepository =====

#[derive(Clone, Default)]
pub struct MockForumPostRepository {
    posts: Arc<Mutex<Vec<PostSummary>>>,
}

impl MockForumPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_post(&self, summary: PostSummary) {
        self.posts.lock().unwrap().push(summary);
    }

    /// 投稿の現在の通知状態
    pub fn activity_of(&self, post: &ForumPost) -> Option<ActivityStatus> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.post.id() == post.id())
            .map(|s| s.post.activity())
    }
}

#[async_trait]
impl ForumPostRepository for MockForumPostRepository {
    async fn find_by_activity(
        &self,
        status: ActivityStatus,
    ) -> Result<Vec<PostSummary>, InfraError> {
        let mut found: Vec<PostSummary> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.post.activity() == status)
            .cloned()
            .collect();
        found.sort_by_key(|s| (s.post.created_at(), *s.post.id().as_uuid()));
        Ok(found)
    }

    async fn update_activity(
        &self,
        post: &ForumPost,
        expected: ActivityStatus,
    ) -> Result<(), InfraError> {
        let mut posts = self.posts.lock().unwrap();
        let stored = posts
            .iter_mut()
            .find(|s| s.post.id() == post.id() && s.post.activity() == expected)
            .ok_or_else(|| InfraError::conflict("ForumPost", post.id().to_string()))?;
        stored.post = post.clone();
        Ok(())
    }
}

// ===== MockForumUserRepository =====

/// インメモリのフォーラムユーザーとユーザー設定
///
/// [`ForumUserRepository`] と [`UserConfigRepository`] の両方を実装する。
#[derive(Clone, Default)]
pub struct MockForumUserRepository {
    users:  Arc<Mutex<Vec<ForumUser>>>,
    values: Arc<Mutex<Vec<(ForumUserId, String, String, String)>>>,
}

impl MockForumUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: ForumUser) {
        self.users.lock().unwrap().push(user);
    }

    /// フォーラム設定を保存する
    pub fn set_preference(&self, user_id: &ForumUserId, preference: ForumPreference, value: &str) {
        let mut values = self.values.lock().unwrap();
        values.retain(|(id, module, name, _)| {
            !(id == user_id
                && module == FORUM_CONFIG_MODULE
                && name == preference.key())
        });
        values.push((
            user_id.clone(),
            FORUM_CONFIG_MODULE.to_string(),
            preference.key().to_string(),
            value.to_string(),
        ));
    }

    fn value_of(&self, user_id: &ForumUserId, module: &str, name: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap()
            .iter()
            .find(|(id, m, n, _)| id == user_id && m == module && n == name)
            .map(|(_, _, _, value)| value.clone())
    }
}

#[async_trait]
impl ForumUserRepository for MockForumUserRepository {
    async fn find_by_preference(
        &self,
        preference: ForumPreference,
    ) -> Result<Vec<ForumUser>, InfraError> {
        let mut found: Vec<ForumUser> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                let value = self.value_of(
                    u.id(),
                    FORUM_CONFIG_MODULE,
                    preference.key(),
                );
                ForumPreference::is_enabled(value.as_deref())
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username().cmp(b.username()));
        Ok(found)
    }
}

#[async_trait]
impl UserConfigRepository for MockForumUserRepository {
    async fn get_value(
        &self,
        user_id: &ForumUserId,
        module: &str,
        name: &str,
    ) -> Result<Option<String>, InfraError> {
        Ok(self.value_of(user_id, module, name))
    }
}
