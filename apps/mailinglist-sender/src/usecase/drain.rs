//! # 送信キュー処理
//!
//! 送信待ちエントリを 1 件ずつ取得し、送信して送信済みにする。
//! キューが空になったらキャンペーンの件数集計を 1 回だけ行う。
//!
//! ## 処理の流れ
//!
//! 1. 送信待ちエントリを送信中として取得（取得できなければ終了）
//! 2. キャンペーンと購読者を解決
//! 3. 進捗行 `Sending '<title>' to '<email>'` を出力
//! 4. 本文をレンダリングして送信
//! 5. 送信済みにして送信時刻を記録
//!
//! 1 件の処理が終わるまで次のエントリは取得しない。
//! 失敗時の振る舞いは [`DeliveryPolicy`] に従う。

use std::sync::Arc;

use sitemail_domain::{
    clock::Clock,
    mail::{EmailMessage, MailError},
    mailing_list::{Campaign, ListEntry, MailingList, QueueEntry, QueueStatus},
};
use sitemail_infra::{
    mail::MailSender,
    repository::{CampaignRepository, ListEntryRepository, SendQueueRepository},
};
use sitemail_shared::{ConsoleReporter, event_log::event, log_business_event};

use super::{CampaignRenderer, DeliveryPolicy, FailureAction};
use crate::error::SenderError;

/// 1 回のキュー処理の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// 送信済みにしたエントリ数
    pub sent:      u32,
    /// 失敗にしたエントリ数（`mark_failed` のみ）
    pub failed:    u32,
    /// 集計し直したキャンペーン数
    pub refreshed: u64,
    /// 今回完了になったキャンペーン数
    pub completed: u64,
}

enum EntryOutcome {
    Sent,
    Failed,
}

/// 送信キュー処理
pub struct QueueDrainer {
    queue:     Arc<dyn SendQueueRepository>,
    campaigns: Arc<dyn CampaignRepository>,
    entries:   Arc<dyn ListEntryRepository>,
    sender:    Arc<dyn MailSender>,
    renderer:  CampaignRenderer,
    reporter:  Arc<dyn ConsoleReporter>,
    clock:     Arc<dyn Clock>,
    policy:    DeliveryPolicy,
}

impl QueueDrainer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: Arc<dyn SendQueueRepository>,
        campaigns: Arc<dyn CampaignRepository>,
        entries: Arc<dyn ListEntryRepository>,
        sender: Arc<dyn MailSender>,
        renderer: CampaignRenderer,
        reporter: Arc<dyn ConsoleReporter>,
        clock: Arc<dyn Clock>,
        policy: DeliveryPolicy,
    ) -> Self {
        Self {
            queue,
            campaigns,
            entries,
            sender,
            renderer,
            reporter,
            clock,
            policy,
        }
    }

    /// キューが空になるまで送信し、最後にキャンペーンの件数を集計し直す
    ///
    /// # Errors
    ///
    /// - `abort` ポリシーで配信に失敗した場合（エントリは送信中のまま、集計は行わない）
    /// - データベースエラー（ポリシーに関係なく中断）
    #[tracing::instrument(skip_all, fields(list = %list.name()))]
    pub async fn drain(&self, list: &MailingList) -> Result<DrainSummary, SenderError> {
        let mut summary = DrainSummary::default();

        while let Some(entry) = self
            .queue
            .claim_next_pending(list.id(), self.clock.now())
            .await?
        {
            match self.process(list, entry).await? {
                EntryOutcome::Sent => summary.sent += 1,
                EntryOutcome::Failed => summary.failed += 1,
            }
        }

        let refresh = self
            .campaigns
            .refresh_bookkeeping(list.id(), self.clock.now())
            .await?;
        summary.refreshed = refresh.refreshed;
        summary.completed = refresh.completed;

        log_business_event!(
            event.category = event::category::MAILING_LIST,
            event.action = event::action::QUEUE_DRAINED,
            event.entity_type = event::entity_type::MAILING_LIST,
            event.entity_id = %list.id(),
            event.result = event::result::SUCCESS,
            sent = summary.sent,
            failed = summary.failed,
            "送信キューを処理しました"
        );
        log_business_event!(
            event.category = event::category::MAILING_LIST,
            event.action = event::action::CAMPAIGNS_REFRESHED,
            event.entity_type = event::entity_type::CAMPAIGN,
            event.result = event::result::SUCCESS,
            refreshed = summary.refreshed,
            completed = summary.completed,
            "キャンペーンの件数を集計しました"
        );

        Ok(summary)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(entry_id = %entry.id()))]
    async fn process(
        &self,
        list: &MailingList,
        entry: QueueEntry,
    ) -> Result<EntryOutcome, SenderError> {
        let (campaign, recipient) = match self.resolve(&entry).await {
            Ok(found) => found,
            Err(e) => return self.give_up(entry, e).await,
        };

        self.reporter.line(&format!(
            "Sending '{}' to '{}'",
            campaign.title(),
            recipient.email()
        ));

        let message = match self.renderer.render(list, &campaign, &recipient) {
            Ok(message) => message,
            Err(e) => return self.give_up(entry, SenderError::Render(e)).await,
        };

        let (entry, result) = self.transmit(entry, &message).await?;
        if let Err(e) = result {
            return self.give_up(entry, SenderError::Send(e)).await;
        }

        let sent = entry.sent(self.clock.now())?;
        self.queue.update_status(&sent, QueueStatus::Sending).await?;

        log_business_event!(
            event.category = event::category::MAILING_LIST,
            event.action = event::action::CAMPAIGN_MAIL_SENT,
            event.entity_type = event::entity_type::QUEUE_ENTRY,
            event.entity_id = %sent.id(),
            event.result = event::result::SUCCESS,
            campaign_id = %campaign.id(),
            attempts = sent.attempts(),
            "キャンペーンメールを送信しました"
        );

        Ok(EntryOutcome::Sent)
    }

    async fn resolve(&self, entry: &QueueEntry) -> Result<(Campaign, ListEntry), SenderError> {
        let campaign = self
            .campaigns
            .find_by_id(entry.campaign_id())
            .await?
            .ok_or_else(|| SenderError::CampaignNotFound(entry.campaign_id().clone()))?;
        let recipient = self
            .entries
            .find_by_id(entry.entry_id())
            .await?
            .ok_or_else(|| SenderError::EntryNotFound(entry.entry_id().clone()))?;

        Ok((campaign, recipient))
    }

    /// ポリシーの回数まで送信を試みる
    ///
    /// 試行回数を加算したエントリと最後の送信結果を返す。
    async fn transmit(
        &self,
        mut entry: QueueEntry,
        message: &EmailMessage,
    ) -> Result<(QueueEntry, Result<(), MailError>), SenderError> {
        let max_attempts = self.policy.attempts_per_entry();

        loop {
            entry = entry.attempted(self.clock.now())?;

            match self.sender.send_email(message).await {
                Ok(()) => return Ok((entry, Ok(()))),
                Err(e) if entry.attempts() < max_attempts => {
                    let backoff = self.policy.backoff(entry.attempts() - 1);
                    tracing::warn!(
                        error = %e,
                        attempt = entry.attempts(),
                        max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        "メール送信に失敗、リトライします"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Ok((entry, Err(e))),
            }
        }
    }

    /// 配信失敗をポリシーに従って処理する
    ///
    /// `mark_failed` ではエントリを失敗にして続行し、それ以外はエラーを返す。
    async fn give_up(
        &self,
        entry: QueueEntry,
        error: SenderError,
    ) -> Result<EntryOutcome, SenderError> {
        if self.policy.on_failure == FailureAction::Abort || !error.is_delivery_failure() {
            log_business_event!(
                event.category = event::category::MAILING_LIST,
                event.action = event::action::CAMPAIGN_MAIL_FAILED,
                event.entity_type = event::entity_type::QUEUE_ENTRY,
                event.entity_id = %entry.id(),
                event.result = event::result::FAILURE,
                error = %error,
                "配信に失敗したため処理を中断します"
            );
            return Err(error);
        }

        let failed = entry.failed(error.to_string(), self.clock.now())?;
        self.queue.update_status(&failed, QueueStatus::Sending).await?;

        log_business_event!(
            event.category = event::category::MAILING_LIST,
            event.action = event::action::CAMPAIGN_MAIL_FAILED,
            event.entity_type = event::entity_type::QUEUE_ENTRY,
            event.entity_id = %failed.id(),
            event.result = event::result::FAILURE,
            attempts = failed.attempts(),
            error = %error,
            "配信に失敗したエントリを失敗にしました"
        );

        Ok(EntryOutcome::Failed)
    }
}
