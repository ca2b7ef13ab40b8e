//! # フォーラムアクティビティ通知
//!
//! 投稿の通知状態（`new → queued → ready → sent`）を進めながらメールを送る。
//!
//! ## フェーズ
//!
//! 1. **通知**: `new` の投稿。投稿者が自動送信設定なら `ready` にする。
//!    それ以外はモデレーターに確認依頼メールを送り `queued` にする
//! 2. **キュー確認**: `queued` の投稿。自動送信設定の投稿者なら `ready` にする。
//!    今回の実行で確認依頼を送った場合のみ、残りの投稿とトピック URL を表示する
//! 3. **送信**: `ready` の投稿を購読者に送り `sent` にする
//!
//! 個々の宛先への送信失敗は fire-and-forget（ログ出力のみ）で、実行は止めない。
//! 状態の更新は条件付きで行い、競合はエラーにする。

use std::sync::Arc;

use sitemail_domain::{
    clock::Clock,
    forum::{ActivityStatus, FORUM_CONFIG_MODULE, ForumPreference, ForumUser, PostSummary},
};
use sitemail_infra::{
    mail::MailSender,
    repository::{ForumPostRepository, ForumUserRepository, UserConfigRepository},
};
use sitemail_shared::{ConsoleReporter, event_log::event, log_business_event};

use super::{ForumMail, ForumTemplateRenderer};
use crate::error::NotifierError;

/// 1 回の実行結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivitySummary {
    /// 自動送信設定により承認済みにした投稿数
    pub auto_approved:    u32,
    /// モデレーターに確認依頼を送った投稿数
    pub notified:         u32,
    /// モデレーション待ちとして表示した投稿数
    pub queued_reminders: u32,
    /// アクティビティとして送信した投稿数
    pub activity_sent:    u32,
}

/// フォーラムアクティビティ通知
pub struct ForumActivityUseCase {
    posts:    Arc<dyn ForumPostRepository>,
    users:    Arc<dyn ForumUserRepository>,
    config:   Arc<dyn UserConfigRepository>,
    sender:   Arc<dyn MailSender>,
    renderer: ForumTemplateRenderer,
    reporter: Arc<dyn ConsoleReporter>,
    clock:    Arc<dyn Clock>,
    base_url: String,
}

impl ForumActivityUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        posts: Arc<dyn ForumPostRepository>,
        users: Arc<dyn ForumUserRepository>,
        config: Arc<dyn UserConfigRepository>,
        sender: Arc<dyn MailSender>,
        renderer: ForumTemplateRenderer,
        reporter: Arc<dyn ConsoleReporter>,
        clock: Arc<dyn Clock>,
        base_url: String,
    ) -> Self {
        Self {
            posts,
            users,
            config,
            sender,
            renderer,
            reporter,
            clock,
            base_url,
        }
    }

    /// 3 フェーズを順に実行する
    #[tracing::instrument(skip_all)]
    pub async fn run(&self) -> Result<ActivitySummary, NotifierError> {
        let mut summary = ActivitySummary::default();

        let notifications_sent = self.notify_new_posts(&mut summary).await?;
        self.review_queue(notifications_sent, &mut summary).await?;
        self.send_activity(&mut summary).await?;

        tracing::info!(
            auto_approved = summary.auto_approved,
            notified = summary.notified,
            queued_reminders = summary.queued_reminders,
            activity_sent = summary.activity_sent,
            "フォーラム通知の実行が完了しました"
        );

        Ok(summary)
    }

    /// 新規投稿をモデレーターに通知する
    ///
    /// 確認依頼を 1 件でも送った場合は `true` を返す。
    async fn notify_new_posts(&self, summary: &mut ActivitySummary) -> Result<bool, NotifierError> {
        let posts = self.posts.find_by_activity(ActivityStatus::New).await?;
        if posts.is_empty() {
            return Ok(false);
        }

        let moderators = self
            .users
            .find_by_preference(ForumPreference::NotifyNewPosts)
            .await?;
        let mut notifications_sent = false;

        for post in posts {
            if self.is_automatic_send(&post.author).await? {
                self.auto_approve(post, ActivityStatus::New).await?;
                summary.auto_approved += 1;
                continue;
            }

            self.reporter.line(&format!(
                "Notifying for post in {} by {}",
                post.topic.title(),
                post.author.username()
            ));
            for moderator in &moderators {
                self.deliver(ForumMail::ModerationRequest, &post, moderator)
                    .await;
            }

            let queued = post.post.moderation_requested(self.clock.now())?;
            self.posts
                .update_activity(&queued, ActivityStatus::New)
                .await?;
            summary.notified += 1;
            notifications_sent = true;
        }

        Ok(notifications_sent)
    }

    /// モデレーション待ちの投稿を確認する
    async fn review_queue(
        &self,
        notifications_sent: bool,
        summary: &mut ActivitySummary,
    ) -> Result<(), NotifierError> {
        let posts = self.posts.find_by_activity(ActivityStatus::Queued).await?;

        for post in posts {
            if self.is_automatic_send(&post.author).await? {
                self.auto_approve(post, ActivityStatus::Queued).await?;
                summary.auto_approved += 1;
                continue;
            }

            if !notifications_sent {
                continue;
            }

            self.reporter.line(&format!(
                "Queued post in {} by {}",
                post.topic.title(),
                post.author.username()
            ));
            self.reporter.line(&post.topic.url(&self.base_url));
            summary.queued_reminders += 1;
        }

        Ok(())
    }

    /// 承認済みの投稿を購読者に送る
    async fn send_activity(&self, summary: &mut ActivitySummary) -> Result<(), NotifierError> {
        let posts = self.posts.find_by_activity(ActivityStatus::Ready).await?;
        if posts.is_empty() {
            return Ok(());
        }

        let subscribers = self
            .users
            .find_by_preference(ForumPreference::ReceiveActivity)
            .await?;

        for post in posts {
            self.reporter.line(&format!(
                "Sending activity for post in {} by {}",
                post.topic.title(),
                post.author.username()
            ));
            for subscriber in &subscribers {
                self.deliver(ForumMail::NewActivity, &post, subscriber).await;
            }

            let sent = post.post.activity_sent(self.clock.now())?;
            self.posts
                .update_activity(&sent, ActivityStatus::Ready)
                .await?;
            summary.activity_sent += 1;
        }

        Ok(())
    }

    async fn is_automatic_send(&self, author: &ForumUser) -> Result<bool, NotifierError> {
        let value = self
            .config
            .get_value(
                author.id(),
                FORUM_CONFIG_MODULE,
                ForumPreference::AutomaticSend.key(),
            )
            .await?;
        Ok(ForumPreference::is_enabled(value.as_deref()))
    }

    async fn auto_approve(
        &self,
        post: PostSummary,
        expected: ActivityStatus,
    ) -> Result<(), NotifierError> {
        self.reporter.line(&format!(
            "Automatically sending {} by {}",
            post.topic.title(),
            post.author.username()
        ));

        let ready = post.post.auto_approved(self.clock.now())?;
        self.posts.update_activity(&ready, expected).await?;

        log_business_event!(
            event.category = event::category::FORUM,
            event.action = event::action::POST_AUTO_APPROVED,
            event.entity_type = event::entity_type::FORUM_POST,
            event.entity_id = %ready.id(),
            event.result = event::result::SUCCESS,
            author = %post.author.username(),
            "自動送信設定により投稿を承認済みにしました"
        );

        Ok(())
    }

    /// 1 宛先にメールを送る（fire-and-forget）
    ///
    /// レンダリングや送信に失敗してもエラーを返さない（ログ出力のみ）。
    async fn deliver(&self, mail: ForumMail, post: &PostSummary, recipient: &ForumUser) {
        let (sent_action, failed_action) = match mail {
            ForumMail::ModerationRequest => (
                event::action::MODERATION_MAIL_SENT,
                event::action::MODERATION_MAIL_FAILED,
            ),
            ForumMail::NewActivity => (
                event::action::ACTIVITY_MAIL_SENT,
                event::action::ACTIVITY_MAIL_FAILED,
            ),
        };

        let email = match self
            .renderer
            .render(mail, post, recipient, &self.base_url)
        {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    post_id = %post.post.id(),
                    "通知テンプレートのレンダリングに失敗"
                );
                return;
            }
        };

        match self.sender.send_email(&email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::FORUM,
                    event.action = sent_action,
                    event.entity_type = event::entity_type::FORUM_POST,
                    event.entity_id = %post.post.id(),
                    event.result = event::result::SUCCESS,
                    mail.recipient = %recipient.email(),
                    "フォーラム通知メール送信成功"
                );
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::FORUM,
                    event.action = failed_action,
                    event.entity_type = event::entity_type::FORUM_POST,
                    event.entity_id = %post.post.id(),
                    event.result = event::result::FAILURE,
                    mail.recipient = %recipient.email(),
                    error = %e,
                    "フォーラム通知メール送信失敗"
                );
            }
        }
    }
}
