//! ForumActivityUseCase の統合テスト
//!
//! インメモリのモックリポジトリで 3 フェーズ（通知・キュー確認・送信）の流れを検証する。

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use sitemail_domain::{
    clock::FixedClock,
    forum::{
        ActivityStatus,
        ForumPost,
        ForumPostId,
        ForumPostRecord,
        ForumPreference,
        ForumTopic,
        ForumTopicId,
        ForumUser,
        ForumUserId,
        PostSummary,
    },
};
use sitemail_forum_notifier::usecase::{
    ActivitySummary,
    ForumActivityUseCase,
    ForumTemplateRenderer,
};
use sitemail_infra::mock::{MockForumPostRepository, MockForumUserRepository, MockMailSender};
use sitemail_shared::console::RecordingReporter;

const BASE_URL: &str = "https://polarssl.example.org";

fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

struct Forum {
    posts:    MockForumPostRepository,
    users:    MockForumUserRepository,
    sender:   MockMailSender,
    reporter: RecordingReporter,
}

impl Forum {
    fn new() -> Self {
        Self {
            posts:    MockForumPostRepository::new(),
            users:    MockForumUserRepository::new(),
            sender:   MockMailSender::new(),
            reporter: RecordingReporter::new(),
        }
    }

    fn user(&self, username: &str, preferences: &[ForumPreference]) -> ForumUser {
        let user = ForumUser::new(
            ForumUserId::new(),
            username,
            format!("{username}@example.com"),
        );
        self.users.add_user(user.clone());
        for preference in preferences {
            self.users.set_preference(user.id(), *preference, "1");
        }
        user
    }

    fn post(
        &self,
        title: &str,
        link: &str,
        author: &ForumUser,
        activity: ActivityStatus,
        order: i64,
    ) -> ForumPost {
        let topic = ForumTopic::new(ForumTopicId::new(), title, link);
        let created_at = base_time() + TimeDelta::seconds(order);
        let post = ForumPost::from_db(ForumPostRecord {
            id: ForumPostId::new(),
            topic_id: topic.id().clone(),
            user_id: author.id().clone(),
            activity,
            created_at,
            updated_at: created_at,
        });
        self.posts.add_post(PostSummary {
            post: post.clone(),
            topic,
            author: author.clone(),
        });
        post
    }

    fn usecase(&self) -> ForumActivityUseCase {
        ForumActivityUseCase::new(
            Arc::new(self.posts.clone()),
            Arc::new(self.users.clone()),
            Arc::new(self.users.clone()),
            Arc::new(self.sender.clone()),
            ForumTemplateRenderer::new().unwrap(),
            Arc::new(self.reporter.clone()),
            Arc::new(FixedClock::new(base_time() + TimeDelta::hours(1))),
            BASE_URL.to_string(),
        )
    }

    fn recipients(&self) -> Vec<String> {
        self.sender
            .sent_emails()
            .into_iter()
            .map(|e| e.to)
            .collect()
    }
}

#[tokio::test]
async fn 新規投稿はモデレーターに通知されキューに入る() {
    let forum = Forum::new();
    let author = forum.user("alice", &[]);
    forum.user("mod", &[ForumPreference::NotifyNewPosts]);
    forum.user("reader", &[ForumPreference::ReceiveActivity]);
    let post = forum.post("Handshake failure", "handshake-failure", &author, ActivityStatus::New, 1);

    let summary = forum.usecase().run().await.unwrap();

    assert_eq!(forum.posts.activity_of(&post), Some(ActivityStatus::Queued));
    assert_eq!(forum.recipients(), vec!["mod@example.com"]);
    assert_eq!(
        forum.reporter.lines(),
        vec![
            "Notifying for post in Handshake failure by alice".to_string(),
            "Queued post in Handshake failure by alice".to_string(),
            format!("{BASE_URL}/discussions/handshake-failure"),
        ]
    );
    assert_eq!(
        summary,
        ActivitySummary {
            auto_approved:    0,
            notified:         1,
            queued_reminders: 1,
            activity_sent:    0,
        }
    );
}

#[tokio::test]
async fn 自動送信ユーザーの投稿はその場で購読者に送られる() {
    let forum = Forum::new();
    let author = forum.user("trusted", &[ForumPreference::AutomaticSend]);
    forum.user("mod", &[ForumPreference::NotifyNewPosts]);
    forum.user("reader", &[ForumPreference::ReceiveActivity]);
    let post = forum.post("Release 1.3", "release-13", &author, ActivityStatus::New, 1);

    let summary = forum.usecase().run().await.unwrap();

    assert_eq!(forum.posts.activity_of(&post), Some(ActivityStatus::Sent));
    assert_eq!(forum.recipients(), vec!["reader@example.com"]);
    assert_eq!(
        forum.reporter.lines(),
        vec![
            "Automatically sending Release 1.3 by trusted".to_string(),
            "Sending activity for post in Release 1.3 by trusted".to_string(),
        ]
    );
    assert_eq!(summary.auto_approved, 1);
    assert_eq!(summary.activity_sent, 1);
}

#[tokio::test]
async fn 通知を送っていない実行ではキュー内の投稿を表示しない() {
    let forum = Forum::new();
    let author = forum.user("alice", &[]);
    let post = forum.post("Old question", "old-question", &author, ActivityStatus::Queued, 1);

    let summary = forum.usecase().run().await.unwrap();

    assert!(forum.reporter.lines().is_empty());
    assert_eq!(forum.posts.activity_of(&post), Some(ActivityStatus::Queued));
    assert_eq!(summary, ActivitySummary::default());
}

#[tokio::test]
async fn キュー内の投稿も投稿者が自動送信なら承認済みになる() {
    let forum = Forum::new();
    let author = forum.user("trusted", &[ForumPreference::AutomaticSend]);
    forum.user("reader", &[ForumPreference::ReceiveActivity]);
    let post = forum.post("Queued earlier", "queued-earlier", &author, ActivityStatus::Queued, 1);

    forum.usecase().run().await.unwrap();

    assert_eq!(forum.posts.activity_of(&post), Some(ActivityStatus::Sent));
    assert_eq!(
        forum.reporter.lines(),
        vec![
            "Automatically sending Queued earlier by trusted".to_string(),
            "Sending activity for post in Queued earlier by trusted".to_string(),
        ]
    );
}

#[tokio::test]
async fn 承認済みの投稿は作成順に購読者全員へ送られる() {
    let forum = Forum::new();
    let author = forum.user("alice", &[]);
    forum.user("carol", &[ForumPreference::ReceiveActivity]);
    forum.user("bob", &[ForumPreference::ReceiveActivity]);
    let second = forum.post("Second", "second", &author, ActivityStatus::Ready, 2);
    let first = forum.post("First", "first", &author, ActivityStatus::Ready, 1);

    let summary = forum.usecase().run().await.unwrap();

    assert_eq!(
        forum.recipients(),
        vec![
            "bob@example.com",
            "carol@example.com",
            "bob@example.com",
            "carol@example.com",
        ]
    );
    assert_eq!(
        forum.reporter.lines(),
        vec![
            "Sending activity for post in First by alice".to_string(),
            "Sending activity for post in Second by alice".to_string(),
        ]
    );
    assert_eq!(forum.posts.activity_of(&first), Some(ActivityStatus::Sent));
    assert_eq!(forum.posts.activity_of(&second), Some(ActivityStatus::Sent));
    assert_eq!(summary.activity_sent, 2);
}

#[tokio::test]
async fn 宛先への送信失敗では実行を止めない() {
    let forum = Forum::new();
    let author = forum.user("alice", &[]);
    forum.user("bob", &[ForumPreference::ReceiveActivity]);
    forum.user("carol", &[ForumPreference::ReceiveActivity]);
    forum.sender.fail_for("bob@example.com");
    let post = forum.post("Ready", "ready", &author, ActivityStatus::Ready, 1);

    let summary = forum.usecase().run().await.unwrap();

    assert_eq!(forum.recipients(), vec!["carol@example.com"]);
    assert_eq!(forum.sender.attempts(), 2);
    assert_eq!(forum.posts.activity_of(&post), Some(ActivityStatus::Sent));
    assert_eq!(summary.activity_sent, 1);
}

#[tokio::test]
async fn 送信済みの投稿には何もしない() {
    let forum = Forum::new();
    let author = forum.user("alice", &[ForumPreference::AutomaticSend]);
    forum.user("reader", &[ForumPreference::ReceiveActivity]);
    forum.post("Done", "done", &author, ActivityStatus::Sent, 1);

    let summary = forum.usecase().run().await.unwrap();

    assert_eq!(summary, ActivitySummary::default());
    assert_eq!(forum.sender.attempts(), 0);
}
