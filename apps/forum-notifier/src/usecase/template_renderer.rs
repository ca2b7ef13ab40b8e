//! # フォーラム通知テンプレートレンダラー
//!
//! tera テンプレートエンジンでフォーラム通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名パターン**: `[Sitemail] {メール種別}: {topic_title}`
//! - **トピックへのリンク**: `{base_url}/discussions/{full_link_name}` をテンプレートに渡す

use sitemail_domain::{
    forum::{ForumUser, PostSummary},
    mail::{EmailMessage, MailError},
};
use strum::IntoStaticStr;
use tera::{Context, Tera};

/// フォーラム通知メールの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ForumMail {
    /// モデレーターへの新規投稿の確認依頼
    ModerationRequest,
    /// 購読者への新しいアクティビティの案内
    NewActivity,
}

/// フォーラム通知テンプレートレンダラー
pub struct ForumTemplateRenderer {
    engine: Tera,
}

impl ForumTemplateRenderer {
    /// `include_str!` で埋め込んだテンプレートを tera に登録する
    pub fn new() -> Result<Self, MailError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "moderation_request.html",
                    include_str!("../../../../templates/forum/moderation_request.html"),
                ),
                (
                    "moderation_request.txt",
                    include_str!("../../../../templates/forum/moderation_request.txt"),
                ),
                (
                    "new_activity.html",
                    include_str!("../../../../templates/forum/new_activity.html"),
                ),
                (
                    "new_activity.txt",
                    include_str!("../../../../templates/forum/new_activity.txt"),
                ),
            ])
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 投稿と宛先からメールメッセージを生成する
    ///
    /// # 引数
    ///
    /// - `base_url`: サイトのベース URL（例: `https://polarssl.example.org`）
    pub fn render(
        &self,
        mail: ForumMail,
        summary: &PostSummary,
        recipient: &ForumUser,
        base_url: &str,
    ) -> Result<EmailMessage, MailError> {
        let template_name: &str = mail.into();
        let topic_title = summary.topic.title();

        let mut context = Context::new();
        context.insert("recipient", recipient.username());
        context.insert("author", summary.author.username());
        context.insert("topic_title", topic_title);
        context.insert("post_url", &summary.topic.url(base_url));

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;
        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        let subject = match mail {
            ForumMail::ModerationRequest => format!("[Sitemail] Moderation needed: {topic_title}"),
            ForumMail::NewActivity => format!("[Sitemail] New activity: {topic_title}"),
        };

        Ok(EmailMessage::text(recipient.email(), subject, text_body).with_html(html_body))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use sitemail_domain::forum::{
        ActivityStatus,
        ForumPost,
        ForumPostId,
        ForumPostRecord,
        ForumTopic,
        ForumTopicId,
        ForumUserId,
    };

    use super::*;

    #[fixture]
    fn summary() -> PostSummary {
        let topic = ForumTopic::new(ForumTopicId::new(), "TLS <1.3> support", "tls-13-support");
        let author = ForumUser::new(ForumUserId::new(), "alice", "alice@example.com");
        let now = Utc::now();
        PostSummary {
            post: ForumPost::from_db(ForumPostRecord {
                id: ForumPostId::new(),
                topic_id: topic.id().clone(),
                user_id: author.id().clone(),
                activity: ActivityStatus::New,
                created_at: now,
                updated_at: now,
            }),
            topic,
            author,
        }
    }

    #[fixture]
    fn moderator() -> ForumUser {
        ForumUser::new(ForumUserId::new(), "bob", "bob@example.com")
    }

    #[rstest]
    fn モデレーション依頼メールを生成する(summary: PostSummary, moderator: ForumUser) {
        let sut = ForumTemplateRenderer::new().unwrap();

        let email = sut
            .render(
                ForumMail::ModerationRequest,
                &summary,
                &moderator,
                "https://example.com",
            )
            .unwrap();

        assert_eq!(email.to, "bob@example.com");
        assert_eq!(email.subject, "[Sitemail] Moderation needed: TLS <1.3> support");
        assert!(email.text_body.contains("Hello bob"));
        assert!(email.text_body.contains("alice posted in \"TLS <1.3> support\""));
        assert!(
            email
                .text_body
                .contains("https://example.com/discussions/tls-13-support")
        );
    }

    #[rstest]
    fn html本文はエスケープされる(summary: PostSummary, moderator: ForumUser) {
        let sut = ForumTemplateRenderer::new().unwrap();

        let email = sut
            .render(ForumMail::NewActivity, &summary, &moderator, "https://example.com")
            .unwrap();

        let html = email.html_body.unwrap();
        assert!(html.contains("TLS &lt;1.3&gt; support"));
        assert!(!html.contains("TLS <1.3>"));
    }

    #[rstest]
    fn アクティビティメールの件名(summary: PostSummary, moderator: ForumUser) {
        let sut = ForumTemplateRenderer::new().unwrap();

        let email = sut
            .render(ForumMail::NewActivity, &summary, &moderator, "https://example.com/")
            .unwrap();

        assert_eq!(email.subject, "[Sitemail] New activity: TLS <1.3> support");
        assert!(email.text_body.contains("alice added a post"));
    }
}
