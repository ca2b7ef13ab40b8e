//! # キャンペーンレンダラー
//!
//! キャンペーン本文（tera テンプレート）を購読者ごとに評価してメールを生成する。
//!
//! ## テンプレート変数
//!
//! | 変数 | 内容 |
//! |------|------|
//! | `email` | 購読者のメールアドレス |
//! | `name` | 購読者名（未設定なら空文字） |
//! | `list_name` | メーリングリスト名 |
//! | `campaign_title` | キャンペーン名（件名にも使う） |
//! | `unsubscribe_url` | `{base_url}/mailinglist/unsubscribe/{entry_id}` |
//!
//! テキスト本文はエスケープしない。HTML 本文はキャンペーンに HTML テンプレートが
//! ある場合のみ生成し、自動エスケープを有効にする。

use sitemail_domain::{
    mail::{EmailMessage, MailError},
    mailing_list::{Campaign, ListEntry, MailingList},
};
use tera::{Context, Tera};

/// キャンペーンレンダラー
///
/// キャンペーン本文は DB に保存されているため、実行時に `Tera::one_off` で評価する。
#[derive(Debug, Clone)]
pub struct CampaignRenderer {
    base_url: String,
}

impl CampaignRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// 購読者向けのメールを生成する
    pub fn render(
        &self,
        list: &MailingList,
        campaign: &Campaign,
        recipient: &ListEntry,
    ) -> Result<EmailMessage, MailError> {
        let context = self.build_context(list, campaign, recipient);

        let text_body = Tera::one_off(campaign.body_template(), &context, false)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;
        let email = EmailMessage::text(recipient.email(), campaign.title(), text_body);

        match campaign.html_template() {
            Some(html_template) => {
                let html_body = Tera::one_off(html_template, &context, true)
                    .map_err(|e| MailError::TemplateFailed(e.to_string()))?;
                Ok(email.with_html(html_body))
            }
            None => Ok(email),
        }
    }

    fn build_context(&self, list: &MailingList, campaign: &Campaign, recipient: &ListEntry) -> Context {
        let unsubscribe_url = format!(
            "{}/mailinglist/unsubscribe/{}",
            self.base_url.trim_end_matches('/'),
            recipient.id()
        );

        let mut context = Context::new();
        context.insert("email", recipient.email());
        context.insert("name", recipient.name().unwrap_or_default());
        context.insert("list_name", list.name());
        context.insert("campaign_title", campaign.title());
        context.insert("unsubscribe_url", &unsubscribe_url);
        context
    }
}
