//! SES メール送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。本番環境で使用する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use sitemail_domain::mail::{EmailMessage, MailError};

use super::MailSender;

/// SES メール送信
pub struct SesMailSender {
    client:       Client,
    from_address: String,
}

impl SesMailSender {
    /// 新しい SES 送信インスタンスを作成
    ///
    /// - `client`: AWS SES v2 クライアント
    /// - `from_address`: 送信元メールアドレス（SES で検証済みであること）
    pub fn new(client: Client, from_address: String) -> Self {
        Self {
            client,
            from_address,
        }
    }
}

fn content(data: &str, label: &str) -> Result<Content, MailError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| MailError::SendFailed(format!("{label}構築失敗: {e}")))
}

#[async_trait]
impl MailSender for SesMailSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), MailError> {
        let destination = Destination::builder().to_addresses(&email.to).build();

        let mut body = Body::builder().text(content(&email.text_body, "テキスト本文")?);
        if let Some(html_body) = &email.html_body {
            body = body.html(content(html_body, "HTML 本文")?);
        }

        let message = Message::builder()
            .subject(content(&email.subject, "件名")?)
            .body(body.build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::SendFailed(format!("SES 送信失敗: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesMailSender>();
    }
}
