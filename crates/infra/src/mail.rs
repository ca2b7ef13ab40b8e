//! # メール送信
//!
//! メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（開発用 / 社内リレー）、SES（本番用）、Noop（送信しない）
//! - **環境変数切替**: `MAIL_BACKEND` でランタイム選択（[`MailSettings`]）

mod noop;
mod ses;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
pub use noop::NoopMailSender;
pub use ses::SesMailSender;
use sitemail_domain::mail::{EmailMessage, MailError};
pub use smtp::SmtpMailSender;

/// メール送信トレイト
///
/// 送信に失敗した場合は `MailError::SendFailed` を返す。
#[async_trait]
pub trait MailSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), MailError>;
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MailBackend {
    /// SMTP サーバー経由で送信
    Smtp,
    /// Amazon SES v2 経由で送信
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// メール送信の設定
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// 送信バックエンド
    pub backend:      MailBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:    String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:    u16,
    /// 送信元メールアドレス
    pub from_address: String,
}

/// 設定に応じた送信実装を作成する
///
/// SES の場合は AWS の標準的な認証情報チェーン（環境変数、プロファイル、IAM ロール）を使う。
pub async fn create_mail_sender(settings: &MailSettings) -> Arc<dyn MailSender> {
    match settings.backend {
        MailBackend::Smtp => {
            tracing::info!(
                host = %settings.smtp_host,
                port = settings.smtp_port,
                "SMTP でメールを送信します"
            );
            Arc::new(SmtpMailSender::new(
                &settings.smtp_host,
                settings.smtp_port,
                settings.from_address.clone(),
            ))
        }
        MailBackend::Ses => {
            tracing::info!("Amazon SES でメールを送信します");
            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .load()
                .await;
            let client = aws_sdk_sesv2::Client::new(&aws_config);
            Arc::new(SesMailSender::new(client, settings.from_address.clone()))
        }
        MailBackend::Noop => {
            tracing::info!("メール送信は無効です（noop）");
            Arc::new(NoopMailSender)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("smtp", MailBackend::Smtp)]
    #[case("ses", MailBackend::Ses)]
    #[case("noop", MailBackend::Noop)]
    fn mail_backendの文字列変換(#[case] s: &str, #[case] expected: MailBackend) {
        assert_eq!(MailBackend::from_str(s).unwrap(), expected);
        assert_eq!(expected.to_string(), s);
    }

    #[test]
    fn 不明なmail_backendはエラーになる() {
        assert!(MailBackend::from_str("sendmail").is_err());
    }

    #[tokio::test]
    async fn noop設定でnoop送信が作成される() {
        let settings = MailSettings {
            backend:      MailBackend::Noop,
            smtp_host:    "localhost".to_string(),
            smtp_port:    1025,
            from_address: "noreply@sitemail.example.com".to_string(),
        };

        let sender = create_mail_sender(&settings).await;
        let email = EmailMessage::text("alice@example.com", "件名", "本文");

        assert!(sender.send_email(&email).await.is_ok());
    }
}
