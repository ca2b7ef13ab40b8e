//! # メール
//!
//! バッチが生成・送信するメールメッセージと、その送信エラーを定義する。
//!
//! ## 設計方針
//!
//! - **生成と送信の分離**: メッセージ生成（テンプレート）は各アプリ、
//!   送信は infra の `MailSender` が担当する
//! - **HTML は任意**: キャンペーンはテキストのみの場合があるため `html_body` は `Option`

use thiserror::Error;

/// メール送信・生成エラー
#[derive(Debug, Error)]
pub enum MailError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。`MailSender` に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// プレーンテキスト本文
    pub text_body: String,
    /// HTML 本文（ない場合はテキストのみで送信する）
    pub html_body: Option<String>,
}

impl EmailMessage {
    /// テキストのみのメッセージを作成する
    pub fn text(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to:        to.into(),
            subject:   subject.into(),
            text_body: body.into(),
            html_body: None,
        }
    }

    /// HTML 本文を付与する
    pub fn with_html(self, html_body: impl Into<String>) -> Self {
        Self {
            html_body: Some(html_body.into()),
            ..self
        }
    }
}
