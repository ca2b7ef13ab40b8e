//! # 送信バッチのエラー定義
//!
//! 宛先の解決・レンダリング・送信の失敗は「配信失敗」として扱い、
//! `mark_failed` ポリシーではエントリを失敗にして処理を続ける。
//! データベースエラーはポリシーに関係なく処理を中断する。

use sitemail_domain::{
    DomainError,
    mail::MailError,
    mailing_list::{CampaignId, ListEntryId},
};
use sitemail_infra::InfraError;
use thiserror::Error;

/// 送信バッチで発生するエラー
#[derive(Debug, Error)]
pub enum SenderError {
    /// 指定名のメーリングリストが存在しない
    #[error("メーリングリストが見つかりません: {0}")]
    ListNotFound(String),

    /// キューエントリが参照するキャンペーンが存在しない
    #[error("キャンペーンが見つかりません: {0}")]
    CampaignNotFound(CampaignId),

    /// キューエントリが参照する購読者が存在しない
    #[error("購読者が見つかりません: {0}")]
    EntryNotFound(ListEntryId),

    /// 本文のレンダリングに失敗
    #[error("メール本文の生成に失敗しました: {0}")]
    Render(#[source] MailError),

    /// メールの送信に失敗
    #[error("メール送信に失敗しました: {0}")]
    Send(#[source] MailError),

    /// 状態遷移の不整合
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// データベースエラー
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl SenderError {
    /// エントリ単位の配信失敗かどうか
    ///
    /// `true` の場合は `mark_failed` ポリシーでエントリを失敗にできる。
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::CampaignNotFound(_) | Self::EntryNotFound(_) | Self::Render(_) | Self::Send(_)
        )
    }
}
