//! # フォーラム通知バッチのエラー定義
//!
//! 個々の宛先への送信失敗はエラーにせずログ出力のみ行う。
//! ここで扱うのは実行全体を止めるエラー。

use sitemail_domain::DomainError;
use sitemail_infra::InfraError;
use thiserror::Error;

/// フォーラム通知バッチで発生するエラー
#[derive(Debug, Error)]
pub enum NotifierError {
    /// 状態遷移の不整合
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// データベースエラー（条件付き更新の競合を含む）
    #[error(transparent)]
    Infra(#[from] InfraError),
}
